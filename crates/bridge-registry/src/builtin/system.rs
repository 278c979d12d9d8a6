//! `system_info`: a small host summary.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::descriptor::{ToolDescriptor, ToolHandler};
use crate::models::{ToolError, ToolOutput};

/// Handler for `system_info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInfo;

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "system_info",
        "Report the host OS, architecture, hostname and working directory",
        json!({ "type": "object", "properties": {} }),
        SystemInfo,
    )
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait]
impl ToolHandler for SystemInfo {
    async fn execute(&self, _args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let info = json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "family": std::env::consts::FAMILY,
            "hostname": hostname(),
            "cwd": cwd,
            "pid": std::process::id(),
        });
        let text = serde_json::to_string_pretty(&info)
            .map_err(|e| ToolError::Failed(e.to_string()))?;
        Ok(ToolOutput::text(text))
    }
}
