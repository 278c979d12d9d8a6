//! `run_command`: spawn a program without a shell.
//!
//! The program and its arguments are passed to the OS as a vector, so shell
//! metacharacters in arguments are inert. The safety filter still screens the
//! joined line because the program itself may be a shell.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::process::Command;
use tracing::debug;

use super::truncate_utf8;
use crate::descriptor::{Screening, ToolDescriptor, ToolHandler};
use crate::models::{FieldError, ToolError, ToolOutput};

/// Wall-clock limit for one command.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on combined stdout and stderr returned to the caller.
pub const MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Handler for `run_command`.
#[derive(Debug, Clone)]
pub struct RunCommand {
    timeout: Duration,
}

impl RunCommand {
    /// Handler with the default timeout.
    pub const fn new() -> Self {
        Self {
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for RunCommand {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "run_command",
        "Run a program on the host with the given arguments (no shell)",
        json!({
            "type": "object",
            "properties": {
                "command": { "type": "string", "description": "Program to run" },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Arguments passed to the program"
                },
                "cwd": { "type": "string", "description": "Working directory" }
            },
            "required": ["command"]
        }),
        RunCommand::new(),
    )
    .with_screening(Screening::Command {
        program: "command",
        args: "args",
        cwd: Some("cwd"),
    })
}

#[async_trait]
impl ToolHandler for RunCommand {
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let program = args
            .get("command")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if program.is_empty() {
            return Err(ToolError::Validation(vec![FieldError::new(
                "command",
                "Must not be empty",
            )]));
        }

        let argv: Vec<&str> = args
            .get("args")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut command = Command::new(program);
        command
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = args.get("cwd").and_then(Value::as_str) {
            command.current_dir(cwd);
        }

        debug!(program, argc = argv.len(), "spawning command");
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| ToolError::Failed(format!("{program}: {e}")))?,
            Err(_) => {
                return Ok(ToolOutput::error(format!(
                    "Command timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }
        if text.trim().is_empty() {
            text = match output.status.code() {
                Some(code) => format!("Exited with status {code}"),
                None => "Terminated by signal".to_string(),
            };
        }
        let text = truncate_utf8(text, MAX_OUTPUT_BYTES);

        if output.status.success() {
            Ok(ToolOutput::text(text))
        } else {
            Ok(ToolOutput::error(text))
        }
    }
}
