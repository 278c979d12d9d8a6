//! End-to-end dispatch through the default tool set.

use bridge_registry::{builtin, BatchRequest, DispatchError, ToolRegistry};
use serde_json::{json, Value};

fn registry() -> ToolRegistry {
    ToolRegistry::new(builtin::default_tools()).unwrap()
}

#[test]
fn test_default_catalogue_order() {
    assert_eq!(
        registry().names(),
        vec!["run_command", "read_file", "list_directory", "system_info"]
    );
}

#[test]
fn test_descriptors_carry_schemas() {
    let registry = registry();
    for tool in registry.descriptors() {
        assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        assert!(!tool.description.is_empty());
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_command_through_registry() {
    let result = registry()
        .dispatch("run_command", &json!({ "command": "echo", "args": ["ok"] }))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.summary().trim(), "ok");
}

#[tokio::test]
async fn test_dangerous_command_blocked_before_spawn() {
    let result = registry()
        .dispatch("run_command", &json!({ "command": "rm", "args": ["-rf", "/"] }))
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.summary().starts_with("Blocked: dangerous pattern"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_working_dir_cannot_reach_blocked_directory() {
    let home = tempfile::tempdir().unwrap();
    let ssh = home.path().join(".ssh");
    std::fs::create_dir(&ssh).unwrap();
    std::fs::write(ssh.join("config"), "Host prod\n  IdentityFile secret-host-key\n").unwrap();

    let registry = registry();
    let direct = registry
        .dispatch(
            "run_command",
            &json!({ "command": "cat", "args": [ssh.join("config").to_str().unwrap()] }),
        )
        .await
        .unwrap();
    assert!(!direct.success);

    let via_cwd = registry
        .dispatch(
            "run_command",
            &json!({ "command": "cat", "args": ["config"], "cwd": ssh.to_str().unwrap() }),
        )
        .await
        .unwrap();
    assert!(!via_cwd.success);
    assert_eq!(via_cwd.summary(), "Blocked: blocked path: SSH directory");
    assert!(!via_cwd.summary().contains("IdentityFile"));
}

#[tokio::test]
async fn test_sensitive_read_blocked() {
    for path in ["/home/me/.ssh/id_ed25519", "./.env", "/etc/shadow", "deploy.pem"] {
        let result = registry()
            .dispatch("read_file", &json!({ "path": path }))
            .await
            .unwrap();
        assert!(!result.success, "{path} should be blocked");
        assert!(result.summary().starts_with("Blocked: blocked path"));
    }
}

#[tokio::test]
async fn test_sensitive_listing_blocked() {
    let result = registry()
        .dispatch("list_directory", &json!({ "path": "/home/me/.aws" }))
        .await
        .unwrap();
    assert!(!result.success);
}

#[tokio::test]
async fn test_wrong_argument_type() {
    let err = registry()
        .dispatch("run_command", &json!({ "command": 42 }))
        .await
        .unwrap_err();
    let DispatchError::Validation(details) = err else {
        panic!("expected validation error");
    };
    assert_eq!(details[0].field, "command");
}

#[tokio::test]
async fn test_system_info_needs_no_args() {
    let result = registry().dispatch("system_info", &Value::Null).await.unwrap();
    assert!(result.success);
    assert!(result.summary().contains(std::env::consts::OS));
}

#[tokio::test]
async fn test_batch_mixed_outcomes_in_order() {
    let requests: Vec<BatchRequest> = [
        json!({ "tool": "system_info" }),
        json!({ "tool": "no_such_tool", "args": {} }),
        json!({ "tool": 7 }),
        json!({ "tool": "read_file", "args": { "path": ".env" } }),
    ]
    .iter()
    .map(BatchRequest::from_value)
    .collect();

    let results = registry().dispatch_batch(&requests).await.unwrap();
    assert_eq!(results.len(), 4);
    assert!(results[0].succeeded());
    assert!(matches!(results[1].outcome, Err(DispatchError::NotFound { .. })));
    assert_eq!(results[2].tool, None);
    assert!(results[2].outcome.is_err());
    assert!(!results[3].succeeded());
    assert!(results[3].outcome.is_ok());
}

#[tokio::test]
async fn test_batch_limit_enforced() {
    let requests = vec![
        BatchRequest {
            tool: Some("system_info".to_string()),
            args: Value::Null,
        };
        11
    ];
    let err = registry().dispatch_batch(&requests).await.unwrap_err();
    assert_eq!(err.to_string(), "Maximum 10 tools per batch");
}

#[tokio::test]
async fn test_empty_batch() {
    let results = registry().dispatch_batch(&[]).await.unwrap();
    assert!(results.is_empty());
}
