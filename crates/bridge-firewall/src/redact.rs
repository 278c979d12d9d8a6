//! Argument redaction for log output.
//!
//! Tool arguments are written to the execution log line for every dispatch.
//! Values whose key looks sensitive are replaced outright and long strings
//! are truncated, so a log file never carries a credential or a pasted blob.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Replacement for sensitive values.
pub const REDACTED: &str = "[REDACTED]";

/// String values longer than this many characters are truncated.
pub const TRUNCATE_AT: usize = 100;

static SENSITIVE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)password|secret|token|key|auth").expect("redaction pattern must compile")
});

/// Return a copy of `args` safe to write to logs.
///
/// Only top-level keys of an object are inspected. Anything that is not an
/// object is returned as-is.
///
/// # Example
///
/// ```rust
/// use bridge_firewall::redact_args;
/// use serde_json::json;
///
/// let clean = redact_args(&json!({ "apiKey": "abc", "path": "README.md" }));
/// assert_eq!(clean, json!({ "apiKey": "[REDACTED]", "path": "README.md" }));
/// ```
pub fn redact_args(args: &Value) -> Value {
    let Value::Object(map) = args else {
        return args.clone();
    };

    let redacted: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.clone(), redact_value(key, value)))
        .collect();
    Value::Object(redacted)
}

fn redact_value(key: &str, value: &Value) -> Value {
    if SENSITIVE_KEY.is_match(key) {
        return Value::String(REDACTED.to_string());
    }
    match value {
        Value::String(s) if s.chars().count() > TRUNCATE_AT => {
            let mut truncated: String = s.chars().take(TRUNCATE_AT).collect();
            truncated.push_str("...");
            Value::String(truncated)
        }
        other => other.clone(),
    }
}
