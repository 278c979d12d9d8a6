//! Error types for registry construction and dispatch.

use thiserror::Error;

use crate::models::FieldError;

/// Result type alias for registry construction.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two descriptors share a name.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    /// A descriptor has an empty name.
    #[error("tool name must not be empty")]
    EmptyName,

    /// A descriptor's input schema does not compile.
    #[error("invalid input schema for {tool}: {message}")]
    InvalidSchema {
        /// Tool name.
        tool: String,
        /// Compiler message.
        message: String,
    },
}

/// Errors from a single dispatch.
///
/// A batch collects these per item instead of returning them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// No tool with this name.
    #[error("Tool not found")]
    NotFound {
        /// Requested name.
        tool: String,
        /// Every registered name, for the caller's benefit.
        available: Vec<String>,
    },

    /// Arguments failed the schema or the handler's own checks.
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// The handler failed. The message is already sanitized.
    #[error("{0}")]
    Handler(String),

    /// Batch longer than the configured cap.
    #[error("Maximum {max} tools per batch")]
    BatchTooLarge {
        /// Items submitted.
        len: usize,
        /// Cap.
        max: usize,
    },
}

/// Longest handler message surfaced to a caller.
const MAX_MESSAGE_CHARS: usize = 500;

/// Reduce a handler error message to something safe to return.
///
/// Keeps only the first non-empty line (dropping any trace that follows),
/// trimmed and capped in length.
pub fn sanitize_message(message: &str) -> String {
    let first = message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Unknown error");
    first.chars().take(MAX_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_first_line() {
        let raw = "permission denied\n    at handler (tools.rs:10)\n    at main";
        assert_eq!(sanitize_message(raw), "permission denied");
    }

    #[test]
    fn test_sanitize_skips_leading_blank_lines() {
        assert_eq!(sanitize_message("\n\n  boom  \nmore"), "boom");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_message(""), "Unknown error");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "x".repeat(2_000);
        assert_eq!(sanitize_message(&long).len(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_not_found_display() {
        let err = DispatchError::NotFound {
            tool: "nope".to_string(),
            available: vec![],
        };
        assert_eq!(err.to_string(), "Tool not found");
    }
}
