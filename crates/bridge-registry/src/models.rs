//! # Registry Data Types
//!
//! Handler-facing types ([`ToolOutput`], [`ToolContent`], [`ToolError`]) and
//! caller-facing types ([`ExecutionResult`], [`BatchItemResult`]).
//!
//! A handler may return several content items; the caller always sees exactly
//! one. Normalization picks the first item and collapses it to text or image.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;

/// Text shown when a handler returns no content at all.
pub const DEFAULT_TEXT: &str = "Action completed";

/// Text shown alongside an image payload.
pub const IMAGE_TEXT: &str = "Screenshot captured";

/// MIME type assumed when a handler omits one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// One piece of handler output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Base64 image data.
    Image {
        /// Encoded image bytes.
        data: String,
        /// MIME type, if known.
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

impl ToolContent {
    /// Text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image content.
    pub fn image(data: impl Into<String>, mime_type: Option<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type,
        }
    }
}

/// Raw handler output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolOutput {
    /// Content items, in handler order.
    pub content: Vec<ToolContent>,
    /// The handler ran but reports failure.
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful text output.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    /// Failed text output.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: true,
        }
    }
}

/// A single argument problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path to the argument.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// How a handler can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Arguments rejected by the handler's own checks.
    Validation(Vec<FieldError>),
    /// Execution failed.
    Failed(String),
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Image part of a normalized result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Encoded image bytes.
    pub data: String,
    /// MIME type.
    pub mime_type: String,
}

/// The single content item surfaced to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultContent {
    /// Text payload.
    Text(String),
    /// Image payload.
    Image(ImagePayload),
}

/// Normalized outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// `false` if the handler reported an error or the call was screened out.
    pub success: bool,
    /// Exactly one content item.
    pub content: ResultContent,
}

impl ExecutionResult {
    /// Collapse handler output into the uniform shape.
    pub fn from_output(output: ToolOutput) -> Self {
        let content = match output.content.into_iter().next() {
            Some(ToolContent::Image { data, mime_type }) if !data.is_empty() => {
                ResultContent::Image(ImagePayload {
                    data,
                    mime_type: mime_type.unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
                })
            }
            Some(ToolContent::Text { text }) => ResultContent::Text(text),
            _ => ResultContent::Text(DEFAULT_TEXT.to_string()),
        };
        Self {
            success: !output.is_error,
            content,
        }
    }

    /// Failed result with a text explanation.
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            success: false,
            content: ResultContent::Text(text.into()),
        }
    }

    /// Text to show as the `result` field.
    pub fn summary(&self) -> &str {
        match &self.content {
            ResultContent::Text(text) => text,
            ResultContent::Image(_) => IMAGE_TEXT,
        }
    }

    /// Image payload, if any.
    pub fn image(&self) -> Option<&ImagePayload> {
        match &self.content {
            ResultContent::Image(image) => Some(image),
            ResultContent::Text(_) => None,
        }
    }
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchRequest {
    /// Tool name; `None` if the caller sent something that is not a string.
    pub tool: Option<String>,
    /// Arguments, `Null` if omitted.
    pub args: Value,
}

impl BatchRequest {
    /// Read one batch entry from loosely-typed JSON.
    pub fn from_value(value: &Value) -> Self {
        Self {
            tool: value.get("tool").and_then(Value::as_str).map(str::to_string),
            args: value.get("args").cloned().unwrap_or(Value::Null),
        }
    }
}

/// Outcome of one batch entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItemResult {
    /// Tool name as requested.
    pub tool: Option<String>,
    /// Result or the error that stopped this item.
    pub outcome: std::result::Result<ExecutionResult, DispatchError>,
}

impl BatchItemResult {
    /// `true` if the item ran and reported success.
    pub fn succeeded(&self) -> bool {
        matches!(&self.outcome, Ok(result) if result.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_item_wins() {
        let output = ToolOutput {
            content: vec![ToolContent::text("first"), ToolContent::text("second")],
            is_error: false,
        };
        let result = ExecutionResult::from_output(output);
        assert_eq!(result.summary(), "first");
        assert!(result.success);
    }

    #[test]
    fn test_image_normalization() {
        let output = ToolOutput {
            content: vec![ToolContent::image("aGVsbG8=", None)],
            is_error: false,
        };
        let result = ExecutionResult::from_output(output);
        assert_eq!(result.summary(), IMAGE_TEXT);
        let image = result.image().unwrap();
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn test_empty_image_falls_back_to_text() {
        let output = ToolOutput {
            content: vec![ToolContent::image("", Some("image/jpeg".to_string()))],
            is_error: false,
        };
        let result = ExecutionResult::from_output(output);
        assert_eq!(result.summary(), DEFAULT_TEXT);
        assert!(result.image().is_none());
    }

    #[test]
    fn test_empty_output() {
        let result = ExecutionResult::from_output(ToolOutput::default());
        assert_eq!(result.summary(), DEFAULT_TEXT);
    }

    #[test]
    fn test_error_output_is_unsuccessful() {
        let result = ExecutionResult::from_output(ToolOutput::error("exit status 1"));
        assert!(!result.success);
        assert_eq!(result.summary(), "exit status 1");
    }

    #[test]
    fn test_batch_request_parsing() {
        let req = BatchRequest::from_value(&json!({ "tool": "echo", "args": { "a": 1 } }));
        assert_eq!(req.tool.as_deref(), Some("echo"));
        assert_eq!(req.args, json!({ "a": 1 }));

        let bad = BatchRequest::from_value(&json!({ "tool": 5 }));
        assert_eq!(bad.tool, None);
        assert_eq!(bad.args, Value::Null);

        let not_object = BatchRequest::from_value(&json!("echo"));
        assert_eq!(not_object.tool, None);
    }

    #[test]
    fn test_content_serialization_tagged() {
        let json = serde_json::to_value(ToolContent::image("d", Some("image/png".into()))).unwrap();
        assert_eq!(json, json!({ "type": "image", "data": "d", "mimeType": "image/png" }));
    }
}
