//! Argument checks against a tool's input schema.
//!
//! Each descriptor's `input_schema` is compiled once with `jsonschema` when
//! the registry is built. Violations are reported per field, addressed by
//! the dotted instance path (`args.1`), or by the property name for a
//! missing required key.

use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::{Map, Value};

use crate::models::FieldError;

/// A compiled input schema.
#[derive(Debug)]
pub struct ArgsValidator {
    validator: jsonschema::Validator,
}

impl ArgsValidator {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns the compiler's message if `schema` is not a valid JSON Schema.
    pub fn new(schema: &Value) -> Result<Self, String> {
        let validator = jsonschema::options()
            .build(schema)
            .map_err(|e| e.to_string())?;
        Ok(Self { validator })
    }

    /// Check `args`, collecting every problem.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
        let instance = Value::Object(args.clone());
        let errors: Vec<FieldError> = self
            .validator
            .iter_errors(&instance)
            .map(|error| field_error(&error))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Check `args` against `schema` without keeping the compiled form.
///
/// An uncompilable schema is reported as a single `schema` field error.
///
/// # Example
///
/// ```rust
/// use bridge_registry::validate_args;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": { "path": { "type": "string" } },
///     "required": ["path"]
/// });
/// let args = json!({ "path": 7 });
/// let errors = validate_args(&schema, args.as_object().unwrap()).unwrap_err();
/// assert_eq!(errors[0].field, "path");
/// ```
pub fn validate_args(schema: &Value, args: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
    ArgsValidator::new(schema)
        .map_err(|message| vec![FieldError::new("schema", message)])?
        .validate(args)
}

fn field_error(error: &ValidationError<'_>) -> FieldError {
    let pointer = error.instance_path.to_string();
    let parent = pointer.trim_start_matches('/').replace('/', ".");

    if let ValidationErrorKind::Required { property } = &error.kind {
        let name = match property {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        };
        let field = if parent.is_empty() {
            name
        } else {
            format!("{parent}.{name}")
        };
        return FieldError::new(field, "Required");
    }

    let field = if parent.is_empty() {
        "args".to_string()
    } else {
        parent
    };
    FieldError::new(field, error.to_string())
}
