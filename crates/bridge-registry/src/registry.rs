//! # Tool Registry - Main Facade
//!
//! Owns the fixed tool catalogue and runs the dispatch pipeline: lookup,
//! argument checks, safety screening, handler invocation, normalization.
//!
//! ## Security Notes
//!
//! - The registry is immutable after construction; no tool can be added by
//!   a caller.
//! - Screening runs after the schema check, so the filter always sees
//!   well-typed arguments, and before the handler, so a blocked call never
//!   reaches host code.
//! - Batch items run one after another. Nothing is parallelized, which keeps
//!   host load bounded and log ordering deterministic.

use std::collections::HashMap;
use std::path::Path;

use bridge_firewall::{redact_args, SafetyFilter, ScanResult};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::descriptor::{Screening, ToolDescriptor};
use crate::error::{sanitize_message, DispatchError, RegistryError, Result};
use crate::models::{BatchItemResult, BatchRequest, ExecutionResult, FieldError, ToolError};
use crate::schema::ArgsValidator;

/// Default cap on batch length.
pub const DEFAULT_MAX_BATCH: usize = 10;

/// The fixed tool catalogue.
///
/// # Example
///
/// ```rust
/// use bridge_registry::{builtin, ToolRegistry};
///
/// let registry = ToolRegistry::new(builtin::default_tools()).unwrap();
/// assert!(registry.get("run_command").is_some());
/// assert!(registry.get("format_disk").is_none());
/// ```
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    validators: Vec<ArgsValidator>,
    index: HashMap<String, usize>,
    filter: SafetyFilter,
    max_batch: usize,
}

impl ToolRegistry {
    /// Build the registry from descriptors, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if two descriptors share a
    /// name, [`RegistryError::EmptyName`] for an unnamed descriptor, or
    /// [`RegistryError::InvalidSchema`] if an input schema does not compile.
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tools.len());
        let mut validators = Vec::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if tool.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if index.insert(tool.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateTool(tool.name.clone()));
            }
            let validator =
                ArgsValidator::new(&tool.input_schema).map_err(|message| {
                    RegistryError::InvalidSchema {
                        tool: tool.name.clone(),
                        message,
                    }
                })?;
            validators.push(validator);
        }
        Ok(Self {
            tools,
            validators,
            index,
            filter: SafetyFilter::new(),
            max_batch: DEFAULT_MAX_BATCH,
        })
    }

    /// Sets the batch length cap.
    #[must_use]
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// The batch length cap.
    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    /// Look up a tool.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    /// All tools, in registration order.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// All tool names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name.clone()).collect()
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run one tool.
    ///
    /// `args` may be `Null` (treated as no arguments) or an object.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NotFound`] for an unknown name
    /// - [`DispatchError::Validation`] for bad arguments
    /// - [`DispatchError::Handler`] if the handler fails
    ///
    /// A call blocked by the safety filter is not an error: it returns an
    /// unsuccessful [`ExecutionResult`] naming the rule that fired.
    pub async fn dispatch(
        &self,
        name: &str,
        args: &Value,
    ) -> std::result::Result<ExecutionResult, DispatchError> {
        let position = *self.index.get(name).ok_or_else(|| DispatchError::NotFound {
            tool: name.to_string(),
            available: self.names(),
        })?;
        let tool = &self.tools[position];

        let args = as_object(args)?;
        self.validators[position]
            .validate(&args)
            .map_err(DispatchError::Validation)?;

        if let ScanResult::Blocked { category, detail } = self.screen(tool.screening, &args) {
            warn!(tool = %name, %category, %detail, "tool call blocked by safety filter");
            return Ok(ExecutionResult::failure(format!("Blocked: {category}: {detail}")));
        }

        let logged = redact_args(&Value::Object(args.clone()));
        info!(tool = %name, args = %logged, "executing tool");

        match tool.handler.execute(&args).await {
            Ok(output) => {
                let result = ExecutionResult::from_output(output);
                info!(tool = %name, success = result.success, "tool finished");
                Ok(result)
            }
            Err(ToolError::Validation(details)) => {
                warn!(tool = %name, errors = details.len(), "tool rejected arguments");
                Err(DispatchError::Validation(details))
            }
            Err(ToolError::Failed(message)) => {
                let message = sanitize_message(&message);
                warn!(tool = %name, error = %message, "tool failed");
                Err(DispatchError::Handler(message))
            }
        }
    }

    /// Run several tools in order, isolating failures per item.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BatchTooLarge`] before running anything if
    /// the batch exceeds [`max_batch`](Self::max_batch).
    pub async fn dispatch_batch(
        &self,
        requests: &[BatchRequest],
    ) -> std::result::Result<Vec<BatchItemResult>, DispatchError> {
        if requests.len() > self.max_batch {
            return Err(DispatchError::BatchTooLarge {
                len: requests.len(),
                max: self.max_batch,
            });
        }

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let name = request.tool.as_deref().unwrap_or_default();
            let outcome = self.dispatch(name, &request.args).await;
            results.push(BatchItemResult {
                tool: request.tool.clone(),
                outcome,
            });
        }
        Ok(results)
    }

    fn screen(&self, screening: Screening, args: &Map<String, Value>) -> ScanResult {
        match screening {
            Screening::None => ScanResult::Safe,
            Screening::Command {
                program,
                args: list,
                cwd,
            } => {
                let program = args.get(program).and_then(Value::as_str).unwrap_or_default();
                let arguments = string_list(args.get(list));
                let verdict = self.filter.screen_command(program, &arguments);
                if verdict.is_blocked() {
                    return verdict;
                }
                match cwd.and_then(|field| args.get(field)).and_then(Value::as_str) {
                    Some(dir) => self.screen_working_dir(dir, &arguments),
                    None => verdict,
                }
            }
            Screening::Path { field } => {
                let path = args.get(field).and_then(Value::as_str).unwrap_or_default();
                self.filter.screen_paths(&[path])
            }
        }
    }

    /// The working directory itself, and each relative argument resolved
    /// against it, must clear the blocked-path rules.
    fn screen_working_dir(&self, dir: &str, arguments: &[String]) -> ScanResult {
        let resolved = arguments
            .iter()
            .filter(|arg| !arg.starts_with('-') && !Path::new(arg.as_str()).is_absolute())
            .map(|arg| Path::new(dir).join(arg).to_string_lossy().into_owned());

        for path in std::iter::once(dir.to_string()).chain(resolved) {
            let verdict = self.filter.screen_paths(&[path]);
            if verdict.is_blocked() {
                return verdict;
            }
        }
        ScanResult::Safe
    }
}

fn as_object(args: &Value) -> std::result::Result<Map<String, Value>, DispatchError> {
    match args {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        _ => Err(DispatchError::Validation(vec![FieldError::new(
            "args",
            "Expected object",
        )])),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
