//! Tool descriptors and the handler capability.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::models::{ToolError, ToolOutput};

/// The capability behind a tool.
///
/// Handlers are trusted code chosen by the operator; the registry screens
/// their arguments but does not sandbox them.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with already-checked arguments.
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError>;
}

/// Which safety-filter checks apply before a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screening {
    /// No screening.
    #[default]
    None,
    /// Shell-like tool: both predicates over `program` plus `args`. When
    /// `cwd` names an argument, that directory and every relative argument
    /// resolved against it must also clear the blocked-path rules.
    Command {
        /// Argument holding the program name.
        program: &'static str,
        /// Argument holding the argument list.
        args: &'static str,
        /// Argument holding the working directory, if the tool takes one.
        cwd: Option<&'static str>,
    },
    /// Path-taking tool: blocked-path predicate over one argument.
    Path {
        /// Argument holding the path.
        field: &'static str,
    },
}

/// A registered tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Unique name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub input_schema: Value,
    /// Pre-dispatch screening policy.
    pub screening: Screening,
    /// The capability.
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Creates an unscreened descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            screening: Screening::None,
            handler: Arc::new(handler),
        }
    }

    /// Sets the screening policy.
    #[must_use]
    pub fn with_screening(mut self, screening: Screening) -> Self {
        self.screening = screening;
        self
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("screening", &self.screening)
            .finish_non_exhaustive()
    }
}
