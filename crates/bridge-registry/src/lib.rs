//! # Bridge Registry - Tool Catalogue and Dispatch
//!
//! The registry is the fixed set of privileged operations the bridge exposes.
//! It is built once at startup and never changes afterwards: there is no
//! dynamic registration.
//!
//! ## Dispatch Pipeline
//!
//! ```text
//!   name, args
//!       │
//!       ▼
//!  ┌──────────┐  unknown   ┌────────────┐
//!  │  Lookup  │──────────▶ │  NotFound  │
//!  └────┬─────┘            └────────────┘
//!       ▼
//!  ┌──────────┐  mismatch  ┌────────────┐
//!  │  Schema  │──────────▶ │ Validation │
//!  └────┬─────┘            └────────────┘
//!       ▼
//!  ┌──────────┐  match     ┌────────────┐
//!  │ Screening│──────────▶ │  Blocked   │ (success = false)
//!  └────┬─────┘            └────────────┘
//!       ▼
//!  ┌──────────┐  error     ┌────────────┐
//!  │ Handler  │──────────▶ │  Handler   │
//!  └────┬─────┘            └────────────┘
//!       ▼
//!  ExecutionResult (one content item)
//! ```
//!
//! Batches run the same pipeline item by item, strictly in order, and never
//! let one item's failure abort its siblings.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bridge_registry::{builtin, ToolRegistry};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ToolRegistry::new(builtin::default_tools())?;
//! let result = registry
//!     .dispatch("run_command", &json!({ "command": "git", "args": ["status"] }))
//!     .await?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod builtin;
mod descriptor;
mod error;
mod models;
mod registry;
mod schema;

pub use descriptor::{Screening, ToolDescriptor, ToolHandler};
pub use error::{sanitize_message, DispatchError, RegistryError, Result};
pub use models::{
    BatchItemResult, BatchRequest, ExecutionResult, FieldError, ImagePayload, ResultContent,
    ToolContent, ToolError, ToolOutput,
};
pub use registry::{ToolRegistry, DEFAULT_MAX_BATCH};
pub use schema::{validate_args, ArgsValidator};
