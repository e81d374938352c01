//! Tool resolution error types.

use thiserror::Error;

/// Why a model tool call could not be turned into a `ToolIntent`.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model named a tool that is not registered.
    #[error("unknown tool: '{name}'. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    /// Arguments failed schema validation or deserialization.
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}
