//! Tool Registry: the operations the model may call.
//!
//! Two tools are exposed:
//! - `get_usina_data`: fixed-offset extraction over a sheet snapshot
//! - `save_json_to_file`: writes a JSON string under the output directory
//!
//! Model tool calls are resolved into a closed `ToolIntent` enum after
//! schema validation, then dispatched exhaustively. Tool failures never
//! escape as errors: they come back as text the model can react to.

pub mod errors;
pub mod extract;
pub mod persist;
pub mod registry;
pub mod schema;

pub use errors::ToolError;
pub use extract::{ExtractArgs, ExtractEntityTool};
pub use persist::{SaveJsonArgs, SaveJsonTool};
pub use registry::{ToolIntent, ToolOutcome, ToolRegistry};

use serde::de::DeserializeOwned;

use crate::inference::ToolDefinition;

/// A named, schema-validated operation the model can invoke.
pub trait CallableTool {
    /// Typed arguments, deserialized after schema validation.
    type Args: DeserializeOwned;

    /// Name the model calls the tool by.
    const NAME: &'static str;

    /// Natural-language description shown to the model.
    fn description(&self) -> &'static str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool. `Err` carries the model-facing failure text.
    fn call(&self, args: Self::Args) -> Result<String, String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(Self::NAME, self.description(), self.parameters())
    }

    /// Validate `arguments` against `parameters()` and deserialize them.
    fn parse_args(&self, arguments: &serde_json::Value) -> Result<Self::Args, ToolError> {
        schema::validate_arguments(Self::NAME, &self.parameters(), arguments)?;
        serde_json::from_value(arguments.clone()).map_err(|e| ToolError::InvalidArguments {
            tool: Self::NAME.to_string(),
            reason: e.to_string(),
        })
    }
}
