//! ToolRegistry: resolves model tool calls into typed intents and runs them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::inference::{ToolCall, ToolDefinition};
use crate::tabular::LoadedSheet;

use super::errors::ToolError;
use super::extract::{ExtractArgs, ExtractEntityTool};
use super::persist::{SaveJsonArgs, SaveJsonTool};
use super::CallableTool;

/// A validated tool call. Every registered tool has exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolIntent {
    ExtractEntity(ExtractArgs),
    SaveJson(SaveJsonArgs),
}

impl ToolIntent {
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolIntent::ExtractEntity(_) => ExtractEntityTool::NAME,
            ToolIntent::SaveJson(_) => SaveJsonTool::NAME,
        }
    }
}

/// Typed result of one tool call.
///
/// Preserves the success/failure distinction through types; the text fed
/// back to the model comes from `model_text()` in every case.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Tool ran and produced its result.
    Success { tool_name: String, text: String },

    /// Tool ran and reported an application-level failure.
    ToolFailure { tool_name: String, text: String },

    /// The call never reached a tool (unknown name, bad arguments).
    Rejected { tool_name: String, text: String },
}

impl ToolOutcome {
    /// The text to feed back to the model as the tool result message.
    pub fn model_text(&self) -> &str {
        match self {
            Self::Success { text, .. }
            | Self::ToolFailure { text, .. }
            | Self::Rejected { text, .. } => text,
        }
    }

    /// Whether this outcome represents an error (any variant except Success).
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success { .. })
    }
}

/// The tool set bound to one sheet snapshot.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    extract: ExtractEntityTool,
    save_json: SaveJsonTool,
}

impl ToolRegistry {
    pub fn new(sheet: Arc<LoadedSheet>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract: ExtractEntityTool::new(sheet),
            save_json: SaveJsonTool::new(output_dir),
        }
    }

    /// Definitions sent to the model with every decision request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![self.extract.definition(), self.save_json.definition()]
    }

    pub fn tool_names(&self) -> [&'static str; 2] {
        [ExtractEntityTool::NAME, SaveJsonTool::NAME]
    }

    /// Turn a raw model tool call into a validated intent.
    pub fn resolve(&self, call: &ToolCall) -> Result<ToolIntent, ToolError> {
        match call.name.as_str() {
            ExtractEntityTool::NAME => Ok(ToolIntent::ExtractEntity(
                self.extract.parse_args(&call.arguments)?,
            )),
            SaveJsonTool::NAME => Ok(ToolIntent::SaveJson(
                self.save_json.parse_args(&call.arguments)?,
            )),
            other => Err(ToolError::UnknownTool {
                name: other.to_string(),
                available: self.tool_names().join(", "),
            }),
        }
    }

    /// Run a validated intent.
    pub fn execute(&self, intent: ToolIntent) -> Result<String, String> {
        match intent {
            ToolIntent::ExtractEntity(args) => self.extract.call(args),
            ToolIntent::SaveJson(args) => self.save_json.call(args),
        }
    }

    /// Resolve and run one model tool call. Never fails: every problem is
    /// reported through the outcome text.
    pub fn invoke(&self, call: &ToolCall) -> ToolOutcome {
        let start = Instant::now();
        let tool_name = call.name.clone();

        let intent = match self.resolve(call) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(tool = %tool_name, error = %e, "tool call rejected");
                return ToolOutcome::Rejected {
                    tool_name,
                    text: format!("Error: {e}"),
                };
            }
        };

        let outcome = match self.execute(intent) {
            Ok(text) => ToolOutcome::Success { tool_name, text },
            Err(text) => ToolOutcome::ToolFailure { tool_name, text },
        };

        tracing::info!(
            tool = %call.name,
            is_error = outcome.is_error(),
            duration_ms = start.elapsed().as_millis() as u64,
            "tool executed"
        );
        outcome
    }
}
