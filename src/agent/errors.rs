//! Agent error types.

use thiserror::Error;

use crate::inference::InferenceError;

/// Errors that end a query resolution early.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The decision step (model call) failed.
    #[error("decision failed: {reason}")]
    Decision { reason: String },

    /// The loop hit its round limit without a final answer.
    #[error("no final answer after {max_steps} rounds")]
    StepLimit { max_steps: usize },
}

impl From<InferenceError> for AgentError {
    fn from(e: InferenceError) -> Self {
        AgentError::Decision {
            reason: e.to_string(),
        }
    }
}
