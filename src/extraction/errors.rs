//! Extraction error types.

use thiserror::Error;

/// Failures of a single extraction. Never propagated past the tool layer:
/// the message is handed to the model as the tool result.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The id is not one of the configured plants.
    #[error("plant '{entity_id}' not found; valid plants are: {valid}")]
    UnknownEntity { entity_id: String, valid: String },

    /// The sheet is narrower than the plant's column block.
    #[error("column '{column}' not found in the sheet for plant '{entity_id}'")]
    MissingColumn { entity_id: String, column: String },

    /// The summed quantities do not fit in an `i64`.
    #[error("total production of plant '{entity_id}' is too large to represent")]
    TotalOverflow { entity_id: String },

    /// Result could not be serialized.
    #[error("failed to serialize extraction result: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for ExtractionError {
    fn from(e: serde_json::Error) -> Self {
        ExtractionError::Serialization {
            reason: e.to_string(),
        }
    }
}
