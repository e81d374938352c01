//! Tabular Store error types.

use thiserror::Error;

/// Errors surfaced by document loading and sheet selection.
#[derive(Debug, Error)]
pub enum TabularError {
    /// The file could not be opened or its sheet list could not be read.
    /// All document state is reset when this is returned.
    #[error("failed to read file '{path}': {reason}")]
    LoadError { path: String, reason: String },

    /// An operation was attempted before its prerequisite step.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    /// The requested sheet is not part of the loaded document.
    #[error("sheet '{sheet_name}' not found in the file")]
    NotFound { sheet_name: String },

    /// The sheet exists but its data could not be read.
    #[error("failed to load data for sheet '{sheet_name}': {reason}")]
    ReadError { sheet_name: String, reason: String },
}

impl TabularError {
    /// Shorthand for the "no document yet" state error.
    pub fn no_document() -> Self {
        TabularError::InvalidState {
            reason: "no file has been loaded, upload one first".to_string(),
        }
    }

    /// Shorthand for the "no sheet selected yet" state error.
    pub fn no_sheet() -> Self {
        TabularError::InvalidState {
            reason: "no sheet is selected for analysis, select one first".to_string(),
        }
    }
}
