//! Session error types.

use thiserror::Error;

use crate::tabular::TabularError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No session with this id.
    #[error("session not found: '{session_id}'")]
    NotFound { session_id: String },

    /// Structural failure from the document store.
    #[error(transparent)]
    Tabular(#[from] TabularError),
}
