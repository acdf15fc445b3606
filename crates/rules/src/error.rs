//! Errors surfaced by editor and collection operations.

use crate::raw::RawLogicError;
use crate::store::StoreError;

/// Errors raised at an editing operation boundary.
///
/// Every variant renders as a message fit for the status area.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Missing or malformed local input. Blocks submission, nothing is sent.
    #[error("{0}")]
    Validation(String),

    /// Raw logic text that cannot be parsed back into a logic object.
    #[error(transparent)]
    RawLogic(#[from] RawLogicError),

    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A save or delete for this definition is still outstanding.
    #[error("Alert definition '{0}' is already being saved or deleted.")]
    Busy(String),

    #[error("Alert definition '{0}' was not found.")]
    NotFound(String),
}

impl EditorError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EditorError::Validation(message.into())
    }
}

/// Result alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
