//! Persistence boundary for alert definitions.
//!
//! The editor never talks to a backend directly: everything goes through a
//! [`DefinitionStore`]. `alertdesk-client` provides the REST implementation,
//! [`LocalDefinitionStore`] keeps definitions in memory or in a JSON file.

mod local;

pub use local::LocalDefinitionStore;

use crate::schema::{AlertDefinition, DefinitionListing};

/// Errors raised by a definition store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Non-2xx response or network failure. `message` is shown to the user verbatim.
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    #[error("Alert definition '{0}' was not found.")]
    NotFound(String),

    #[error("Alert definition '{0}' already exists.")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        StoreError::Transport {
            status,
            message: message.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Backend holding the authoritative list of definitions and the blueprint catalog.
#[async_trait::async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Full listing: every definition plus the current blueprint catalog.
    async fn list(&self) -> StoreResult<DefinitionListing>;

    /// Persist a new definition and return it as stored.
    async fn create(&self, definition: &AlertDefinition) -> StoreResult<AlertDefinition>;

    /// Replace the definition stored under `id` and return it as stored.
    async fn update(&self, id: &str, definition: &AlertDefinition) -> StoreResult<AlertDefinition>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Human-readable name for logs (e.g. "http", "local").
    fn backend_name(&self) -> &str;
}
