//! Alert definition editing engine.
//!
//! This crate provides:
//! - Blueprint schemas and the catalog advertised by the backend
//! - Value coercion and merge-with-defaults for parameter fields
//! - The structured/raw definition editor state machine
//! - The definition collection with refresh and CRUD orchestration
//! - The `DefinitionStore` persistence boundary and a local JSON-file store

pub mod catalog;
pub mod coercion;
pub mod collection;
pub mod editor;
pub mod error;
pub mod form;
pub mod raw;
pub mod schema;
pub mod session;
pub mod store;

pub use catalog::BlueprintCatalog;
pub use collection::DefinitionCollection;
pub use editor::{DefinitionEditor, EditorMode, Feedback};
pub use error::EditorError;
pub use schema::{AlertDefinition, LogicSpec};
pub use session::{ConfigSession, Confirmer, DeleteOutcome};
pub use store::{DefinitionStore, LocalDefinitionStore, StoreError};
