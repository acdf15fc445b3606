//! Shared configuration for the alertdesk workspace.

pub mod config;

pub use config::{load_dotenv, Config, ServerConfig, StorageConfig};
