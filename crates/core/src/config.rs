use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Env key holding the active profile name.
pub const PROFILE_KEY: &str = "ALERTDESK_PROFILE";

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Profiled lookup over an arbitrary source: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt<F>(lookup: &F, profile: &str, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed).filter(|s| !s.is_empty()) {
            return Some(v);
        }
    }
    lookup(key).filter(|s| !s.is_empty())
}

fn profiled_u64<F>(lookup: &F, profile: &str, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    profiled_opt(lookup, profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ALERTDESK_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_opt(PROFILE_KEY).unwrap_or_default();
        Self::from_lookup(&profile, env_opt)
    }

    /// Build config for a named profile from any key/value source.
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_lookup(&lookup, p),
            storage: StorageConfig::from_lookup(&lookup, p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  server:   url={}, timeout={}s",
            self.server.base_url.as_deref().unwrap_or("(local)"),
            self.server.timeout_secs
        );
        tracing::info!("  storage:  definitions={}", self.storage.definitions_path.display());
    }
}

// ── Server ────────────────────────────────────────────────────

/// Remote definition service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the definition service; `None` selects the local file store.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl ServerConfig {
    fn from_lookup<F>(lookup: &F, p: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: profiled_opt(lookup, p, "ALERTDESK_SERVER_URL"),
            timeout_secs: profiled_u64(lookup, p, "ALERTDESK_TIMEOUT_SECS", 10),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the local definition store.
    pub definitions_path: PathBuf,
}

impl StorageConfig {
    fn from_lookup<F>(lookup: &F, p: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            definitions_path: PathBuf::from(
                profiled_opt(lookup, p, "ALERTDESK_DATA_FILE")
                    .unwrap_or_else(|| "data/alert_definitions.json".to_string()),
            ),
        }
    }
}
