use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use alertdesk_client::HttpDefinitionStore;
use alertdesk_core::Config;
use alertdesk_rules::store::{DefinitionStore, LocalDefinitionStore};
use alertdesk_rules::BlueprintCatalog;

use crate::cli::CliArgs;

/// Where definitions are read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Remote { base_url: String, timeout: Duration },
    Local { path: PathBuf },
}

impl Backend {
    /// Resolve the backend. Flags win over the environment config.
    pub fn resolve(config: &Config, args: &CliArgs) -> Self {
        let timeout = Duration::from_secs(args.timeout.unwrap_or(config.server.timeout_secs));
        let server = args
            .server
            .clone()
            .or_else(|| config.server.base_url.clone())
            .filter(|url| !url.trim().is_empty());

        // An explicit data file means local mode even if a server is configured.
        match (server, &args.data_file) {
            (_, Some(path)) => Backend::Local { path: path.clone() },
            (Some(base_url), None) => Backend::Remote { base_url, timeout },
            (None, None) => Backend::Local {
                path: config.storage.definitions_path.clone(),
            },
        }
    }

    /// Open the definition store for this backend.
    pub fn open(&self) -> Result<Arc<dyn DefinitionStore>> {
        debug!(backend = ?self, "opening definition store");
        match self {
            Backend::Remote { base_url, timeout } => {
                let store = HttpDefinitionStore::new(base_url, *timeout)
                    .context("failed to create definition service client")?;
                Ok(Arc::new(store))
            }
            Backend::Local { path } => {
                let store = LocalDefinitionStore::open(path, &BlueprintCatalog::builtin())
                    .with_context(|| format!("failed to open definitions file '{}'", path.display()))?;
                Ok(Arc::new(store))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Remote { base_url, .. } => base_url.clone(),
            Backend::Local { path } => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup("", |key| vars.get(key).cloned())
    }

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["alertdesk"];
        argv.extend_from_slice(extra);
        argv.push("list");
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_to_local_file() {
        let backend = Backend::resolve(&config(&[]), &args(&[]));
        assert_eq!(
            backend,
            Backend::Local {
                path: PathBuf::from("data/alert_definitions.json")
            }
        );
    }

    #[test]
    fn env_server_selects_remote() {
        let cfg = config(&[
            ("ALERTDESK_SERVER_URL", "http://alerts:8080"),
            ("ALERTDESK_TIMEOUT_SECS", "3"),
        ]);
        let backend = Backend::resolve(&cfg, &args(&[]));
        assert_eq!(
            backend,
            Backend::Remote {
                base_url: "http://alerts:8080".into(),
                timeout: Duration::from_secs(3),
            }
        );
    }

    #[test]
    fn flags_override_environment() {
        let cfg = config(&[("ALERTDESK_SERVER_URL", "http://alerts:8080")]);

        let backend = Backend::resolve(&cfg, &args(&["--server", "http://other", "--timeout", "1"]));
        assert_eq!(
            backend,
            Backend::Remote {
                base_url: "http://other".into(),
                timeout: Duration::from_secs(1),
            }
        );

        let backend = Backend::resolve(&cfg, &args(&["--data-file", "mine.json"]));
        assert_eq!(backend, Backend::Local { path: PathBuf::from("mine.json") });
    }

    #[test]
    fn opens_local_store_in_fresh_directory() {
        let dir = tempfile::TempDir::new().expect("create tempdir");
        let backend = Backend::Local {
            path: dir.path().join("defs.json"),
        };
        let store = backend.open().unwrap();
        assert_eq!(store.backend_name(), "local");
    }
}
