//! In-process definition store, optionally backed by a JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::catalog::BlueprintCatalog;
use crate::schema::{AlertDefinition, BlueprintSpec, DefinitionListing};

use super::{DefinitionStore, StoreError, StoreResult};

/// Definition store living in this process.
///
/// When opened on a path, the definitions are loaded from a JSON array and
/// every mutation rewrites the file atomically (`.tmp` then rename).
pub struct LocalDefinitionStore {
    path: Option<PathBuf>,
    definitions: RwLock<Vec<AlertDefinition>>,
    blueprints: IndexMap<String, BlueprintSpec>,
}

impl LocalDefinitionStore {
    /// Memory-only store serving the given catalog.
    pub fn in_memory(catalog: &BlueprintCatalog, definitions: Vec<AlertDefinition>) -> Self {
        Self {
            path: None,
            definitions: RwLock::new(definitions),
            blueprints: catalog.specs().clone(),
        }
    }

    /// File-backed store. A missing or blank file starts empty.
    pub fn open(path: impl Into<PathBuf>, catalog: &BlueprintCatalog) -> StoreResult<Self> {
        let path = path.into();
        let definitions = read_definitions(&path)?;
        info!(path = %path.display(), count = definitions.len(), "opened local definition store");
        Ok(Self {
            path: Some(path),
            definitions: RwLock::new(definitions),
            blueprints: catalog.specs().clone(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, definitions: &[AlertDefinition]) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(definitions)?;
        json.push('\n');

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), count = definitions.len(), "wrote definitions file");
        Ok(())
    }
}

fn read_definitions(path: &Path) -> StoreResult<Vec<AlertDefinition>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Trim the free-text fields the way the definition service does.
fn normalize(definition: &AlertDefinition) -> AlertDefinition {
    let mut normalized = definition.clone();
    normalized.name = normalized.name.trim().to_string();
    normalized.description = normalized.description.trim().to_string();
    normalized
}

#[async_trait::async_trait]
impl DefinitionStore for LocalDefinitionStore {
    async fn list(&self) -> StoreResult<DefinitionListing> {
        let definitions = self
            .definitions
            .read()
            .expect("definitions lock poisoned")
            .clone();
        Ok(DefinitionListing {
            definitions,
            blueprints: self.blueprints.clone(),
        })
    }

    async fn create(&self, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
        let stored = normalize(definition);
        let mut guard = self.definitions.write().expect("definitions lock poisoned");
        if guard.iter().any(|d| d.id == stored.id) {
            return Err(StoreError::Conflict(stored.id));
        }
        let mut next = guard.clone();
        next.push(stored.clone());
        self.persist(&next)?;
        *guard = next;
        Ok(stored)
    }

    async fn update(&self, id: &str, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
        let mut stored = normalize(definition);
        stored.id = id.to_string();
        let mut guard = self.definitions.write().expect("definitions lock poisoned");
        let index = guard
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut next = guard.clone();
        next[index] = stored.clone();
        self.persist(&next)?;
        *guard = next;
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut guard = self.definitions.write().expect("definitions lock poisoned");
        let next: Vec<AlertDefinition> = guard.iter().filter(|d| d.id != id).cloned().collect();
        if next.len() == guard.len() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "local"
    }
}
