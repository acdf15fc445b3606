//! In-memory list of persisted definitions plus CRUD orchestration.
//!
//! The collection owns the definition list and the blueprint catalog. Every
//! mutation goes to the store and is followed by a full re-fetch, so the list
//! always reflects backend-assigned fields rather than a local patch.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, warn};

use crate::catalog::BlueprintCatalog;
use crate::error::{EditorError, Result};
use crate::schema::AlertDefinition;
use crate::store::{DefinitionStore, StoreResult};

/// Definitions and catalog as of one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub definitions: Vec<AlertDefinition>,
    pub catalog: Arc<BlueprintCatalog>,
}

struct CollectionState {
    definitions: Vec<AlertDefinition>,
    catalog: Arc<BlueprintCatalog>,
    selected: Option<String>,
    /// Generation of the refresh whose response is currently applied.
    applied_generation: u64,
}

/// Marks a definition id as having a mutation outstanding until dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().expect("in_flight lock poisoned").remove(&self.id);
    }
}

/// The authoritative list of alert definitions on the client side.
pub struct DefinitionCollection {
    store: Arc<dyn DefinitionStore>,
    state: RwLock<CollectionState>,
    in_flight: Mutex<HashSet<String>>,
    /// Incremented for every issued refresh.
    generation: AtomicU64,
}

impl DefinitionCollection {
    pub fn new(store: Arc<dyn DefinitionStore>) -> Self {
        Self {
            store,
            state: RwLock::new(CollectionState {
                definitions: Vec::new(),
                catalog: Arc::new(BlueprintCatalog::default()),
                selected: None,
                applied_generation: 0,
            }),
            in_flight: Mutex::new(HashSet::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Re-fetch definitions and catalog, replacing both.
    ///
    /// Selection survives when its id is still present. A response that
    /// resolves after a later-issued refresh was applied is discarded.
    pub async fn refresh(&self) -> StoreResult<CollectionSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let listing = self.store.list().await.map_err(|e| {
            warn!(backend = self.store.backend_name(), error = %e, "failed to load alert definitions");
            e
        })?;

        let mut state = self.state.write().expect("collection state lock poisoned");
        if generation < state.applied_generation {
            debug!(generation, applied = state.applied_generation, "discarding stale refresh");
            return Ok(snapshot_of(&state));
        }

        state.definitions = listing.definitions;
        state.catalog = Arc::new(BlueprintCatalog::load(listing.blueprints));
        state.applied_generation = generation;
        let keep_selection = state
            .selected
            .as_ref()
            .is_some_and(|id| state.definitions.iter().any(|d| &d.id == id));
        if !keep_selection {
            state.selected = None;
        }
        debug!(
            definitions = state.definitions.len(),
            blueprints = state.catalog.len(),
            "alert definitions refreshed"
        );
        Ok(snapshot_of(&state))
    }

    /// Persist a new definition, select it, and re-fetch.
    pub async fn create(&self, payload: AlertDefinition) -> Result<AlertDefinition> {
        if self.get(&payload.id).is_some() {
            return Err(EditorError::validation(format!(
                "Alert definition '{}' already exists.",
                payload.id
            )));
        }
        let _guard = self.begin(&payload.id)?;
        let saved = self.store.create(&payload).await?;
        info!(definition_id = %saved.id, "created alert definition");
        self.select(Some(&saved.id));
        self.reload_after_mutation(&saved.id, Some(&saved)).await;
        Ok(saved)
    }

    /// Replace the definition stored under `id`. The payload may not rename it.
    pub async fn update(&self, id: &str, payload: AlertDefinition) -> Result<AlertDefinition> {
        if payload.id != id {
            return Err(EditorError::validation(format!(
                "The identifier of '{id}' cannot be changed; create a new definition instead."
            )));
        }
        let _guard = self.begin(id)?;
        let saved = self.store.update(id, &payload).await?;
        info!(definition_id = %id, "updated alert definition");
        self.select(Some(id));
        self.reload_after_mutation(id, Some(&saved)).await;
        Ok(saved)
    }

    /// Delete a definition and re-fetch. Clears the selection if it pointed there.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.begin(id)?;
        self.store.delete(id).await?;
        info!(definition_id = %id, "deleted alert definition");
        {
            let mut state = self.state.write().expect("collection state lock poisoned");
            if state.selected.as_deref() == Some(id) {
                state.selected = None;
            }
        }
        self.reload_after_mutation(id, None).await;
        Ok(())
    }

    /// Re-fetch after a mutation the store already accepted.
    ///
    /// A failed re-fetch does not undo the mutation: the stored definition
    /// (or its removal when `saved` is `None`) is applied to the local list
    /// so the list keeps matching the backend until the next refresh.
    async fn reload_after_mutation(&self, id: &str, saved: Option<&AlertDefinition>) {
        let Err(e) = self.refresh().await else {
            return;
        };
        warn!(definition_id = %id, error = %e, "mutation applied but reloading definitions failed");
        let mut state = self.state.write().expect("collection state lock poisoned");
        let position = state.definitions.iter().position(|d| d.id == id);
        match (saved, position) {
            (Some(saved), Some(index)) => state.definitions[index] = saved.clone(),
            (Some(saved), None) => state.definitions.push(saved.clone()),
            (None, Some(index)) => {
                state.definitions.remove(index);
            }
            (None, None) => {}
        }
    }

    fn begin(&self, id: &str) -> Result<InFlightGuard<'_>> {
        let mut set = self.in_flight.lock().expect("in_flight lock poisoned");
        if !set.insert(id.to_string()) {
            warn!(definition_id = %id, "mutation already in flight");
            return Err(EditorError::Busy(id.to_string()));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            id: id.to_string(),
        })
    }

    /// Whether a save or delete for `id` is outstanding.
    pub fn is_busy(&self, id: &str) -> bool {
        self.in_flight.lock().expect("in_flight lock poisoned").contains(id)
    }

    /// Select a definition by id, or clear the selection.
    ///
    /// Ids not in the current list are kept until the next refresh confirms or clears them.
    pub fn select(&self, id: Option<&str>) {
        let mut state = self.state.write().expect("collection state lock poisoned");
        state.selected = id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<String> {
        self.state.read().expect("collection state lock poisoned").selected.clone()
    }

    pub fn get(&self, id: &str) -> Option<AlertDefinition> {
        self.state
            .read()
            .expect("collection state lock poisoned")
            .definitions
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn definitions(&self) -> Vec<AlertDefinition> {
        self.state.read().expect("collection state lock poisoned").definitions.clone()
    }

    pub fn catalog(&self) -> Arc<BlueprintCatalog> {
        Arc::clone(&self.state.read().expect("collection state lock poisoned").catalog)
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        snapshot_of(&self.state.read().expect("collection state lock poisoned"))
    }
}

fn snapshot_of(state: &CollectionState) -> CollectionSnapshot {
    CollectionSnapshot {
        definitions: state.definitions.clone(),
        catalog: Arc::clone(&state.catalog),
    }
}
