//! One collection plus one editor, wired together.
//!
//! [`ConfigSession`] is what a front end drives: it routes editor payloads to
//! the collection and turns every outcome into editor feedback.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collection::DefinitionCollection;
use crate::editor::{DefinitionEditor, EditorMode, Feedback, LogicEditor};
use crate::error::{EditorError, Result};
use crate::schema::AlertDefinition;
use crate::store::DefinitionStore;

/// Asks the user to confirm a destructive action.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmer said no. Nothing was sent.
    Declined,
}

pub struct ConfigSession {
    collection: DefinitionCollection,
    editor: DefinitionEditor,
}

impl ConfigSession {
    pub fn new(store: Arc<dyn DefinitionStore>) -> Self {
        let collection = DefinitionCollection::new(store);
        let editor = DefinitionEditor::new(collection.catalog());
        Self { collection, editor }
    }

    pub fn collection(&self) -> &DefinitionCollection {
        &self.collection
    }

    pub fn editor(&self) -> &DefinitionEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut DefinitionEditor {
        &mut self.editor
    }

    /// Refresh the collection and reconcile the editor with its selection.
    pub async fn load(&mut self) -> Result<()> {
        let snapshot = match self.collection.refresh().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let e = EditorError::from(e);
                self.editor.set_feedback(Feedback::error(e.to_string()));
                return Err(e);
            }
        };
        self.editor.set_catalog(snapshot.catalog);
        self.reconcile();
        Ok(())
    }

    fn reconcile(&mut self) {
        match self.collection.selected().and_then(|id| self.collection.get(&id)) {
            Some(definition) => self.editor.select(&definition),
            None => {
                let pristine = matches!(self.editor.logic(), LogicEditor::Structured(None));
                if matches!(self.editor.mode(), EditorMode::Edit(_)) || pristine {
                    self.editor.start_new();
                }
            }
        }
    }

    /// Load a definition from the collection into the editor.
    pub fn select(&mut self, id: &str) -> Result<()> {
        let definition = self
            .collection
            .get(id)
            .ok_or_else(|| EditorError::NotFound(id.to_string()))?;
        self.collection.select(Some(id));
        self.editor.select(&definition);
        Ok(())
    }

    pub fn start_new(&mut self) {
        self.collection.select(None);
        self.editor.start_new();
    }

    pub fn toggle_raw(&mut self, enable: bool) -> Result<()> {
        self.editor.toggle_raw(enable)
    }

    /// Validate the working copy and create or update it.
    ///
    /// On failure the working copy is kept as is and the error becomes feedback.
    pub async fn submit(&mut self) -> Result<AlertDefinition> {
        let result = self.save().await;
        match &result {
            Ok(saved) => {
                match self.collection.get(&saved.id) {
                    Some(stored) => self.editor.select(&stored),
                    None => self.editor.select(saved),
                }
                self.editor.set_feedback(Feedback::info("Alert definition saved."));
            }
            Err(e) => {
                warn!(error = %e, "alert definition not saved");
                self.editor.set_feedback(Feedback::error(e.to_string()));
            }
        }
        result
    }

    async fn save(&self) -> Result<AlertDefinition> {
        let payload = self.editor.build_payload()?;
        match self.editor.mode() {
            EditorMode::Create => self.collection.create(payload).await,
            EditorMode::Edit(id) => self.collection.update(id, payload).await,
        }
    }

    /// Delete the definition being edited after asking `confirmer`.
    pub async fn delete(&mut self, confirmer: &dyn Confirmer) -> Result<DeleteOutcome> {
        let Some(id) = self.editor.delete_target().map(str::to_string) else {
            let e = EditorError::validation("Select an alert definition to delete.");
            self.editor.set_feedback(Feedback::error(e.to_string()));
            return Err(e);
        };
        let name = self
            .collection
            .get(&id)
            .map(|d| d.name)
            .unwrap_or_else(|| id.clone());
        if !confirmer.confirm(&format!("Delete alert definition '{name}'?")) {
            debug!(definition_id = %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        match self.collection.remove(&id).await {
            Ok(()) => {
                self.editor.start_new();
                self.editor.set_feedback(Feedback::info("Alert definition deleted."));
                info!(definition_id = %id, "session deleted definition");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                warn!(definition_id = %id, error = %e, "alert definition not deleted");
                self.editor.set_feedback(Feedback::error(e.to_string()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BlueprintCatalog;
    use crate::schema::{DefinitionListing, LogicSpec};
    use crate::store::{LocalDefinitionStore, StoreError, StoreResult};
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Local store that counts mutations and can be told to fail them.
    struct CountingStore {
        inner: LocalDefinitionStore,
        mutations: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingStore {
        fn new(definitions: Vec<AlertDefinition>) -> Arc<Self> {
            Arc::new(Self {
                inner: LocalDefinitionStore::in_memory(&BlueprintCatalog::builtin(), definitions),
                mutations: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            })
        }

        fn mutate(&self) -> StoreResult<()> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::transport(Some(502), "Failed to save alert definition."));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl DefinitionStore for CountingStore {
        async fn list(&self) -> StoreResult<DefinitionListing> {
            self.inner.list().await
        }

        async fn create(&self, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
            self.mutate()?;
            self.inner.create(definition).await
        }

        async fn update(&self, id: &str, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
            self.mutate()?;
            self.inner.update(id, definition).await
        }

        async fn delete(&self, id: &str) -> StoreResult<()> {
            self.mutate()?;
            self.inner.delete(id).await
        }

        fn backend_name(&self) -> &str {
            "counting"
        }
    }

    fn stored(id: &str) -> AlertDefinition {
        let mut parameters = Map::new();
        parameters.insert("role".into(), json!("Admin"));
        AlertDefinition {
            id: id.to_string(),
            name: format!("{id} name"),
            description: String::new(),
            enabled: true,
            logic: LogicSpec::new("missing_role", parameters),
        }
    }

    async fn loaded(definitions: Vec<AlertDefinition>) -> (Arc<CountingStore>, ConfigSession) {
        let store = CountingStore::new(definitions);
        let mut session = ConfigSession::new(store.clone());
        session.load().await.unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn load_seeds_create_form_with_first_blueprint() {
        let (_, session) = loaded(Vec::new()).await;
        assert_eq!(*session.editor().mode(), EditorMode::Create);
        // "Duplicate contact point" sorts first by label.
        assert_eq!(session.editor().selected_blueprint(), Some("duplicate_contact_point"));
    }

    #[tokio::test]
    async fn empty_id_never_reaches_the_store() {
        let (store, mut session) = loaded(Vec::new()).await;
        session.editor_mut().set_name("Name");

        let err = session.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Identifier and name are required.");
        assert_eq!(store.mutations.load(Ordering::SeqCst), 0);
        let feedback = session.editor().feedback().unwrap();
        assert!(feedback.is_error);
        assert_eq!(feedback.message, "Identifier and name are required.");
    }

    #[tokio::test]
    async fn create_then_edit_round_trip() {
        let (_, mut session) = loaded(Vec::new()).await;
        session.editor_mut().set_id("roles").unwrap();
        session.editor_mut().set_name("  Role check ");
        session.editor_mut().choose_blueprint("missing_role").unwrap();
        session.editor_mut().set_field("role", "Admin").unwrap();

        let saved = session.submit().await.unwrap();
        assert_eq!(saved.name, "Role check");
        assert_eq!(*session.editor().mode(), EditorMode::Edit("roles".into()));
        assert_eq!(session.editor().feedback().unwrap().message, "Alert definition saved.");
        assert_eq!(session.collection().selected().as_deref(), Some("roles"));

        session.editor_mut().set_enabled(false);
        session.submit().await.unwrap();
        assert!(!session.collection().get("roles").unwrap().enabled);
    }

    #[tokio::test]
    async fn declined_delete_changes_nothing() {
        let (store, mut session) = loaded(vec![stored("d1")]).await;
        session.select("d1").unwrap();
        session.editor_mut().set_name("unsaved edit");

        let outcome = session.delete(&|_: &str| false).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(store.mutations.load(Ordering::SeqCst), 0);
        assert_eq!(session.collection().definitions().len(), 1);
        assert_eq!(session.editor().name(), "unsaved edit");
        assert_eq!(*session.editor().mode(), EditorMode::Edit("d1".into()));
    }

    #[tokio::test]
    async fn confirmed_delete_resets_editor() {
        let (_, mut session) = loaded(vec![stored("d1")]).await;
        session.select("d1").unwrap();

        let prompts = std::cell::RefCell::new(Vec::new());
        let confirmer = |prompt: &str| {
            prompts.borrow_mut().push(prompt.to_string());
            true
        };
        let outcome = session.delete(&confirmer).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(prompts.borrow().as_slice(), ["Delete alert definition 'd1 name'?"]);
        assert!(session.collection().definitions().is_empty());
        assert_eq!(*session.editor().mode(), EditorMode::Create);
        assert_eq!(session.editor().feedback().unwrap().message, "Alert definition deleted.");
    }

    #[tokio::test]
    async fn delete_requires_edit_mode() {
        let (store, mut session) = loaded(vec![stored("d1")]).await;
        assert!(session.delete(&|_: &str| true).await.is_err());
        assert_eq!(store.mutations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_keeps_working_copy() {
        let (store, mut session) = loaded(vec![stored("d1")]).await;
        session.select("d1").unwrap();
        session.editor_mut().set_field("role", "Viewer").unwrap();
        store.fail.store(true, Ordering::SeqCst);

        let err = session.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to save alert definition.");
        assert_eq!(
            session.editor().form().unwrap().value("role"),
            Some(&json!("Viewer"))
        );
        assert!(session.editor().feedback().unwrap().is_error);
        assert_eq!(
            session.collection().get("d1").unwrap().logic.parameters["role"],
            json!("Admin")
        );
    }

    #[tokio::test]
    async fn reload_drops_edit_mode_when_selection_vanishes() {
        let store = CountingStore::new(vec![stored("d1")]);
        let mut session = ConfigSession::new(store.clone());
        session.load().await.unwrap();
        session.select("d1").unwrap();

        // Removed behind the session's back.
        store.inner.delete("d1").await.unwrap();
        session.load().await.unwrap();
        assert!(session.collection().selected().is_none());
        assert_eq!(*session.editor().mode(), EditorMode::Create);
    }

    #[tokio::test]
    async fn select_unknown_id_is_not_found() {
        let (_, mut session) = loaded(Vec::new()).await;
        let err = session.select("ghost").unwrap_err();
        assert!(matches!(err, EditorError::NotFound(_)));
    }

    /// Local store whose `list` fails on the calls named in `failing_lists`.
    struct FlakyListStore {
        inner: LocalDefinitionStore,
        lists: AtomicUsize,
        failing_lists: Vec<usize>,
    }

    impl FlakyListStore {
        fn new(definitions: Vec<AlertDefinition>, failing_lists: Vec<usize>) -> Arc<Self> {
            Arc::new(Self {
                inner: LocalDefinitionStore::in_memory(&BlueprintCatalog::builtin(), definitions),
                lists: AtomicUsize::new(0),
                failing_lists,
            })
        }
    }

    #[async_trait::async_trait]
    impl DefinitionStore for FlakyListStore {
        async fn list(&self) -> StoreResult<DefinitionListing> {
            let call = self.lists.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing_lists.contains(&call) {
                return Err(StoreError::transport(None, "Failed to load alert definitions."));
            }
            self.inner.list().await
        }

        async fn create(&self, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
            self.inner.create(definition).await
        }

        async fn update(&self, id: &str, definition: &AlertDefinition) -> StoreResult<AlertDefinition> {
            self.inner.update(id, definition).await
        }

        async fn delete(&self, id: &str) -> StoreResult<()> {
            self.inner.delete(id).await
        }

        fn backend_name(&self) -> &str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn create_succeeds_when_reload_after_save_fails() {
        let store = FlakyListStore::new(Vec::new(), vec![2]);
        let mut session = ConfigSession::new(store.clone());
        session.load().await.unwrap();
        session.editor_mut().set_id("d1").unwrap();
        session.editor_mut().set_name("First");

        let saved = session.submit().await.unwrap();
        assert_eq!(saved.id, "d1");
        assert_eq!(*session.editor().mode(), EditorMode::Edit("d1".into()));
        assert_eq!(session.editor().feedback().unwrap().message, "Alert definition saved.");
        assert_eq!(session.collection().get("d1").unwrap().name, "First");

        // Saving again updates instead of failing with a duplicate.
        session.editor_mut().set_name("Renamed");
        session.submit().await.unwrap();
        let listing = store.inner.list().await.unwrap();
        let names: Vec<&str> = listing.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Renamed"]);
    }

    #[tokio::test]
    async fn delete_succeeds_when_reload_after_delete_fails() {
        let store = FlakyListStore::new(vec![stored("d1")], vec![2]);
        let mut session = ConfigSession::new(store.clone());
        session.load().await.unwrap();
        session.select("d1").unwrap();

        let outcome = session.delete(&|_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(*session.editor().mode(), EditorMode::Create);
        assert!(session.collection().get("d1").is_none());
        assert!(store.inner.list().await.unwrap().definitions.is_empty());
    }
}
