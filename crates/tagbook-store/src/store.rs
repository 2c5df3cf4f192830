//! The authoritative in-memory note store for a session.
//!
//! Owns the note list, tag library, and selection state; reconciles editor
//! content against note tag sets; and relays persistence to the remote note
//! API with the local snapshot as fallback. All mutation funnels through
//! named operations on [`NoteStore`]; there is no ambient global state.
//!
//! Mutation is single-threaded by construction (`&mut self` everywhere);
//! the only suspension points are the remote adapter calls.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use tagbook_core::content::{self, ContentNode};
use tagbook_core::{
    Error, EventBus, Note, NoteApi, NoteId, Result, Session, SnapshotStore, StoredState, Stroke,
    SyncStatus, ViewEvent,
};

use crate::session::{ListFilter, SessionState, TagStat, View};
use crate::tag_library::TagLibrary;

/// The editor's working copy of the active note.
///
/// Deep-cloned into the store on every update so mutating a rendered note
/// never mutates the stored note until an explicit save.
#[derive(Debug, Clone, Default)]
pub struct EditorDraft {
    pub title: String,
    pub content: Vec<ContentNode>,
    pub strokes: Vec<Stroke>,
}

/// Local-first note store with remote sync.
pub struct NoteStore<A, S> {
    pub(crate) api: A,
    snapshots: S,
    bus: EventBus,
    pub(crate) notes: Vec<Note>,
    pub(crate) library: TagLibrary,
    pub(crate) session: SessionState,
    pub(crate) owner: Option<String>,
    pub(crate) draft: Option<EditorDraft>,
    // Reentrancy latches. Direct callers are already serialized by
    // `&mut self`; the flags keep the non-reentrant contract explicit for
    // wrappers that add interior mutability around the store.
    is_loading: bool,
    save_in_flight: bool,
}

impl<A: NoteApi, S: SnapshotStore> NoteStore<A, S> {
    pub fn new(api: A, snapshots: S) -> Self {
        let mut library = TagLibrary::new();
        library.seed_defaults();
        Self {
            api,
            snapshots,
            bus: EventBus::default(),
            notes: Vec::new(),
            library,
            session: SessionState::default(),
            owner: None,
            draft: None,
            is_loading: false,
            save_in_flight: false,
        }
    }

    // ─── Read access ───────────────────────────────────────────────────────

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.session.active_note.as_ref().and_then(|id| self.note(id))
    }

    pub fn library(&self) -> &TagLibrary {
        &self.library
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Projection: the note list dataset for the current selection.
    pub fn list_dataset(&self) -> Vec<Note> {
        self.session.list_dataset(&self.notes)
    }

    /// Projection: per-tag usage stats for the tag cloud.
    pub fn tag_stats(&self) -> std::collections::HashMap<String, TagStat> {
        crate::session::tag_stats(&self.notes)
    }

    /// Projection: every displayable tag in display order.
    pub fn display_tags(&self) -> Vec<String> {
        self.library.display_tags(&self.notes)
    }

    // ─── Session transitions ───────────────────────────────────────────────

    /// React to an auth provider session transition.
    ///
    /// A new session loads that owner's notes; owner changes clear the
    /// previous owner's in-memory state first, so one owner's snapshot key
    /// is never touched with another owner's data. A `None` session clears
    /// everything.
    pub async fn apply_session(&mut self, session: Option<&Session>) -> Result<()> {
        match session {
            Some(session) => {
                if self.owner.as_deref() != Some(session.user.id.as_str()) {
                    self.reset_in_memory();
                }
                self.owner = Some(session.user.id.clone());
                self.load().await
            }
            None => {
                self.reset_in_memory();
                self.owner = None;
                self.emit_status(SyncStatus::SignedOut);
                Ok(())
            }
        }
    }

    /// Explicit logout: flush unsaved edits first; a failed flush cancels
    /// the logout and the user stays on the current note.
    pub async fn logout(&mut self) -> Result<()> {
        self.flush_if_dirty().await?;
        self.reset_in_memory();
        self.owner = None;
        self.emit_status(SyncStatus::SignedOut);
        Ok(())
    }

    fn reset_in_memory(&mut self) {
        self.notes.clear();
        self.draft = None;
        self.session.reset();
        self.library.reset();
        self.library.seed_defaults();
        self.bus.emit(ViewEvent::TagCloudInvalidated);
        self.bus.emit(ViewEvent::NoteListInvalidated);
    }

    // ─── Load ──────────────────────────────────────────────────────────────

    /// Load the note store for the current owner.
    ///
    /// The remote store is authoritative: one or more remote notes fully
    /// replace local state, no merge. Zero remote notes or a remote failure
    /// fall back to the last local snapshot; with no snapshot, a single
    /// sample note is seeded.
    pub async fn load(&mut self) -> Result<()> {
        let owner = self.require_owner()?;
        if self.is_loading {
            return Ok(());
        }
        self.is_loading = true;
        let result = self.load_inner(&owner).await;
        self.is_loading = false;
        result
    }

    async fn load_inner(&mut self, owner: &str) -> Result<()> {
        self.emit_status(SyncStatus::Syncing);
        match self.api.list().await {
            Ok(notes) if !notes.is_empty() => {
                info!(owner_id = owner, result_count = notes.len(), "loaded notes from remote");
                self.notes = notes;
                self.library.reset();
                self.library.seed_defaults();
                self.ensure_note_tags();
                self.persist(owner).await;
                self.emit_status(SyncStatus::Synced);
            }
            Ok(_) => {
                debug!(owner_id = owner, "remote store empty, falling back to snapshot");
                self.restore_from_snapshot(owner).await;
                self.emit_status(SyncStatus::Synced);
            }
            Err(e) => {
                warn!(owner_id = owner, error = %e, "remote load failed, falling back to snapshot");
                self.restore_from_snapshot(owner).await;
                self.emit_status(SyncStatus::Failed);
            }
        }
        self.bus.emit(ViewEvent::TagCloudInvalidated);
        self.bus.emit(ViewEvent::NoteListInvalidated);
        Ok(())
    }

    async fn restore_from_snapshot(&mut self, owner: &str) {
        let snapshot = match self.snapshots.load(owner).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(owner_id = owner, error = %e, "snapshot load failed");
                None
            }
        };
        match snapshot {
            Some(state) => {
                self.notes = state.notes;
                self.library.restore(state.tags);
                self.ensure_note_tags();
            }
            None => {
                self.notes = vec![Note::sample(Some(owner.to_string()))];
                self.library.reset();
                self.library.seed_defaults();
                self.ensure_note_tags();
                self.persist(owner).await;
            }
        }
    }

    /// Every tag referenced by any note exists in the library.
    fn ensure_note_tags(&mut self) {
        for note in &self.notes {
            for tag in &note.tags {
                self.library.ensure(tag);
            }
        }
    }

    pub(crate) async fn persist(&self, owner: &str) {
        let state = StoredState::new(self.notes.clone(), self.library.entries());
        if let Err(e) = self.snapshots.save(owner, &state).await {
            // Storage failures never block in-memory operation.
            warn!(owner_id = owner, error = %e, "failed to persist local snapshot");
        }
    }

    // ─── Editing ───────────────────────────────────────────────────────────

    /// Create an empty local-only note, inheriting the active tag filter.
    /// Flushes unsaved edits on the previously open note first.
    pub async fn create_note(&mut self) -> Result<NoteId> {
        let owner = self.require_owner()?;
        self.flush_if_dirty().await?;
        let inherited: Vec<String> = self.session.active_tag.iter().cloned().collect();
        for tag in &inherited {
            self.library.ensure(tag);
        }
        let note = Note::new_local(Some(owner.clone()), inherited.clone());
        let id = note.id.clone();
        self.notes.insert(0, note);
        self.session.active_note = Some(id.clone());
        self.session.view = View::Editor;
        self.session.editor_tags = inherited.iter().cloned().collect();
        self.session.tag_signature = content::signature_of(inherited.iter().map(String::as_str));
        self.draft = None;
        self.mark_dirty();
        self.persist(&owner).await;
        self.bus.emit(ViewEvent::NoteListInvalidated);
        Ok(id)
    }

    /// Open a note in the editor. Flushes unsaved edits first; a failed
    /// flush cancels the navigation and the selection is unchanged.
    pub async fn open_note(&mut self, id: &NoteId) -> Result<Note> {
        self.flush_if_dirty().await?;
        let note = self
            .note(id)
            .cloned()
            .ok_or_else(|| Error::NoteNotFound(id.to_string()))?;
        self.session.active_note = Some(note.id.clone());
        self.session.dirty = false;
        self.session.view = View::Editor;
        self.session.editor_tags = note.tags.iter().cloned().collect();
        self.session.tag_signature = content::signature_of(note.tags.iter().map(String::as_str));
        self.draft = None;
        // The caller renders a deep copy; stored strokes are never aliased.
        Ok(note)
    }

    /// Navigate back to the tag or list view, flushing unsaved edits first.
    pub async fn navigate(&mut self, view: View) -> Result<()> {
        self.flush_if_dirty().await?;
        if view == View::Tags {
            self.session.active_tag = None;
        }
        self.session.view = view;
        Ok(())
    }

    /// Enter the list view filtered to a tag.
    pub fn select_tag(&mut self, tag: &str) {
        self.session.active_tag = Some(tag.to_string());
        self.session.list_filter = ListFilter::Latest;
        self.session.view = View::List;
        self.bus.emit(ViewEvent::NoteListInvalidated);
    }

    pub fn set_list_filter(&mut self, filter: ListFilter) {
        self.session.list_filter = filter;
        self.bus.emit(ViewEvent::NoteListInvalidated);
    }

    /// Record the editor's working copy of the active note and mark the
    /// session dirty. No sync happens until an explicit save.
    pub fn update_draft(&mut self, draft: EditorDraft) {
        if self.session.active_note.is_none() {
            return;
        }
        self.draft = Some(draft);
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        if !self.session.dirty {
            self.session.dirty = true;
            self.emit_status(SyncStatus::Pending);
        }
    }

    // ─── Reconciliation ────────────────────────────────────────────────────

    /// Reconcile the active note's tag set with the tag annotations present
    /// in the editor content.
    ///
    /// Every tag found is guaranteed to exist in the library. The note and
    /// the derived views are only touched when the signature actually
    /// changed; an unchanged signature mutates nothing and emits nothing.
    /// Returns whether the views were invalidated.
    pub fn reconcile_editor(&mut self, nodes: &[ContentNode]) -> bool {
        let tags = content::tags_of(nodes);
        for tag in &tags {
            self.library.ensure(tag);
        }
        self.session.editor_tags = tags.clone();
        let signature = content::signature(nodes);
        if self.session.tag_signature == signature {
            return false;
        }
        self.session.tag_signature = signature;
        if let Some(id) = self.session.active_note.clone() {
            if let Some(note) = self.notes.iter_mut().find(|n| n.id == id) {
                note.tags = tags.into_iter().collect();
            }
        }
        self.bus.emit(ViewEvent::TagCloudInvalidated);
        self.bus.emit(ViewEvent::NoteListInvalidated);
        true
    }

    // ─── Save / delete ─────────────────────────────────────────────────────

    /// Save the active note to the remote store.
    ///
    /// A note that has never synced issues a create; the response assigns
    /// the canonical identifier and is authoritative for every field. A
    /// remote-eligible note issues an update addressed by identifier.
    /// Concurrent saves are rejected rather than merged: a second save while
    /// one is in flight returns an error and changes nothing.
    pub async fn save_active(&mut self) -> Result<Note> {
        let owner = self.require_owner()?;
        let active = self
            .session
            .active_note
            .clone()
            .ok_or_else(|| Error::InvalidInput("no active note to save".into()))?;
        if self.save_in_flight {
            return Err(Error::Internal("save already in flight".into()));
        }
        self.save_in_flight = true;
        let result = self.save_inner(&owner, &active).await;
        self.save_in_flight = false;
        if result.is_err() {
            self.emit_status(SyncStatus::Failed);
        }
        result
    }

    async fn save_inner(&mut self, owner: &str, active: &NoteId) -> Result<Note> {
        let idx = self
            .notes
            .iter()
            .position(|n| &n.id == active)
            .ok_or_else(|| Error::NoteNotFound(active.to_string()))?;

        // Merge the editor draft: trimmed title, plain content, the union of
        // annotation tags and literal markers still sitting in text runs,
        // deep-cloned strokes.
        if let Some(draft) = self.draft.take() {
            let plain = content::to_plain(&draft.content);
            let mut tags: BTreeSet<String> = content::tags_of(&content::parse(&plain));
            tags.extend(self.session.editor_tags.iter().cloned());
            let note = &mut self.notes[idx];
            note.title = draft.title.trim().to_string();
            note.content = plain;
            note.tags = tags.into_iter().collect();
            note.strokes = draft.strokes.clone();
            self.draft = Some(draft);
        }
        {
            let note = &mut self.notes[idx];
            note.updated_at = Utc::now();
            note.user_id = Some(owner.to_string());
        }
        for tag in self.notes[idx].tags.clone() {
            self.library.ensure(&tag);
        }

        self.emit_status(SyncStatus::Syncing);
        let payload = self.notes[idx].payload();
        let synced = if self.notes[idx].is_remote() {
            let id = self.notes[idx].id.clone();
            self.api.update(&id, payload).await?
        } else {
            debug!(note_id = %self.notes[idx].id, "first sync, issuing create");
            self.api.create(payload).await?
        };

        self.notes[idx].apply_remote(synced);
        let saved = self.notes[idx].clone();
        self.session.active_note = Some(saved.id.clone());
        self.session.dirty = false;
        self.session.editor_tags = saved.tags.iter().cloned().collect();
        self.session.tag_signature = content::signature_of(saved.tags.iter().map(String::as_str));
        self.draft = None;
        self.persist(owner).await;
        self.emit_status(SyncStatus::Synced);
        self.bus.emit(ViewEvent::TagCloudInvalidated);
        self.bus.emit(ViewEvent::NoteListInvalidated);
        Ok(saved)
    }

    /// Flush-save the open note if it has unsaved edits. Failure propagates
    /// so navigation-style callers can cancel.
    pub async fn flush_if_dirty(&mut self) -> Result<()> {
        if self.session.dirty && self.session.active_note.is_some() {
            self.save_active().await?;
        }
        Ok(())
    }

    /// Delete a note. Remote-eligible notes are deleted remotely first and
    /// removed locally only after the remote call succeeds; local-only notes
    /// are removed without any remote call.
    pub async fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let owner = self.require_owner()?;
        let note = self
            .note(id)
            .ok_or_else(|| Error::NoteNotFound(id.to_string()))?;
        if note.is_remote() {
            self.emit_status(SyncStatus::Syncing);
            if let Err(e) = self.api.delete(id).await {
                self.emit_status(SyncStatus::Failed);
                return Err(e);
            }
        }
        self.notes.retain(|n| &n.id != id);
        if self.session.active_note.as_ref() == Some(id) {
            self.session.active_note = None;
            self.session.dirty = false;
            self.draft = None;
            if self.session.view == View::Editor {
                self.session.view = View::Tags;
            }
        }
        self.persist(&owner).await;
        self.emit_status(SyncStatus::Synced);
        self.bus.emit(ViewEvent::TagCloudInvalidated);
        self.bus.emit(ViewEvent::NoteListInvalidated);
        Ok(())
    }

    // ─── Helpers ───────────────────────────────────────────────────────────

    pub(crate) fn require_owner(&self) -> Result<String> {
        self.owner
            .clone()
            .ok_or_else(|| Error::Unauthorized("sign in to sync".into()))
    }

    pub(crate) fn emit_status(&self, status: SyncStatus) {
        self.bus.emit(ViewEvent::SyncStatus(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::FileSnapshotStore;
    use tagbook_core::content::parse;
    use tagbook_core::AuthUser;
    use tagbook_sync::MockNoteApi;
    use tempfile::TempDir;

    fn session(user: &str) -> Session {
        Session {
            access_token: "token".into(),
            user: AuthUser {
                id: user.into(),
                email: "a@b.c".into(),
            },
        }
    }

    async fn signed_in_store() -> (NoteStore<MockNoteApi, FileSnapshotStore>, MockNoteApi, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let api = MockNoteApi::new().with_owner("user-1");
        let mut store = NoteStore::new(api.clone(), FileSnapshotStore::new(dir.path()));
        store.apply_session(Some(&session("user-1"))).await.unwrap();
        (store, api, dir)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<ViewEvent>) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_load_seeds_sample_note_when_everything_is_empty() {
        let (store, _api, _dir) = signed_in_store().await;
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].title, "Quick Start");
        assert!(!store.notes()[0].is_remote());
        // Sample tags flow into the library.
        assert!(store.library().contains("灵感速记"));
    }

    #[tokio::test]
    async fn test_load_remote_is_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockNoteApi::new().with_owner("user-1");
        let remote = api
            .create(tagbook_core::NotePayload {
                title: "remote".into(),
                content: String::new(),
                tags: vec!["work".into()],
                strokes: vec![],
            })
            .await
            .unwrap();
        let mut store = NoteStore::new(api.clone(), FileSnapshotStore::new(dir.path()));
        store.apply_session(Some(&session("user-1"))).await.unwrap();
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].id, remote.id);
        assert!(store.library().contains("work"));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_snapshot_on_remote_failure() {
        let (mut store, api, _dir) = signed_in_store().await;
        // The seeded sample was persisted; a failing reload must restore it.
        api.fail_next();
        store.load().await.unwrap();
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].title, "Quick Start");
    }

    #[tokio::test]
    async fn test_create_note_requires_owner() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::new(MockNoteApi::new(), FileSnapshotStore::new(dir.path()));
        assert!(matches!(
            store.create_note().await,
            Err(Error::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_create_note_inherits_active_tag() {
        let (mut store, _api, _dir) = signed_in_store().await;
        store.select_tag("work");
        let id = store.create_note().await.unwrap();
        let note = store.note(&id).unwrap();
        assert_eq!(note.tags, vec!["work".to_string()]);
        assert!(!note.is_remote());
        assert!(store.session().dirty);
        assert_eq!(store.session().view, View::Editor);
    }

    #[tokio::test]
    async fn test_save_promotes_placeholder_to_canonical() {
        let (mut store, _api, _dir) = signed_in_store().await;
        let id = store.create_note().await.unwrap();
        assert!(!id.is_canonical());
        store.update_draft(EditorDraft {
            title: "  first note  ".into(),
            content: parse("hello #work "),
            strokes: vec![],
        });
        let saved = store.save_active().await.unwrap();
        assert!(saved.is_remote());
        assert_eq!(saved.title, "first note");
        assert_eq!(saved.tags, vec!["work".to_string()]);
        assert_eq!(store.session().active_note, Some(saved.id.clone()));
        assert!(!store.session().dirty);
    }

    #[tokio::test]
    async fn test_saved_note_round_trips_through_remote_reload() {
        let (mut store, _api, _dir) = signed_in_store().await;
        let id = store.create_note().await.unwrap();
        store.update_draft(EditorDraft {
            title: "round trip".into(),
            content: parse("body #work"),
            strokes: vec![Stroke {
                size: 2.0,
                points: vec![tagbook_core::StrokePoint { x: 1.0, y: 2.0 }],
            }],
        });
        let saved = store.save_active().await.unwrap();
        assert_ne!(saved.id, id);

        // Reload from remote: canonical id, identical syncable fields.
        store.navigate(View::Tags).await.unwrap();
        store.load().await.unwrap();
        let reloaded = store.note(&saved.id).unwrap();
        assert_eq!(reloaded.title, "round trip");
        assert_eq!(reloaded.content, "body #work");
        assert_eq!(reloaded.tags, vec!["work".to_string()]);
        assert_eq!(reloaded.strokes, saved.strokes);
    }

    #[tokio::test]
    async fn test_second_save_issues_update_not_create() {
        let (mut store, api, _dir) = signed_in_store().await;
        store.create_note().await.unwrap();
        store.update_draft(EditorDraft {
            title: "v1".into(),
            ..Default::default()
        });
        store.save_active().await.unwrap();
        store.update_draft(EditorDraft {
            title: "v2".into(),
            ..Default::default()
        });
        store.save_active().await.unwrap();
        assert_eq!(api.calls_of("create"), 1);
        assert_eq!(api.calls_of("update"), 1);
    }

    #[tokio::test]
    async fn test_non_canonical_id_saves_as_create_then_updates() {
        // Scenario from the sync contract: a note with a legacy local id is
        // created remotely, receives a canonical id, and is thereafter
        // updated by id.
        let (mut store, api, _dir) = signed_in_store().await;
        let mut note = Note::new_local(Some("user-1".into()), vec![]);
        note.id = NoteId::new("note-abc123-xyz");
        let id = note.id.clone();
        store.notes.insert(0, note);
        store.session.active_note = Some(id);
        store.session.dirty = true;
        let saved = store.save_active().await.unwrap();
        assert!(saved.id.is_canonical());
        assert_eq!(api.calls_of("create"), 1);

        store.session.dirty = true;
        store.save_active().await.unwrap();
        assert_eq!(api.calls_of("update"), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_note_retryable() {
        let (mut store, api, _dir) = signed_in_store().await;
        store.create_note().await.unwrap();
        store.update_draft(EditorDraft {
            title: "draft".into(),
            ..Default::default()
        });
        api.fail_next();
        assert!(store.save_active().await.is_err());
        assert!(store.session().dirty);
        // The in-flight guard is released; a retry succeeds.
        let saved = store.save_active().await.unwrap();
        assert_eq!(saved.title, "draft");
    }

    #[tokio::test]
    async fn test_reconcile_replaces_tags_and_feeds_library() {
        let (mut store, _api, _dir) = signed_in_store().await;
        let id = store.create_note().await.unwrap();
        let changed = store.reconcile_editor(&parse("hello #work #life "));
        assert!(changed);
        let note = store.note(&id).unwrap();
        assert_eq!(note.tags, vec!["life".to_string(), "work".to_string()]);
        assert!(store.library().contains("work"));
        assert!(store.library().contains("life"));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent_and_silent_when_unchanged() {
        let (mut store, _api, _dir) = signed_in_store().await;
        store.create_note().await.unwrap();
        let nodes = parse("hello #work ");
        assert!(store.reconcile_editor(&nodes));
        let mut rx = store.events().subscribe();
        assert!(!store.reconcile_editor(&nodes));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_typing_scenario_hello_work() {
        // Typing `hello #work ` converts the marker and leaves the tag set
        // as exactly ["work"].
        let (mut store, _api, _dir) = signed_in_store().await;
        let id = store.create_note().await.unwrap();
        let trigger = content::convert_trigger("hello #work ").unwrap();
        let nodes = content::apply_trigger("hello #work", &trigger);
        store.reconcile_editor(&nodes);
        assert_eq!(store.note(&id).unwrap().tags, vec!["work".to_string()]);
    }

    #[tokio::test]
    async fn test_open_note_is_cancelled_when_flush_fails() {
        let (mut store, api, _dir) = signed_in_store().await;
        let sample_id = store.notes()[0].id.clone();
        let id = store.create_note().await.unwrap();
        store.update_draft(EditorDraft {
            title: "pending".into(),
            ..Default::default()
        });
        api.fail_next();
        assert!(store.open_note(&sample_id).await.is_err());
        // Selection unchanged, edits still pending.
        assert_eq!(store.session().active_note, Some(id));
        assert!(store.session().dirty);
    }

    #[tokio::test]
    async fn test_delete_remote_note_requires_remote_success() {
        let (mut store, api, _dir) = signed_in_store().await;
        store.create_note().await.unwrap();
        store.update_draft(EditorDraft::default());
        let saved = store.save_active().await.unwrap();
        api.fail_next();
        assert!(store.delete_note(&saved.id).await.is_err());
        // Remote delete failed: the note stays locally.
        assert!(store.note(&saved.id).is_some());
        store.delete_note(&saved.id).await.unwrap();
        assert!(store.note(&saved.id).is_none());
    }

    #[tokio::test]
    async fn test_delete_local_note_makes_no_remote_call() {
        let (mut store, api, _dir) = signed_in_store().await;
        let id = store.notes()[0].id.clone();
        assert!(!id.is_canonical());
        store.delete_note(&id).await.unwrap();
        assert_eq!(api.calls_of("delete"), 0);
        assert!(store.notes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_active_note_returns_to_tag_view() {
        let (mut store, _api, _dir) = signed_in_store().await;
        let id = store.notes()[0].id.clone();
        store.open_note(&id).await.unwrap();
        store.delete_note(&id).await.unwrap();
        assert!(store.session().active_note.is_none());
        assert_eq!(store.session().view, View::Tags);
    }

    #[tokio::test]
    async fn test_logout_clears_state_and_reseeds_defaults() {
        let (mut store, _api, _dir) = signed_in_store().await;
        store.reconcile_editor(&parse("#custom "));
        store.logout().await.unwrap();
        assert!(store.notes().is_empty());
        assert!(store.owner().is_none());
        assert!(!store.library().contains("custom"));
        assert!(store.library().contains("灵感速记"));
    }

    #[tokio::test]
    async fn test_owner_change_does_not_leak_notes() {
        let (mut store, _api, _dir) = signed_in_store().await;
        let first_owner_note = store.notes()[0].id.clone();
        store.apply_session(Some(&session("user-2"))).await.unwrap();
        // user-2 gets their own seeded sample, not user-1's state.
        assert_eq!(store.owner(), Some("user-2"));
        assert!(store.note(&first_owner_note).is_none() || store.notes().len() == 1);
        assert_eq!(store.notes().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_session_none_signs_out() {
        let (mut store, _api, _dir) = signed_in_store().await;
        let mut rx = store.events().subscribe();
        store.apply_session(None).await.unwrap();
        assert!(store.owner().is_none());
        assert!(store.notes().is_empty());
        assert!(drain(&mut rx)
            .contains(&ViewEvent::SyncStatus(SyncStatus::SignedOut)));
    }
}
