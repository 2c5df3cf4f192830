//! Mock adapters for deterministic testing.
//!
//! [`MockNoteApi`] keeps an in-memory note table, records every call, and
//! supports scripted failure injection so store tests can exercise the
//! rollback paths without a server. [`MockAuthProvider`] holds a fixed user
//! and replays session transitions on its watch channel.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use tagbook_core::{
    AuthProvider, AuthUser, Error, Note, NoteApi, NoteId, NotePayload, Result, Session,
};

/// One recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: String,
    pub note_id: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    notes: Vec<Note>,
    call_log: Vec<MockCall>,
    calls_seen: usize,
    fail_after: Option<usize>,
    fail_next: bool,
    owner: Option<String>,
}

/// Mock remote note store.
#[derive(Clone, Default)]
pub struct MockNoteApi {
    state: Arc<Mutex<MockState>>,
}

impl MockNoteApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the remote table with an existing note.
    pub fn with_note(self, note: Note) -> Self {
        self.state.lock().expect("mock lock poisoned").notes.push(note);
        self
    }

    /// Owner id stamped onto created notes.
    pub fn with_owner(self, owner: impl Into<String>) -> Self {
        self.state.lock().expect("mock lock poisoned").owner = Some(owner.into());
        self
    }

    /// Fail the next call only.
    pub fn fail_next(&self) {
        self.state.lock().expect("mock lock poisoned").fail_next = true;
    }

    /// Let the first `n` calls succeed, then fail every subsequent one.
    pub fn fail_after(&self, n: usize) {
        let mut state = self.state.lock().expect("mock lock poisoned");
        state.fail_after = Some(state.calls_seen + n);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        let mut state = self.state.lock().expect("mock lock poisoned");
        state.fail_after = None;
        state.fail_next = false;
    }

    /// Every call recorded so far.
    pub fn call_log(&self) -> Vec<MockCall> {
        self.state.lock().expect("mock lock poisoned").call_log.clone()
    }

    /// Number of calls of one operation.
    pub fn calls_of(&self, operation: &str) -> usize {
        self.call_log()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Current remote table contents.
    pub fn notes(&self) -> Vec<Note> {
        self.state.lock().expect("mock lock poisoned").notes.clone()
    }

    fn record(&self, operation: &str, note_id: Option<&NoteId>) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock poisoned");
        state.calls_seen += 1;
        state.call_log.push(MockCall {
            operation: operation.to_string(),
            note_id: note_id.map(|id| id.to_string()),
        });
        if state.fail_next {
            state.fail_next = false;
            return Err(Error::Request("injected failure".into()));
        }
        if let Some(limit) = state.fail_after {
            if state.calls_seen > limit {
                return Err(Error::Request("injected failure".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NoteApi for MockNoteApi {
    async fn list(&self) -> Result<Vec<Note>> {
        self.record("list", None)?;
        let mut notes = self.notes();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn get(&self, id: &NoteId) -> Result<Note> {
        self.record("get", Some(id))?;
        self.notes()
            .into_iter()
            .find(|n| &n.id == id)
            .ok_or_else(|| Error::NotFound(format!("Note not found: {}", id)))
    }

    async fn get_by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        self.record("get_by_tag", None)?;
        let mut notes: Vec<Note> = self
            .notes()
            .into_iter()
            .filter(|n| n.tags.iter().any(|t| t == tag))
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn create(&self, payload: NotePayload) -> Result<Note> {
        self.record("create", None)?;
        let now = Utc::now();
        let mut state = self.state.lock().expect("mock lock poisoned");
        let note = Note {
            id: NoteId::canonical(),
            title: payload.title,
            content: payload.content,
            tags: payload.tags,
            strokes: payload.strokes,
            created_at: now,
            updated_at: now,
            user_id: state.owner.clone(),
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: &NoteId, payload: NotePayload) -> Result<Note> {
        self.record("update", Some(id))?;
        let mut state = self.state.lock().expect("mock lock poisoned");
        let note = state
            .notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| Error::NotFound(format!("Note not found: {}", id)))?;
        note.title = payload.title;
        note.content = payload.content;
        note.tags = payload.tags;
        note.strokes = payload.strokes;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete(&self, id: &NoteId) -> Result<()> {
        self.record("delete", Some(id))?;
        let mut state = self.state.lock().expect("mock lock poisoned");
        let before = state.notes.len();
        state.notes.retain(|n| &n.id != id);
        if state.notes.len() == before {
            return Err(Error::NotFound(format!("Note not found: {}", id)));
        }
        Ok(())
    }
}

/// Mock auth provider with a fixed user.
pub struct MockAuthProvider {
    user: AuthUser,
    sender: watch::Sender<Option<Session>>,
}

impl MockAuthProvider {
    pub fn new(user_id: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            user: AuthUser {
                id: user_id.into(),
                email: "mock@example.com".to_string(),
            },
            sender,
        }
    }

    fn session_for(&self) -> Session {
        Session {
            access_token: format!("mock-token-{}", self.user.id),
            user: self.user.clone(),
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn session(&self) -> Result<Option<Session>> {
        Ok(self.sender.borrow().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(Error::InvalidInput("email and password are required".into()));
        }
        let session = self.session_for();
        self.sender.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        self.sign_in(email, password).await.map(Some)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sender.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}
