//! Core traits for tagbook abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability: the store is
//! generic over them, the sync crate provides HTTP and mock
//! implementations.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::id::NoteId;
use crate::models::{Note, NotePayload, Session, StoredState};

// =============================================================================
// REMOTE NOTE API
// =============================================================================

/// Client for the owner-scoped remote note store.
///
/// Every call attaches the bearer credential and is bounded by
/// [`crate::defaults::API_TIMEOUT_SECS`]; exceeding it is a definitive
/// failure, never retried automatically.
#[async_trait]
pub trait NoteApi: Send + Sync {
    /// List all notes for the authenticated owner, newest-updated-first.
    async fn list(&self) -> Result<Vec<Note>>;

    /// Fetch a single note by identifier.
    async fn get(&self, id: &NoteId) -> Result<Note>;

    /// List the owner's notes carrying a tag, newest-updated-first.
    async fn get_by_tag(&self, tag: &str) -> Result<Vec<Note>>;

    /// Create a note. The response assigns the canonical identifier and
    /// canonical timestamps and is authoritative for all syncable fields.
    async fn create(&self, payload: NotePayload) -> Result<Note>;

    /// Update a note addressed by canonical identifier. The response is
    /// authoritative for all syncable fields.
    async fn update(&self, id: &NoteId, payload: NotePayload) -> Result<Note>;

    /// Delete a note addressed by canonical identifier.
    async fn delete(&self, id: &NoteId) -> Result<()>;
}

// =============================================================================
// AUTH PROVIDER
// =============================================================================

/// Managed authentication provider.
///
/// The store reacts to every session transition (including the initial one)
/// by reloading or clearing its state; transitions are published on the
/// watch channel returned by [`AuthProvider::subscribe`].
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session, if one exists.
    async fn session(&self) -> Result<Option<Session>>;

    /// Sign in with credentials. Empty email or password is rejected before
    /// any network call.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Create an account. Validation (non-empty fields, minimum password
    /// length) happens before any network call.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to session transitions. The receiver always holds the
    /// latest session state.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

// =============================================================================
// LOCAL SNAPSHOT
// =============================================================================

/// Persisted per-owner snapshot of the note store and tag library.
///
/// Write failures are surfaced but non-fatal: callers log and continue,
/// in-memory state is never blocked on storage.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot for an owner. Absent, unreadable, or
    /// version-incompatible snapshots all yield `Ok(None)`.
    async fn load(&self, owner: &str) -> Result<Option<StoredState>>;

    /// Persist the snapshot for an owner.
    async fn save(&self, owner: &str, state: &StoredState) -> Result<()>;

    /// Remove the snapshot for an owner.
    async fn clear(&self, owner: &str) -> Result<()>;
}
