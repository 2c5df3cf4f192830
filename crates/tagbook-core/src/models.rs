//! Core data models for tagbook.
//!
//! These types are shared across all tagbook crates and represent the
//! records exchanged with the remote note API (camelCase on the wire,
//! RFC 3339 timestamps) as well as the locally persisted snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::id::NoteId;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A single point of a handwritten stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
}

/// One handwritten stroke: pen width plus an ordered list of points.
///
/// Opaque to the state manager. `Clone` is a deep copy, which is exactly the
/// contract the editor relies on: a rendered stroke list never aliases the
/// stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub size: f64,
    pub points: Vec<StrokePoint>,
}

/// A user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Note {
    /// Create an empty local-only note owned by `user_id`, optionally
    /// inheriting tags from the current context (e.g. the active tag filter).
    pub fn new_local(user_id: Option<String>, inherited_tags: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::placeholder(),
            title: String::new(),
            content: String::new(),
            tags: inherited_tags,
            strokes: Vec::new(),
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// The sample note seeded when neither the remote store nor a local
    /// snapshot has any data for this owner.
    pub fn sample(user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::placeholder(),
            title: defaults::SAMPLE_NOTE_TITLE.to_string(),
            content: defaults::SAMPLE_NOTE_CONTENT.to_string(),
            tags: defaults::SAMPLE_NOTE_TAGS.iter().map(|t| t.to_string()).collect(),
            strokes: Vec::new(),
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// True iff this note has been persisted remotely, derived from the
    /// identifier form. Determines whether a save issues a create or an
    /// update.
    pub fn is_remote(&self) -> bool {
        self.id.is_canonical()
    }

    /// The mutable subset sent on create/update.
    pub fn payload(&self) -> NotePayload {
        NotePayload {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            strokes: self.strokes.clone(),
        }
    }

    /// Replace every syncable field with the canonical record the remote
    /// store returned. The response is authoritative, identifier included.
    pub fn apply_remote(&mut self, remote: Note) {
        *self = remote;
    }
}

/// The mutable subset of a note sent on create/update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub strokes: Vec<Stroke>,
}

// =============================================================================
// TAG LIBRARY
// =============================================================================

/// A tag library entry: the name plus when it was first seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEntry {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TagEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// LOCAL SNAPSHOT
// =============================================================================

/// The versioned document persisted locally per owner.
///
/// An incompatible or missing version is treated as "no snapshot".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    pub version: u32,
    pub notes: Vec<Note>,
    pub tags: Vec<TagEntry>,
}

impl StoredState {
    pub fn new(notes: Vec<Note>, tags: Vec<TagEntry>) -> Self {
        Self {
            version: defaults::STORAGE_VERSION,
            notes,
            tags,
        }
    }

    /// True iff this snapshot can be loaded by the current code.
    pub fn is_compatible(&self) -> bool {
        self.version == defaults::STORAGE_VERSION
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// The authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// An active session: bearer credential plus the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}
