//! # tagbook-core
//!
//! Core types, traits, and abstractions for the tagbook library.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other tagbook crates depend on: the note and tag models, the
//! rendering-independent content model, the error taxonomy, and the seams
//! (`NoteApi`, `AuthProvider`, `SnapshotStore`) implemented by
//! `tagbook-sync` and `tagbook-store`.

pub mod content;
pub mod defaults;
pub mod error;
pub mod events;
pub mod id;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use content::{ContentNode, TagTrigger};
pub use error::{Error, Result};
pub use events::{EventBus, SyncStatus, ViewEvent};
pub use id::NoteId;
pub use models::{AuthUser, Note, NotePayload, Session, StoredState, Stroke, StrokePoint, TagEntry};
pub use traits::{AuthProvider, NoteApi, SnapshotStore};
