//! # tagbook-store
//!
//! The client-side note store: in-memory notes and tag library, selection
//! state, editor reconciliation, bulk tag operations, and the per-owner
//! local snapshot used as fallback when the remote store is unreachable.
//!
//! [`NoteStore`] is generic over the `NoteApi` and `SnapshotStore` seams
//! from `tagbook-core`, so the same store runs against the HTTP adapters in
//! `tagbook-sync` or against mocks in tests.

pub mod bulk;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod tag_library;

// Re-export commonly used types at crate root
pub use session::{preview, tag_stats, ListFilter, SessionState, TagStat, View};
pub use snapshot::FileSnapshotStore;
pub use store::{EditorDraft, NoteStore};
pub use tag_library::{display_cmp, TagLibrary};
