//! View invalidation events and event bus.
//!
//! The store never renders anything; it emits [`ViewEvent`]s on a broadcast
//! channel and view renderers subscribe independently. No event is emitted
//! when a reconciliation pass leaves the tag signature unchanged, which is
//! what keeps per-keystroke edits from thrashing the tag cloud and note
//! list.

use serde::Serialize;
use tokio::sync::broadcast;

/// Sync indicator state surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// All local mutations are reflected remotely.
    Synced,
    /// A remote call is in flight.
    Syncing,
    /// The open note has unsaved edits.
    Pending,
    /// A remote call failed or timed out; prior data is intact.
    Failed,
    /// No session; remote operations are unavailable.
    SignedOut,
}

/// An invalidation notice for one of the derived views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ViewEvent {
    /// Tag cloud must re-derive from the library and note tag sets.
    TagCloudInvalidated,
    /// Note list must re-derive from the store and selection state.
    NoteListInvalidated,
    /// The open editor's note changed underneath it (bulk tag operation).
    EditorRefresh,
    /// Sync indicator transition.
    SyncStatus(SyncStatus),
}

/// Broadcast bus for view events.
///
/// Receivers that lag are skipped, never blocked; a renderer that misses an
/// invalidation simply re-renders on the next one.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ViewEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to view events.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.sender.subscribe()
    }

    /// Emit an event. Delivery failure (no subscribers) is not an error.
    pub fn emit(&self, event: ViewEvent) {
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
