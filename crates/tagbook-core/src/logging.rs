//! Structured logging field name constants for tagbook.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log tooling can query by standardized names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and was surfaced to the caller |
//! | WARN  | Recoverable issue, automatic fallback applied (snapshot fallback, storage write failure) |
//! | INFO  | Lifecycle events (session transitions, load completions) |
//! | DEBUG | Decision points (create vs update branch, signature skip) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "store", "sync", "snapshot", "auth"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "save_note", "bulk_rename", "load", "flush"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note identifier being operated on.
pub const NOTE_ID: &str = "note_id";

/// Tag name being operated on.
pub const TAG: &str = "tag";

/// Owner identity scoping the operation.
pub const OWNER_ID: &str = "owner_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes returned or touched by an operation.
pub const RESULT_COUNT: &str = "result_count";
