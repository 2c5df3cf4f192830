//! Centralized default constants for tagbook.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// REMOTE API
// =============================================================================

/// Bounded timeout for any remote call (seconds). A call exceeding it is a
/// definitive failure, never retried automatically.
pub const API_TIMEOUT_SECS: u64 = 10;

/// Default remote API base URL.
pub const API_BASE_URL: &str = "http://localhost:8787/api";

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Minimum password length accepted at sign-up, validated before any
/// network call.
pub const PASSWORD_MIN_LEN: usize = 6;

// =============================================================================
// LOCAL SNAPSHOT
// =============================================================================

/// Version stamp of the persisted snapshot document. A snapshot with any
/// other version is treated as absent.
pub const STORAGE_VERSION: u32 = 1;

// =============================================================================
// TAG LIBRARY
// =============================================================================

/// Tag names seeded once per session into the tag library.
pub const DEFAULT_TAGS: [&str; 7] = [
    "灵感速记",
    "学习计划",
    "阅读摘录",
    "会议纪要",
    "手写草稿",
    "待办事项",
    "思路整理",
];

// =============================================================================
// SAMPLE NOTE
// =============================================================================

/// Title of the note seeded when neither the remote store nor a local
/// snapshot has any data.
pub const SAMPLE_NOTE_TITLE: &str = "Quick Start";

/// Body of the seeded sample note. Carries inline tag markers so the
/// reconciler has something to find on first open.
pub const SAMPLE_NOTE_CONTENT: &str = "Sample notes help you explore the tag-first workflow.\n\n\
Highlights:\n\
1. Keep tags consistent across every view.\n\
2. Switch seamlessly between handwriting and keyboard input.\n\
3. Use #hashtags while typing to create tags automatically.";

/// Tags attached to the seeded sample note.
pub const SAMPLE_NOTE_TAGS: [&str; 2] = ["灵感速记", "手写草稿"];

// =============================================================================
// LIST VIEW
// =============================================================================

/// Maximum characters of plain text shown in a note preview.
pub const PREVIEW_LEN: usize = 160;
