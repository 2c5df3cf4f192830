//! Note identifier utilities.
//!
//! Two identifier forms exist:
//!
//! - **Canonical**: a server-assigned hyphenated UUID (8-4-4-4-12 hex groups,
//!   version nibble 1-5, RFC 4122 variant). A note carrying one has been
//!   persisted remotely and sync addresses it by id.
//! - **Placeholder**: a locally generated `note-<millis36>-<rand>` token for
//!   notes that have never completed a first sync. Never matches the
//!   canonical format.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static CANONICAL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("canonical id pattern is valid")
});

/// A note identifier, either canonical (remote) or a local placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh canonical identifier (server side / mocks).
    pub fn canonical() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Generate a local placeholder identifier.
    ///
    /// Format: `note-<millis base36>-<8 random lowercase alphanumerics>`.
    /// Guaranteed to never match the canonical format.
    pub fn placeholder() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        Self(format!("note-{}-{}", to_base36(millis), suffix))
    }

    /// True iff this identifier matches the canonical server-assigned format.
    ///
    /// The check is structural: 8-4-4-4-12 hex groups, version nibble in 1-5,
    /// variant nibble in 8/9/a/b. Case-insensitive.
    pub fn is_canonical(&self) -> bool {
        CANONICAL_ID.is_match(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}
