//! Tag library: the canonical set of known tag names.
//!
//! The library exists independently of which notes currently reference a
//! tag, so the tag cloud can show tags with zero notes and newly typed tags
//! are recognized immediately. Entries are only ever removed by an explicit
//! tag deletion.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;

use tagbook_core::defaults::DEFAULT_TAGS;
use tagbook_core::{Note, TagEntry};

// Collator for display ordering. Mixed-script tag names (Han, Latin, kana)
// must sort by collation order, not byte order. `Collator` is not `Sync`,
// so each thread builds its own.
thread_local! {
    static COLLATOR: Collator = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        Collator::try_new(&locale!("zh").into(), options)
            .expect("collation data for zh is compiled in")
    };
}

/// Compare two tag names in display order.
pub fn display_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    COLLATOR.with(|collator| collator.compare(a, b))
}

/// Mapping of tag name to metadata, plus the defaults-seeded guard.
#[derive(Debug, Default)]
pub struct TagLibrary {
    entries: HashMap<String, TagEntry>,
    defaults_seeded: bool,
}

impl TagLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert: record the tag with `created_at = now` if absent.
    pub fn ensure(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        if !self.entries.contains_key(name) {
            self.entries.insert(name.to_string(), TagEntry::new(name));
        }
    }

    /// Seed the fixed default tag names exactly once per session.
    ///
    /// Guarded by the seeded flag: re-running after the flag is set is a
    /// no-op, even when the flag was reset by a logout and set again.
    pub fn seed_defaults(&mut self) {
        if self.defaults_seeded {
            return;
        }
        for tag in DEFAULT_TAGS {
            self.ensure(tag);
        }
        self.defaults_seeded = true;
    }

    pub fn defaults_seeded(&self) -> bool {
        self.defaults_seeded
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove an entry (explicit tag deletion only).
    pub fn remove(&mut self, name: &str) -> Option<TagEntry> {
        self.entries.remove(name)
    }

    /// Rename an entry, preserving the earliest known creation time when the
    /// target name already exists.
    pub fn rename(&mut self, old: &str, new: &str) {
        let original = self.entries.remove(old);
        let existing = self.entries.get(new).map(|e| e.created_at);
        let created_at = match (existing, original.as_ref().map(|e| e.created_at)) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => Utc::now(),
        };
        self.entries.insert(
            new.to_string(),
            TagEntry {
                name: new.to_string(),
                created_at,
            },
        );
    }

    /// All entries, for snapshot persistence.
    pub fn entries(&self) -> Vec<TagEntry> {
        self.entries.values().cloned().collect()
    }

    /// Replace the library from a persisted snapshot. A loaded snapshot
    /// already contains the defaults, so the seeded flag is set.
    pub fn restore(&mut self, entries: Vec<TagEntry>) {
        self.entries = entries.into_iter().map(|e| (e.name.clone(), e)).collect();
        self.defaults_seeded = true;
    }

    /// Clear everything, including the seeded flag (logout).
    pub fn reset(&mut self) {
        self.entries.clear();
        self.defaults_seeded = false;
    }

    /// The union of default tags, library entries, and tags attached to any
    /// note, deduplicated and sorted in display order.
    ///
    /// Dedup happens in the set, before the sort: secondary-strength
    /// collation compares case variants as equal, so adjacent-dedup after
    /// sorting could leave an exact duplicate separated by a case variant.
    pub fn display_tags(&self, notes: &[Note]) -> Vec<String> {
        let set: BTreeSet<String> = DEFAULT_TAGS
            .iter()
            .map(|t| t.to_string())
            .chain(self.entries.keys().cloned())
            .chain(notes.iter().flat_map(|n| n.tags.iter().cloned()))
            .collect();
        let mut tags: Vec<String> = set.into_iter().collect();
        tags.sort_by(|a, b| display_cmp(a, b));
        tags
    }
}
