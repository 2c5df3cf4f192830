//! Session/selection state and pure view projections.
//!
//! Nothing here mutates the note store; the list dataset, tag stats, and
//! previews are derived on demand so renderers stay stateless consumers.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use tagbook_core::content;
use tagbook_core::defaults::PREVIEW_LEN;
use tagbook_core::{Note, NoteId};

/// Which of the three views is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Tags,
    List,
    Editor,
}

/// Sort/filter mode for the note list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    /// Newest updated first.
    #[default]
    Latest,
    /// Oldest updated first.
    Oldest,
    /// Newest updated first, restricted to notes with handwriting.
    Handwrite,
}

/// Per-session selection state.
#[derive(Debug, Default)]
pub struct SessionState {
    pub view: View,
    pub active_tag: Option<String>,
    pub active_note: Option<NoteId>,
    /// True iff the open note has unsaved edits.
    pub dirty: bool,
    pub list_filter: ListFilter,
    /// Tag annotations currently present in the editor.
    pub editor_tags: BTreeSet<String>,
    /// Signature recorded by the last reconciliation pass.
    pub tag_signature: String,
}

impl SessionState {
    /// Reset to the signed-out baseline.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The note list dataset: active-tag filter applied, sorted per the list
    /// filter. Notes are cloned so renderers never alias store state.
    pub fn list_dataset(&self, notes: &[Note]) -> Vec<Note> {
        let mut dataset: Vec<Note> = notes
            .iter()
            .filter(|note| match &self.active_tag {
                Some(tag) => note.tags.iter().any(|t| t == tag),
                None => true,
            })
            .filter(|note| match self.list_filter {
                ListFilter::Handwrite => !note.strokes.is_empty(),
                _ => true,
            })
            .cloned()
            .collect();
        match self.list_filter {
            ListFilter::Oldest => dataset.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
            _ => dataset.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        }
        dataset
    }
}

/// Per-tag usage statistics for the tag cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagStat {
    pub count: usize,
    pub latest: Option<DateTime<Utc>>,
}

/// Count and latest-update per tag across all notes.
pub fn tag_stats(notes: &[Note]) -> HashMap<String, TagStat> {
    let mut stats: HashMap<String, TagStat> = HashMap::new();
    for note in notes {
        for tag in &note.tags {
            let entry = stats.entry(tag.clone()).or_default();
            entry.count += 1;
            entry.latest = Some(match entry.latest {
                Some(latest) => latest.max(note.updated_at),
                None => note.updated_at,
            });
        }
    }
    stats
}

/// Plain-text preview of a note, truncated to the preview length.
pub fn preview(note: &Note) -> String {
    let plain = content::to_plain(&content::parse(&note.content));
    let mut chars = plain.chars();
    let head: String = chars.by_ref().take(PREVIEW_LEN).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn note_with(tags: &[&str], updated_offset_mins: i64, strokes: usize) -> Note {
        let mut note = Note::new_local(None, tags.iter().map(|t| t.to_string()).collect());
        note.updated_at = Utc::now() + Duration::minutes(updated_offset_mins);
        for _ in 0..strokes {
            note.strokes.push(tagbook_core::Stroke {
                size: 3.0,
                points: vec![],
            });
        }
        note
    }

    #[test]
    fn test_list_dataset_filters_by_active_tag() {
        let notes = vec![note_with(&["work"], 0, 0), note_with(&["life"], 1, 0)];
        let session = SessionState {
            active_tag: Some("work".into()),
            ..Default::default()
        };
        let dataset = session.list_dataset(&notes);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset[0].tags, vec!["work".to_string()]);
    }

    #[test]
    fn test_list_dataset_latest_orders_newest_first() {
        let notes = vec![note_with(&[], 0, 0), note_with(&[], 5, 0)];
        let session = SessionState::default();
        let dataset = session.list_dataset(&notes);
        assert!(dataset[0].updated_at > dataset[1].updated_at);
    }

    #[test]
    fn test_list_dataset_oldest_orders_oldest_first() {
        let notes = vec![note_with(&[], 5, 0), note_with(&[], 0, 0)];
        let session = SessionState {
            list_filter: ListFilter::Oldest,
            ..Default::default()
        };
        let dataset = session.list_dataset(&notes);
        assert!(dataset[0].updated_at < dataset[1].updated_at);
    }

    #[test]
    fn test_list_dataset_handwrite_keeps_only_stroked_notes() {
        let notes = vec![note_with(&[], 0, 0), note_with(&[], 1, 2)];
        let session = SessionState {
            list_filter: ListFilter::Handwrite,
            ..Default::default()
        };
        let dataset = session.list_dataset(&notes);
        assert_eq!(dataset.len(), 1);
        assert!(!dataset[0].strokes.is_empty());
    }

    #[test]
    fn test_tag_stats_counts_and_latest() {
        let notes = vec![
            note_with(&["work"], 0, 0),
            note_with(&["work", "life"], 10, 0),
        ];
        let stats = tag_stats(&notes);
        assert_eq!(stats["work"].count, 2);
        assert_eq!(stats["life"].count, 1);
        assert_eq!(stats["work"].latest, Some(notes[1].updated_at));
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let mut note = Note::new_local(None, vec![]);
        note.content = "x".repeat(200);
        let preview = preview(&note);
        assert_eq!(preview.chars().count(), PREVIEW_LEN + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn test_preview_keeps_short_content_verbatim() {
        let mut note = Note::new_local(None, vec![]);
        note.content = "short note #work".into();
        assert_eq!(preview(&note), "short note #work");
    }

    #[test]
    fn test_session_reset_clears_selection() {
        let mut session = SessionState {
            view: View::Editor,
            active_tag: Some("work".into()),
            dirty: true,
            ..Default::default()
        };
        session.reset();
        assert_eq!(session.view, View::Tags);
        assert!(session.active_tag.is_none());
        assert!(!session.dirty);
    }
}
