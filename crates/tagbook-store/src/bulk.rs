//! Bulk tag operations: rename or delete a tag across every note.
//!
//! Both operations are transactional from the user's point of view. The
//! sequence is: flush unsaved edits, snapshot the tag list and timestamp of
//! every affected note, apply the change note by note (remote-eligible notes
//! sync each update, local-only notes change in place), and on any remote
//! failure roll every affected note back to its snapshot. Remote notes that
//! already synced before the failure keep their new remote value; the local
//! rollback guarantees the next load reconverges.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use tagbook_core::content::signature_of;
use tagbook_core::{NoteApi, Result, SnapshotStore, SyncStatus, ViewEvent};

use crate::session::View;
use crate::store::NoteStore;

/// Normalize user input for a tag name: strip a leading `#`, trim
/// surrounding whitespace. No case folding, tags match verbatim.
fn normalize_tag_input(input: &str) -> String {
    input.strip_prefix('#').unwrap_or(input).trim().to_string()
}

/// Rename applied to one note's tag list, order-preserving dedup. A note
/// already carrying the new name ends up with a single occurrence.
fn renamed(tags: &[String], from: &str, to: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| if t == from { to.to_string() } else { t.clone() })
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn removed(tags: &[String], tag: &str) -> Vec<String> {
    tags.iter().filter(|t| t.as_str() != tag).cloned().collect()
}

impl<A: NoteApi, S: SnapshotStore> NoteStore<A, S> {
    /// Rename a tag everywhere it appears: every note's tag list, the
    /// library entry, and the active tag filter. Empty input or an unchanged
    /// name is a no-op.
    pub async fn rename_tag(&mut self, tag: &str, input: &str) -> Result<()> {
        let owner = self.require_owner()?;
        let next = normalize_tag_input(input);
        if next.is_empty() || next == tag {
            return Ok(());
        }
        self.flush_if_dirty().await?;
        info!(tag, next = %next, "renaming tag across notes");
        let active_affected = self
            .sync_tag_change(tag, |tags| renamed(tags, tag, &next))
            .await?;
        self.library.rename(tag, &next);
        if self.session.active_tag.as_deref() == Some(tag) {
            self.session.active_tag = Some(next.clone());
        }
        self.finish_bulk(&owner, active_affected).await;
        Ok(())
    }

    /// Delete a tag everywhere: every note's tag list and the library entry.
    /// Notes themselves survive with the tag removed. If the deleted tag was
    /// the active filter, the selection clears and the view returns to tags.
    pub async fn delete_tag(&mut self, tag: &str) -> Result<()> {
        let owner = self.require_owner()?;
        self.flush_if_dirty().await?;
        info!(tag, "deleting tag across notes");
        let active_affected = self.sync_tag_change(tag, |tags| removed(tags, tag)).await?;
        self.library.remove(tag);
        if self.session.active_tag.as_deref() == Some(tag) {
            self.session.active_tag = None;
            self.session.view = View::Tags;
        }
        self.finish_bulk(&owner, active_affected).await;
        Ok(())
    }

    /// Apply a tag-list transform to every note carrying `tag`, syncing
    /// remote-eligible notes one at a time. Rolls every affected note back
    /// to its pre-operation tags and timestamp on the first remote failure.
    /// Returns whether the active note was among the affected.
    async fn sync_tag_change<F>(&mut self, tag: &str, transform: F) -> Result<bool>
    where
        F: Fn(&[String]) -> Vec<String>,
    {
        let affected: Vec<usize> = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.tags.iter().any(|t| t == tag))
            .map(|(i, _)| i)
            .collect();
        if affected.is_empty() {
            return Ok(false);
        }
        let backups: Vec<(usize, Vec<String>, DateTime<Utc>)> = affected
            .iter()
            .map(|&i| (i, self.notes[i].tags.clone(), self.notes[i].updated_at))
            .collect();

        self.emit_status(SyncStatus::Syncing);
        let mut failure = None;
        for &idx in &affected {
            let updated = transform(&self.notes[idx].tags);
            if updated == self.notes[idx].tags {
                continue;
            }
            self.notes[idx].tags = updated;
            self.notes[idx].updated_at = Utc::now();
            if self.notes[idx].is_remote() {
                let id = self.notes[idx].id.clone();
                let payload = self.notes[idx].payload();
                match self.api.update(&id, payload).await {
                    Ok(synced) => self.notes[idx].apply_remote(synced),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        if let Some(e) = failure {
            warn!(tag, error = %e, "bulk tag change failed, rolling back");
            for (idx, tags, updated_at) in backups {
                self.notes[idx].tags = tags;
                self.notes[idx].updated_at = updated_at;
            }
            self.emit_status(SyncStatus::Failed);
            return Err(e);
        }

        Ok(self
            .session
            .active_note
            .as_ref()
            .map(|id| affected.iter().any(|&i| &self.notes[i].id == id))
            .unwrap_or(false))
    }

    async fn finish_bulk(&mut self, owner: &str, refresh_editor: bool) {
        self.persist(owner).await;
        self.emit_status(SyncStatus::Synced);
        self.events().emit(ViewEvent::TagCloudInvalidated);
        self.events().emit(ViewEvent::NoteListInvalidated);
        if refresh_editor {
            // The open note changed underneath the editor: drop the stale
            // draft and re-derive editor tag state from the stored note.
            let tags = self.active_note().map(|n| n.tags.clone());
            if let Some(tags) = tags {
                self.session.editor_tags = tags.iter().cloned().collect();
                self.session.tag_signature = signature_of(tags.iter().map(String::as_str));
            }
            self.draft = None;
            self.events().emit(ViewEvent::EditorRefresh);
        }
    }
}
