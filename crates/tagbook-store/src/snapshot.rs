//! File-backed local snapshot store.
//!
//! One JSON document per owner under a base directory. Writes are atomic
//! (temp file then rename) so a crash mid-write never corrupts the previous
//! snapshot. Loads are tolerant: absence, unreadable JSON, and an
//! incompatible version stamp all read as "no snapshot".

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use tagbook_core::{Result, SnapshotStore, StoredState};

/// Filesystem snapshot store keyed by owner identity.
pub struct FileSnapshotStore {
    base_dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on first save.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, owner: &str) -> PathBuf {
        self.base_dir
            .join(format!("state-v1-{}.json", sanitize_owner(owner)))
    }
}

/// Restrict the owner-derived file name component to `[A-Za-z0-9._-]`.
fn sanitize_owner(owner: &str) -> String {
    owner
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, owner: &str) -> Result<Option<StoredState>> {
        let path = self.path_for(owner);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(owner_id = owner, "no local snapshot");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let state: StoredState = match serde_json::from_slice(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(owner_id = owner, error = %e, "discarding unreadable snapshot");
                return Ok(None);
            }
        };
        if !state.is_compatible() {
            warn!(
                owner_id = owner,
                version = state.version,
                "discarding incompatible snapshot"
            );
            return Ok(None);
        }
        Ok(Some(state))
    }

    async fn save(&self, owner: &str, state: &StoredState) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await?;
        let path = self.path_for(owner);
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(state)?;
        fs::write(&tmp, &raw).await?;
        fs::rename(&tmp, &path).await?;
        debug!(owner_id = owner, bytes = raw.len(), "snapshot persisted");
        Ok(())
    }

    async fn clear(&self, owner: &str) -> Result<()> {
        match fs::remove_file(self.path_for(owner)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
