use super::SyncContext;
use crate::{
    errors::MirrorError, modified_millis,
    monitoring::{MirrorEvent, ProgressPhase, SyncProgress},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io, path::{Path, PathBuf},
};
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTally {
    pub synced: usize,
    pub skipped: usize,
    pub errors: usize,
}
impl SyncContext {
    /// Copies `needs_sync` into the mirror. `discovered` is the size of the
    /// full listing, used to report how many files were left untouched.
    pub async fn sync_files(
        &self,
        needs_sync: &[String],
        discovered: usize,
    ) -> Result<SyncTally, MirrorError> {
        let batch_size = self.settings.sync_batch_size.max(1);
        let total = needs_sync.len();
        let mut tally = SyncTally {
            skipped: discovered.saturating_sub(total),
            ..SyncTally::default()
        };
        let mut processed = 0;
        for batch in needs_sync.chunks(batch_size) {
            if self.is_aborted() {
                return Err(MirrorError::aborted());
            }
            for filename in batch {
                match self.sync_one(filename).await {
                    Ok(()) => {
                        tally.synced += 1;
                        self.events
                            .emit(MirrorEvent::FileSynced {
                                filename: filename.clone(),
                            });
                    }
                    Err(e) => {
                        tally.errors += 1;
                        self.index_mut().mark_unsynced(filename);
                        self.log.error(&format!("Failed to sync {}: {}", filename, e));
                    }
                }
            }
            processed += batch.len();
            self.events
                .emit(
                    MirrorEvent::SyncProgress(SyncProgress {
                        phase: ProgressPhase::Syncing,
                        current: processed,
                        total,
                        synced: Some(tally.synced),
                        errors: Some(tally.errors),
                    }),
                );
            tokio::task::yield_now().await;
        }
        Ok(tally)
    }
    async fn sync_one(&self, filename: &str) -> io::Result<()> {
        let source = self.repository.join(filename);
        let dest = self.mirror.join(filename);
        let previous = self.index().get(filename).map(|entry| entry.filename.clone());
        if let Some(old) = previous.filter(|old| old != filename) {
            // Same key under a different spelling; drop the old copy first so
            // case-insensitive filesystems end up with the new name.
            match tokio::fs::remove_file(self.mirror.join(&old)).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            self.index_mut().remove(&old);
        }
        let (src, dst) = (source.clone(), dest.clone());
        tokio::task::spawn_blocking(move || copy_into_place(&src, &dst))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;
        let meta = tokio::fs::metadata(&dest).await?;
        self.index_mut().upsert(filename, meta.len(), modified_millis(&meta));
        self.force.remove(filename);
        debug!("mirrored {:?} → {:?} ({} bytes)", source, dest, meta.len());
        Ok(())
    }
}
fn staging_path(dest: &Path) -> PathBuf {
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    dest.with_file_name(format!(".{}.tmp-sync", name))
}
/// Copies through a staging file and renames it over `dest`, carrying the
/// source modification time so the next diff sees matching metadata.
/// The staging file is removed on any failure, including a copy cut short.
fn copy_into_place(source: &Path, dest: &Path) -> io::Result<()> {
    let tmp = staging_path(dest);
    let result = stage_and_rename(source, &tmp, dest);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
fn stage_and_rename(source: &Path, tmp: &Path, dest: &Path) -> io::Result<()> {
    let source_meta = fs::metadata(source)?;
    fs::copy(source, tmp)?;
    let file = OpenOptions::new().write(true).open(tmp)?;
    file.set_modified(source_meta.modified()?)?;
    drop(file);
    fs::rename(tmp, dest)
}
