use super::SyncContext;
use crate::{
    errors::MirrorError, mirror_key,
    monitoring::{MirrorEvent, ProgressPhase, SyncProgress},
};
use std::{collections::HashSet, io};
impl SyncContext {
    /// Deletes mirrored files whose source is not in `discovered`. Returns
    /// how many were actually removed.
    pub async fn cleanup(&self, discovered: &[String]) -> Result<usize, MirrorError> {
        let present: HashSet<String> = discovered.iter().map(|name| mirror_key(name)).collect();
        self.force.retain_present(&present);
        let stale: Vec<String> = self
            .index()
            .entries()
            .into_iter()
            .filter(|entry| !present.contains(&mirror_key(&entry.filename)))
            .map(|entry| entry.filename)
            .collect();
        if stale.is_empty() {
            return Ok(0);
        }
        let batch_size = self.settings.discovery_batch_size.max(1);
        let total = stale.len();
        let mut removed = 0;
        let mut processed = 0;
        for batch in stale.chunks(batch_size) {
            if self.is_aborted() {
                return Err(MirrorError::aborted());
            }
            for filename in batch {
                let path = self.mirror.join(filename);
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        self.log
                            .warning(
                                &format!("Could not remove stale mirror file {}: {}", filename, e),
                            );
                        continue;
                    }
                }
                self.index_mut().remove(filename);
                removed += 1;
            }
            processed += batch.len();
            self.events
                .emit(
                    MirrorEvent::SyncProgress(
                        SyncProgress::phase(ProgressPhase::Cleanup, processed, total),
                    ),
                );
            tokio::task::yield_now().await;
        }
        if removed > 0 {
            self.log.info(&format!("Removed {} stale file(s) from mirror", removed));
        }
        Ok(removed)
    }
}
