use super::SyncContext;
use crate::{errors::MirrorError, modified_millis};
impl SyncContext {
    /// Picks the files that need copying. Metadata only: size and
    /// modification time against the index, plus anything force-flagged.
    pub async fn diff(&self, discovered: &[String]) -> Result<Vec<String>, MirrorError> {
        let batch_size = self.settings.discovery_batch_size.max(1);
        let mut needs_sync = Vec::new();
        for batch in discovered.chunks(batch_size) {
            for filename in batch {
                if self.force.contains(filename) {
                    needs_sync.push(filename.clone());
                    continue;
                }
                let entry = match self.index().get(filename) {
                    Some(entry) if entry.synced => entry.clone(),
                    _ => {
                        needs_sync.push(filename.clone());
                        continue;
                    }
                };
                let source = self.repository.join(filename);
                match tokio::fs::metadata(&source).await {
                    Ok(meta) => {
                        if meta.len() != entry.size
                            || modified_millis(&meta) != entry.modified_ms
                        {
                            needs_sync.push(filename.clone());
                        }
                    }
                    Err(e) => {
                        self.log
                            .warning(
                                &format!("Skipping {}: cannot stat source ({})", filename, e),
                            );
                    }
                }
            }
            self.checkpoint().await?;
        }
        Ok(needs_sync)
    }
}
