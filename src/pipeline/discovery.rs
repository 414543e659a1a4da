use super::SyncContext;
use crate::{
    errors::MirrorError, is_accepted,
    monitoring::{MirrorEvent, ProgressPhase, SyncProgress},
};
use log::debug;
use std::path::Path;
impl SyncContext {
    /// Lists the accepted files of the repository, emitting discovery
    /// progress after each batch.
    pub async fn discover(&self) -> Result<Vec<String>, MirrorError> {
        let names = self
            .list_accepted(|current, total| {
                self.events
                    .emit(
                        MirrorEvent::SyncProgress(
                            SyncProgress::phase(ProgressPhase::Discovery, current, total),
                        ),
                    );
            })
            .await?;
        debug!("discovered {} accepted file(s) in {:?}", names.len(), self.repository);
        Ok(names)
    }
    /// Same listing as [`discover`](Self::discover) without progress events.
    pub async fn list_repository(&self) -> Result<Vec<String>, MirrorError> {
        self.list_accepted(|_, _| {}).await
    }
    async fn list_accepted<F>(&self, mut progress: F) -> Result<Vec<String>, MirrorError>
    where
        F: FnMut(usize, usize),
    {
        let batch_size = self.settings.discovery_batch_size.max(1);
        if !is_directory(&self.repository).await {
            return Err(MirrorError::repository_not_found(&self.repository));
        }
        let mut dir = tokio::fs::read_dir(&self.repository)
            .await
            .map_err(|e| MirrorError::io("read_dir", &self.repository, &e))?;
        let mut raw: Vec<(String, bool)> = Vec::new();
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(MirrorError::io("read_dir", &self.repository, &e)),
            };
            if let Ok(name) = entry.file_name().into_string() {
                let is_file = match entry.file_type().await {
                    Ok(kind) if kind.is_symlink() => {
                        is_regular_file(&self.repository.join(&name)).await
                    }
                    Ok(kind) => kind.is_file(),
                    Err(_) => false,
                };
                raw.push((name, is_file));
            }
            if raw.len() % batch_size == 0 {
                self.checkpoint().await?;
            }
        }
        let total = raw.len();
        let mut accepted = Vec::new();
        let mut processed = 0;
        for batch in raw.chunks(batch_size) {
            for (name, is_file) in batch {
                if *is_file && is_accepted(name) {
                    accepted.push(name.clone());
                }
            }
            processed += batch.len();
            progress(processed, total);
            self.checkpoint().await?;
        }
        accepted.sort();
        Ok(accepted)
    }
}
async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}
async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
#[cfg(test)]
mod tests {
    use crate::errors::ErrorCode;
    use crate::monitoring::{MirrorEvent, ProgressPhase};
    use crate::testing::context_for;
    use std::fs;
    use tempfile::tempdir;
    #[tokio::test]
    async fn discovers_only_jpeg_files() {
        let repo = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        fs::write(repo.path().join("a.jpg"), b"a").unwrap();
        fs::write(repo.path().join("B.JPEG"), b"b").unwrap();
        fs::write(repo.path().join("c.txt"), b"c").unwrap();
        fs::write(repo.path().join("d.png"), b"d").unwrap();
        fs::create_dir(repo.path().join("folder.jpg")).unwrap();
        let (ctx, _log) = context_for(repo.path(), mirror.path());
        let names = ctx.discover().await.unwrap();
        assert_eq!(names, vec!["B.JPEG".to_string(), "a.jpg".to_string()]);
    }
    #[tokio::test]
    async fn emits_progress_per_batch() {
        let repo = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        for i in 0..120 {
            fs::write(repo.path().join(format!("{:03}.jpg", i)), b"x").unwrap();
        }
        let (ctx, _log) = context_for(repo.path(), mirror.path());
        let mut rx = ctx.events.subscribe();
        assert_eq!(ctx.discover().await.unwrap().len(), 120);
        let mut seen = Vec::new();
        while let Ok(MirrorEvent::SyncProgress(p)) = rx.try_recv() {
            assert_eq!(p.phase, ProgressPhase::Discovery);
            assert_eq!(p.total, 120);
            seen.push(p.current);
        }
        assert_eq!(seen, vec![50, 100, 120]);
    }
    #[tokio::test]
    async fn missing_repository_is_reported() {
        let root = tempdir().unwrap();
        let (ctx, _log) = context_for(&root.path().join("gone"), root.path());
        let err = ctx.discover().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RepositoryNotFound);
    }
    #[tokio::test]
    async fn abort_stops_discovery() {
        let repo = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        fs::write(repo.path().join("a.jpg"), b"a").unwrap();
        let (ctx, _log) = context_for(repo.path(), mirror.path());
        ctx.request_abort();
        assert!(ctx.discover().await.unwrap_err().is_aborted());
    }
}
