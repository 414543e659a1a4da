//! In-memory table of what is currently mirrored.
//!
//! The index is never persisted on its own: [`MirrorIndex::load`] rebuilds it
//! from the mirror directory, so whatever sits on disk is the source of truth
//! after a restart.
use crate::{is_accepted, mirror_key, modified_millis};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap, io, path::{Path, PathBuf},
};
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEntry {
    pub filename: String,
    pub size: u64,
    pub modified_ms: u64,
    /// Set once the copy has been confirmed by re-statting the destination.
    pub synced: bool,
}
#[derive(Debug, Clone)]
pub struct MirrorIndex {
    root: PathBuf,
    entries: HashMap<String, MirrorEntry>,
}
impl MirrorIndex {
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: HashMap::new(),
        }
    }
    /// Scans `root` and records every accepted file as synced.
    pub async fn load(root: impl Into<PathBuf>, batch_size: usize) -> io::Result<Self> {
        let mut index = Self::empty(root);
        let mut dir = tokio::fs::read_dir(&index.root).await?;
        let mut seen = 0usize;
        while let Some(entry) = dir.next_entry().await? {
            seen += 1;
            if seen % batch_size.max(1) == 0 {
                tokio::task::yield_now().await;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !is_accepted(&name) {
                continue;
            }
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                _ => continue,
            };
            index.upsert(&name, meta.len(), modified_millis(&meta));
        }
        Ok(index)
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    pub fn has(&self, filename: &str) -> bool {
        self.entries.contains_key(&mirror_key(filename))
    }
    pub fn get(&self, filename: &str) -> Option<&MirrorEntry> {
        self.entries.get(&mirror_key(filename))
    }
    /// Location of the mirrored copy, using the on-disk spelling of the name.
    pub fn resolve_path(&self, filename: &str) -> Option<PathBuf> {
        self.get(filename).map(|entry| self.root.join(&entry.filename))
    }
    pub fn upsert(&mut self, filename: &str, size: u64, modified_ms: u64) {
        self.entries
            .insert(
                mirror_key(filename),
                MirrorEntry {
                    filename: filename.to_string(),
                    size,
                    modified_ms,
                    synced: true,
                },
            );
    }
    pub fn mark_unsynced(&mut self, filename: &str) {
        if let Some(entry) = self.entries.get_mut(&mirror_key(filename)) {
            entry.synced = false;
        }
    }
    pub fn remove(&mut self, filename: &str) -> Option<MirrorEntry> {
        self.entries.remove(&mirror_key(filename))
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Snapshot of all entries, sorted by lowercase filename.
    pub fn entries(&self) -> Vec<MirrorEntry> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|key| self.entries.get(key)).cloned().collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    #[test]
    fn lookups_ignore_case() {
        let mut index = MirrorIndex::empty("/mirror");
        index.upsert("IMG_0001.JPG", 10, 1_000);
        assert!(index.has("img_0001.jpg"));
        assert_eq!(
            index.resolve_path("Img_0001.Jpg"), Some(PathBuf::from("/mirror/IMG_0001.JPG"))
        );
        assert!(index.resolve_path("missing.jpg").is_none());
    }
    #[test]
    fn upsert_replaces_and_resets_synced() {
        let mut index = MirrorIndex::empty("/mirror");
        index.upsert("a.jpg", 10, 1_000);
        index.mark_unsynced("A.jpg");
        assert!(! index.get("a.jpg").unwrap().synced);
        index.upsert("a.jpg", 20, 2_000);
        let entry = index.get("a.jpg").unwrap();
        assert!(entry.synced);
        assert_eq!(entry.size, 20);
        assert_eq!(index.len(), 1);
        assert!(index.remove("A.JPG").is_some());
        assert!(index.is_empty());
    }
    #[tokio::test]
    async fn load_reads_accepted_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"aaaa").unwrap();
        fs::write(dir.path().join("b.JPEG"), b"bb").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::write(dir.path().join(".c.jpg.tmp-sync"), b"partial").unwrap();
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();
        let index = MirrorIndex::load(dir.path(), 1).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a.jpg").unwrap().size, 4);
        assert!(index.get("b.jpeg").unwrap().synced);
        assert!(! index.has("notes.txt"));
    }
    #[tokio::test]
    async fn load_of_missing_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(MirrorIndex::load(dir.path().join("absent"), 50).await.is_err());
    }
}
