//! The four sync phases: discovery, diff, copy and cleanup.
//!
//! Every phase works in fixed-size batches and yields to the runtime between
//! them, checking the abort flag at each batch boundary. Per-file failures
//! are logged and counted, never propagated; the only errors a phase returns
//! are "repository missing" and "aborted".
pub mod cleanup;
pub mod diff;
pub mod discovery;
pub mod executor;
use crate::{
    config::MirrorSettings, errors::MirrorError, index::MirrorIndex, mirror_key,
    monitoring::{ActivityLog, EventBus},
};
use std::{
    collections::HashSet, path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};
pub use executor::SyncTally;
/// Filenames that must be copied on the next pass no matter what the index
/// says. Keys are case-insensitive.
#[derive(Debug, Default)]
pub struct ForceResyncSet {
    names: Mutex<HashSet<String>>,
}
impl ForceResyncSet {
    pub fn insert(&self, filename: &str) {
        self.names.lock().unwrap_or_else(PoisonError::into_inner).insert(mirror_key(filename));
    }
    pub fn remove(&self, filename: &str) {
        self.names.lock().unwrap_or_else(PoisonError::into_inner).remove(&mirror_key(filename));
    }
    pub fn contains(&self, filename: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&mirror_key(filename))
    }
    /// Drops names whose file is gone from the repository; there is nothing
    /// left to copy for them. `present` holds lookup keys.
    pub fn retain_present(&self, present: &HashSet<String>) {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|name| present.contains(name));
    }
    pub fn len(&self) -> usize {
        self.names.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
/// State shared by every phase of a pass, plus the poller.
pub struct SyncContext {
    pub repository: PathBuf,
    pub mirror: PathBuf,
    pub settings: MirrorSettings,
    pub events: EventBus,
    pub log: Arc<dyn ActivityLog>,
    pub force: ForceResyncSet,
    index: RwLock<MirrorIndex>,
    abort: AtomicBool,
    /// Poller ticks so far; selects the stride offset of the next sample.
    pub(crate) poll_round: AtomicUsize,
}
impl SyncContext {
    pub fn new(
        repository: PathBuf,
        mirror: PathBuf,
        settings: MirrorSettings,
        log: Arc<dyn ActivityLog>,
    ) -> Self {
        let events = EventBus::new(settings.event_capacity);
        let index = RwLock::new(MirrorIndex::empty(mirror.clone()));
        Self {
            repository,
            mirror,
            settings,
            events,
            log,
            force: ForceResyncSet::default(),
            index,
            abort: AtomicBool::new(false),
            poll_round: AtomicUsize::new(0),
        }
    }
    pub fn index(&self) -> RwLockReadGuard<'_, MirrorIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn index_mut(&self) -> RwLockWriteGuard<'_, MirrorIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }
    pub fn clear_abort(&self) {
        self.abort.store(false, Ordering::SeqCst);
    }
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
    /// Batch boundary: bail out when an abort was requested, otherwise let
    /// other tasks run before the next batch.
    pub(crate) async fn checkpoint(&self) -> Result<(), MirrorError> {
        if self.is_aborted() {
            return Err(MirrorError::aborted());
        }
        tokio::task::yield_now().await;
        Ok(())
    }
}
