use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
    time::{SystemTime, UNIX_EPOCH},
};
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Idle,
    Discovering,
    Diffing,
    Syncing,
    Cleaning,
}
/// Mutual-exclusion guard and bookkeeping for sync passes.
pub struct SyncState {
    syncing: AtomicBool,
    phase: Mutex<SyncPhase>,
    last_sync: Mutex<Option<SystemTime>>,
}
impl SyncState {
    pub fn new() -> Self {
        Self {
            syncing: AtomicBool::new(false),
            phase: Mutex::new(SyncPhase::Idle),
            last_sync: Mutex::new(None),
        }
    }
    /// Claims the engine for one pass; false if a pass already owns it.
    pub fn try_begin(&self) -> bool {
        self.syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
    pub fn end(&self) {
        self.set_phase(SyncPhase::Idle);
        self.syncing.store(false, Ordering::SeqCst);
    }
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }
    pub fn phase(&self) -> SyncPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn set_phase(&self, phase: SyncPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }
    pub fn record_success(&self) {
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner) = Some(SystemTime::now());
    }
    /// Milliseconds since the epoch of the last successful pass.
    pub fn last_sync_ms(&self) -> Option<u64> {
        let last = *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner);
        last.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
    }
}
impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
/// Releases the pass even if the pipeline unwinds.
pub(crate) struct PassGuard<'a>(pub(crate) &'a SyncState);
impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.end();
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_files: usize,
    pub is_syncing: bool,
    pub last_sync_time: Option<u64>,
    pub is_watching: bool,
}
