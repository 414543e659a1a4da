//! Sync orchestrator and the public surface consumed by the display layer.
pub mod state;
pub use state::{EngineStats, SyncPhase, SyncState};
use crate::{
    config::MirrorSettings, errors::{ErrorCode, MirrorError}, index::{MirrorEntry, MirrorIndex},
    is_accepted,
    monitoring::{ActivityLog, MirrorEvent, SyncCompletion},
    pipeline::{SyncContext, SyncTally},
    watch::{ChangeNotice, ChangeSource, Debouncer, NotifyChangeSource, PollReport, Subscription},
};
use anyhow::Result;
use log::debug;
use state::PassGuard;
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError, Weak,
    },
    time::{Duration, Instant},
};
use tokio::{
    sync::broadcast, task::JoinHandle,
    time::MissedTickBehavior,
};
struct WatchState {
    enabled: AtomicBool,
    debouncer: Debouncer,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}
impl WatchState {
    fn abort_tasks(&self) {
        for task in self.tasks.lock().unwrap_or_else(PoisonError::into_inner).drain(..) {
            task.abort();
        }
    }
}
impl Drop for WatchState {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
struct EngineInner {
    ctx: SyncContext,
    state: SyncState,
    watch: WatchState,
    source: Arc<dyn ChangeSource>,
}
/// Keeps a local mirror of a (possibly slow) photo repository up to date.
///
/// Cloning is cheap; clones share the same mirror. Methods that start
/// background work (`start_sync`, `start_watch`, `force_full_resync`) must be
/// called from within a Tokio runtime.
#[derive(Clone)]
pub struct MirrorEngine {
    inner: Arc<EngineInner>,
}
impl MirrorEngine {
    pub fn new(
        repository: impl Into<PathBuf>,
        mirror: impl Into<PathBuf>,
        settings: MirrorSettings,
        log: Arc<dyn ActivityLog>,
    ) -> Self {
        Self::with_change_source(repository, mirror, settings, log, Arc::new(NotifyChangeSource))
    }
    pub fn with_change_source(
        repository: impl Into<PathBuf>,
        mirror: impl Into<PathBuf>,
        settings: MirrorSettings,
        log: Arc<dyn ActivityLog>,
        source: Arc<dyn ChangeSource>,
    ) -> Self {
        let debouncer = Debouncer::new(settings.debounce());
        let ctx = SyncContext::new(repository.into(), mirror.into(), settings, log);
        Self {
            inner: Arc::new(EngineInner {
                ctx,
                state: SyncState::new(),
                watch: WatchState {
                    enabled: AtomicBool::new(false),
                    debouncer,
                    tasks: Mutex::new(Vec::new()),
                },
                source,
            }),
        }
    }
    pub fn repository(&self) -> &Path {
        &self.inner.ctx.repository
    }
    pub fn mirror(&self) -> &Path {
        &self.inner.ctx.mirror
    }
    /// Creates the mirror directory if needed and rebuilds the index from
    /// it. An unreadable mirror leaves the index empty; the next pass
    /// repopulates it.
    pub async fn initialize(&self) -> Result<()> {
        let ctx = &self.inner.ctx;
        tokio::fs::create_dir_all(&ctx.mirror)
            .await
            .map_err(|e| {
                MirrorError::new(ErrorCode::MirrorUnavailable, format!("cannot create mirror: {}", e))
                    .with_context("path", &ctx.mirror.display().to_string())
            })?;
        let index = match MirrorIndex::load(&ctx.mirror, ctx.settings.discovery_batch_size).await {
            Ok(index) => index,
            Err(e) => {
                ctx.log.warning(&format!("Could not read mirror index, starting empty: {}", e));
                MirrorIndex::empty(&ctx.mirror)
            }
        };
        let count = index.len();
        *ctx.index_mut() = index;
        ctx.log.success(&format!("Mirror ready at {:?} with {} file(s)", ctx.mirror, count));
        Ok(())
    }
    /// Fire-and-forget sync. Returns false (and does nothing) when a pass
    /// is already running.
    pub fn start_sync(&self) -> bool {
        self.inner.start_sync()
    }
    /// Runs a pass on the current task and returns its outcome, or `None`
    /// when another pass already holds the engine.
    pub async fn sync_now(&self) -> Option<SyncCompletion> {
        if !self.inner.try_begin() {
            return None;
        }
        Some(self.inner.run_pass().await)
    }
    /// Requests cooperative abort; an in-flight file copy still completes.
    pub fn stop_sync(&self) {
        if self.inner.state.is_syncing() {
            self.inner.ctx.log.info("Sync abort requested");
        }
        self.inner.ctx.request_abort();
    }
    /// Manual refresh from the UI: same pipeline as `start_sync`.
    pub fn force_full_resync(&self) -> bool {
        self.inner.ctx.log.info("Manual refresh requested");
        self.inner.start_sync()
    }
    /// Starts the change watcher and the poller. Returns false if they were
    /// already running.
    pub fn start_watch(&self) -> bool {
        let inner = &self.inner;
        if inner.watch.enabled.swap(true, Ordering::SeqCst) {
            return false;
        }
        let weak = Arc::downgrade(inner);
        let mut tasks = Vec::new();
        match inner.source.subscribe(&inner.ctx.repository, is_accepted) {
            Ok(subscription) => {
                tasks.push(tokio::spawn(pump_notices(weak.clone(), subscription)));
            }
            Err(e) => {
                let err = MirrorError::new(ErrorCode::WatcherUnavailable, format!("{:#}", e));
                inner.ctx.log.warning(&format!("{}; relying on polling only", err));
            }
        }
        tasks.push(tokio::spawn(poll_loop(weak, inner.ctx.settings.poll_interval())));
        *inner.watch.tasks.lock().unwrap_or_else(PoisonError::into_inner) = tasks;
        inner.ctx.log.info(&format!("Watching repository {:?}", inner.ctx.repository));
        true
    }
    pub fn stop_watch(&self) {
        let inner = &self.inner;
        if !inner.watch.enabled.swap(false, Ordering::SeqCst) {
            return;
        }
        inner.watch.abort_tasks();
        inner.watch.debouncer.cancel();
        inner.ctx.log.info("Stopped watching repository");
    }
    pub fn is_watching(&self) -> bool {
        self.inner.watch.enabled.load(Ordering::SeqCst)
    }
    /// Runs one poller tick now. Skipped (empty report) while a pass runs;
    /// detected changes schedule a debounced sync.
    pub async fn poll_once(&self) -> PollReport {
        self.inner.poll().await
    }
    pub fn get_mirror_path(&self, filename: &str) -> Option<PathBuf> {
        self.inner.ctx.index().resolve_path(filename)
    }
    pub fn has_file(&self, filename: &str) -> bool {
        self.inner.ctx.index().has(filename)
    }
    pub fn entries(&self) -> Vec<MirrorEntry> {
        self.inner.ctx.index().entries()
    }
    pub fn phase(&self) -> SyncPhase {
        self.inner.state.phase()
    }
    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            total_files: self.inner.ctx.index().len(),
            is_syncing: self.inner.state.is_syncing(),
            last_sync_time: self.inner.state.last_sync_ms(),
            is_watching: self.is_watching(),
        }
    }
    pub fn subscribe(&self) -> broadcast::Receiver<MirrorEvent> {
        self.inner.ctx.events.subscribe()
    }
}
impl EngineInner {
    fn try_begin(&self) -> bool {
        if !self.state.try_begin() {
            return false;
        }
        self.ctx.clear_abort();
        true
    }
    fn start_sync(self: &Arc<Self>) -> bool {
        if !self.try_begin() {
            debug!("sync already in progress; trigger dropped");
            return false;
        }
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_pass().await;
        });
        true
    }
    fn schedule_sync(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.watch
            .debouncer
            .schedule(async move {
                if let Some(inner) = weak.upgrade() {
                    inner.start_sync();
                }
            });
    }
    fn on_change(self: &Arc<Self>, notice: ChangeNotice) {
        debug!("repository {:?}: {}", notice.kind, notice.filename);
        self.ctx.force.insert(&notice.filename);
        self.ctx
            .events
            .emit(MirrorEvent::RepositoryChanged {
                kind: notice.kind,
                filename: notice.filename,
            });
        self.schedule_sync();
    }
    async fn poll(self: &Arc<Self>) -> PollReport {
        if self.state.is_syncing() {
            return PollReport::default();
        }
        let report = self.ctx.poll_tick().await;
        if report.changes_detected {
            self.schedule_sync();
        }
        report
    }
    /// One pass; the caller must already hold the engine via `try_begin`.
    /// `SyncCompleted` goes out before the guard releases the engine, so the
    /// next pass cannot start ahead of it.
    async fn run_pass(&self) -> SyncCompletion {
        let started = Instant::now();
        let _guard = PassGuard(&self.state);
        self.ctx.events.emit(MirrorEvent::SyncStarted);
        self.ctx.log.info(&format!("Syncing {:?} → {:?}", self.ctx.repository, self.ctx.mirror));
        let completion = match self.run_phases().await {
            Ok(tally) => {
                self.state.record_success();
                self.ctx
                    .log
                    .success(
                        &format!(
                            "Mirror sync complete: {} copied, {} unchanged, {} error(s) in {:.2?}",
                            tally.synced, tally.skipped, tally.errors, started.elapsed()
                        ),
                    );
                SyncCompletion {
                    success: true,
                    synced: tally.synced,
                    skipped: tally.skipped,
                    errors: tally.errors,
                    error: None,
                }
            }
            Err(e) if e.is_aborted() => {
                self.ctx.log.warning("Mirror sync aborted");
                SyncCompletion::failed(e.to_string())
            }
            Err(e) => {
                self.ctx.log.error(&format!("Mirror sync failed: {}", e));
                SyncCompletion::failed(e.to_string())
            }
        };
        self.ctx.events.emit(MirrorEvent::SyncCompleted(completion.clone()));
        completion
    }
    async fn run_phases(&self) -> Result<SyncTally, MirrorError> {
        self.state.set_phase(SyncPhase::Discovering);
        let discovered = self.ctx.discover().await?;
        self.state.set_phase(SyncPhase::Diffing);
        let needs_sync = self.ctx.diff(&discovered).await?;
        self.state.set_phase(SyncPhase::Syncing);
        let tally = self.ctx.sync_files(&needs_sync, discovered.len()).await?;
        self.state.set_phase(SyncPhase::Cleaning);
        self.ctx.cleanup(&discovered).await?;
        Ok(tally)
    }
}
async fn pump_notices(engine: Weak<EngineInner>, mut subscription: Subscription) {
    while let Some(message) = subscription.notices.recv().await {
        let Some(inner) = engine.upgrade() else {
            break;
        };
        match message {
            Ok(notice) => inner.on_change(notice),
            Err(e) => inner.ctx.log.warning(&format!("Watcher error: {:#}", e)),
        }
    }
}
async fn poll_loop(engine: Weak<EngineInner>, period: Duration) {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(inner) = engine.upgrade() else {
            break;
        };
        inner.poll().await;
    }
}
