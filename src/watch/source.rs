use crate::monitoring::ChangeKind;
use anyhow::{Context, Result};
use log::debug;
use notify::{
    event::ModifyKind, Event, EventKind, RecursiveMode, Result as NotifyResult, Watcher,
};
use std::{any::Any, path::{Path, PathBuf}};
use tokio::sync::mpsc;
const NOTICE_CAPACITY: usize = 1024;
/// Predicate applied to bare filenames before a notice is delivered.
pub type NameFilter = fn(&str) -> bool;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub kind: ChangeKind,
    pub filename: String,
}
/// A live subscription. Dropping it stops delivery.
pub struct Subscription {
    pub notices: mpsc::Receiver<Result<ChangeNotice>>,
    _guard: Option<Box<dyn Any + Send>>,
}
impl Subscription {
    pub fn new(
        notices: mpsc::Receiver<Result<ChangeNotice>>,
        guard: Option<Box<dyn Any + Send>>,
    ) -> Self {
        Self { notices, _guard: guard }
    }
}
/// Capability interface over native change notification.
pub trait ChangeSource: Send + Sync {
    fn subscribe(&self, dir: &Path, filter: NameFilter) -> Result<Subscription>;
}
/// [`ChangeSource`] backed by the platform watcher from `notify`.
pub struct NotifyChangeSource;
impl ChangeSource for NotifyChangeSource {
    fn subscribe(&self, dir: &Path, filter: NameFilter) -> Result<Subscription> {
        let (tx, rx) = mpsc::channel(NOTICE_CAPACITY);
        let roots = [dir.to_path_buf(), dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())];
        let mut watcher = notify::recommended_watcher(move |res: NotifyResult<Event>| {
            match res {
                Ok(event) => {
                    debug!("raw notify event: {:?}", event);
                    for notice in translate(&roots, &event, filter) {
                        deliver(&tx, Ok(notice));
                    }
                }
                Err(e) => {
                    debug!("watcher error: {e:?}");
                    deliver(&tx, Err(anyhow::Error::new(e)));
                }
            }
        })
            .context("failed to initialise file‑watcher")?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("cannot watch repository {:?}", dir))?;
        Ok(Subscription::new(rx, Some(Box::new(watcher))))
    }
}
/// Non-blocking hand-off from the watcher thread. Returns false when the
/// message was dropped because the receiver is full or gone.
fn deliver(tx: &mpsc::Sender<Result<ChangeNotice>>, message: Result<ChangeNotice>) -> bool {
    match tx.try_send(message) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(Ok(notice))) => {
            debug!("change notice for {} dropped; polling will pick it up", notice.filename);
            false
        }
        Err(mpsc::error::TrySendError::Full(Err(e))) => {
            debug!("watcher error dropped, channel full: {:#}", e);
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("change subscription closed; message discarded");
            false
        }
    }
}
fn translate(roots: &[PathBuf], event: &Event, filter: NameFilter) -> Vec<ChangeNotice> {
    event
        .paths
        .iter()
        .filter(|path| roots.iter().any(|root| path.parent() == Some(root.as_path())))
        .filter_map(|path| {
            let filename = path.file_name()?.to_str()?.to_string();
            if !filter(&filename) {
                return None;
            }
            let kind = classify(&event.kind, path)?;
            Some(ChangeNotice { kind, filename })
        })
        .collect()
}
fn classify(kind: &EventKind, path: &Path) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Add),
        EventKind::Remove(_) => Some(ChangeKind::Unlink),
        EventKind::Modify(ModifyKind::Name(_)) => {
            Some(if path.exists() { ChangeKind::Add } else { ChangeKind::Unlink })
        }
        EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Change),
        EventKind::Access(_) | EventKind::Other => None,
    }
}
