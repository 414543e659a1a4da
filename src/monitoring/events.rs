use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Change,
    Unlink,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    Discovery,
    Syncing,
    Cleanup,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub phase: ProgressPhase,
    pub current: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
}
impl SyncProgress {
    pub fn phase(phase: ProgressPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            synced: None,
            errors: None,
        }
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCompletion {
    pub success: bool,
    pub synced: usize,
    pub skipped: usize,
    pub errors: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
impl SyncCompletion {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            synced: 0,
            skipped: 0,
            errors: 0,
            error: Some(error.into()),
        }
    }
}
/// Everything the engine reports to the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum MirrorEvent {
    SyncStarted,
    SyncProgress(SyncProgress),
    SyncCompleted(SyncCompletion),
    FileSynced { filename: String },
    RepositoryChanged {
        #[serde(rename = "type")]
        kind: ChangeKind,
        filename: String,
    },
}
/// Fan-out of [`MirrorEvent`]s. Sending never fails; events emitted while
/// nobody listens are dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MirrorEvent>,
}
impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }
    pub fn subscribe(&self) -> broadcast::Receiver<MirrorEvent> {
        self.tx.subscribe()
    }
    pub fn emit(&self, event: MirrorEvent) {
        let _ = self.tx.send(event);
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn events_serialize_with_ui_names() {
        let changed = MirrorEvent::RepositoryChanged {
            kind: ChangeKind::Unlink,
            filename: "a.jpg".to_string(),
        };
        let json = serde_json::to_value(&changed).unwrap();
        assert_eq!(json["event"], "repository-changed");
        assert_eq!(json["type"], "unlink");
        let progress = MirrorEvent::SyncProgress(
            SyncProgress::phase(ProgressPhase::Discovery, 50, 120),
        );
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["event"], "sync-progress");
        assert_eq!(json["phase"], "discovery");
        assert!(json.get("synced").is_none());
    }
    #[tokio::test]
    async fn bus_delivers_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(MirrorEvent::SyncStarted);
        bus.emit(MirrorEvent::SyncCompleted(SyncCompletion::failed("Aborted")));
        assert_eq!(rx.recv().await.unwrap(), MirrorEvent::SyncStarted);
        match rx.recv().await.unwrap() {
            MirrorEvent::SyncCompleted(done) => {
                assert!(! done.success);
                assert_eq!(done.error.as_deref(), Some("Aborted"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
