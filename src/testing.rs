use crate::{
    config::MirrorSettings, monitoring::{ActivityLog, ChangeKind},
    pipeline::SyncContext,
    watch::{ChangeNotice, ChangeSource, NameFilter, Subscription},
};
use std::{
    fs::OpenOptions, path::Path, sync::{Arc, Mutex},
    time::SystemTime,
};
use tokio::sync::mpsc;
#[derive(Default)]
pub struct RecordingActivity {
    lines: Mutex<Vec<(&'static str, String)>>,
}
impl RecordingActivity {
    fn push(&self, level: &'static str, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}
impl ActivityLog for RecordingActivity {
    fn info(&self, message: &str) {
        self.push("info", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warning(&self, message: &str) {
        self.push("warning", message);
    }
    fn error(&self, message: &str) {
        self.push("error", message);
    }
}
pub fn context_for(repo: &Path, mirror: &Path) -> (SyncContext, Arc<RecordingActivity>) {
    let log = Arc::new(RecordingActivity::default());
    let ctx = SyncContext::new(
        repo.to_path_buf(),
        mirror.to_path_buf(),
        MirrorSettings::default(),
        log.clone(),
    );
    (ctx, log)
}
/// Short debounce, poller effectively off.
pub fn quick_settings() -> MirrorSettings {
    MirrorSettings {
        debounce_ms: 100,
        poll_interval_ms: 3_600_000,
        ..MirrorSettings::default()
    }
}
pub fn set_mtime(path: &Path, when: SystemTime) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(when).unwrap();
}
/// Change source driven by the test instead of the OS.
#[derive(Default)]
pub struct ScriptedChangeSource {
    sender: Mutex<Option<(mpsc::Sender<anyhow::Result<ChangeNotice>>, NameFilter)>>,
}
impl ScriptedChangeSource {
    pub fn emit(&self, kind: ChangeKind, filename: &str) {
        let guard = self.sender.lock().unwrap();
        let (tx, filter) = guard.as_ref().expect("not subscribed");
        if filter(filename) {
            tx.try_send(Ok(ChangeNotice { kind, filename: filename.to_string() })).unwrap();
        }
    }
    pub fn fail(&self, message: &str) {
        let guard = self.sender.lock().unwrap();
        let (tx, _) = guard.as_ref().expect("not subscribed");
        tx.try_send(Err(anyhow::anyhow!(message.to_string()))).unwrap();
    }
}
impl ChangeSource for ScriptedChangeSource {
    fn subscribe(&self, _dir: &Path, filter: NameFilter) -> anyhow::Result<Subscription> {
        let (tx, rx) = mpsc::channel(64);
        *self.sender.lock().unwrap() = Some((tx, filter));
        Ok(Subscription::new(rx, None))
    }
}
/// Change source that cannot subscribe, as on some network mounts.
pub struct UnavailableChangeSource;
impl ChangeSource for UnavailableChangeSource {
    fn subscribe(&self, dir: &Path, _filter: NameFilter) -> anyhow::Result<Subscription> {
        anyhow::bail!("cannot watch {:?}", dir)
    }
}
