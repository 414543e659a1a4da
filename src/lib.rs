//! Local mirror of a photo repository that may live on slow or unreliable
//! storage.
//!
//! [`MirrorEngine`] copies every `.jpg`/`.jpeg` file of the repository
//! directory into a local mirror directory and keeps it current through
//! native change notifications, a periodic sampling poller and on-demand
//! passes. Replication is one-way (repository → mirror) and best effort.
use std::{fs::Metadata, path::Path, time::UNIX_EPOCH};
pub mod config;
pub mod engine;
pub mod errors;
pub mod index;
pub mod monitoring;
pub mod pipeline;
pub mod watch;
#[cfg(test)]
pub(crate) mod testing;
pub use config::MirrorSettings;
pub use engine::{EngineStats, MirrorEngine, SyncPhase};
pub use errors::{ErrorCode, MirrorError};
pub use index::{MirrorEntry, MirrorIndex};
pub use monitoring::{
    ActivityLog, ChangeKind, LogActivity, MirrorEvent, ProgressPhase, SyncCompletion,
    SyncProgress,
};
pub use watch::{ChangeNotice, ChangeSource, NotifyChangeSource, PollReport, Subscription};
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];
/// True for filenames the engine discovers, watches and mirrors.
pub fn is_accepted(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.iter().any(|accepted| ext.eq_ignore_ascii_case(accepted)))
        .unwrap_or(false)
}
/// Case-insensitive lookup key for a filename.
pub fn mirror_key(filename: &str) -> String {
    filename.to_lowercase()
}
/// Modification time in whole milliseconds since the epoch, 0 if unknown.
pub fn modified_millis(meta: &Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
