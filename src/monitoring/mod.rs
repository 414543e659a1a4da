pub mod activity;
pub mod events;
pub use activity::{ActivityLog, LogActivity};
pub use events::{
    ChangeKind, EventBus, MirrorEvent, ProgressPhase, SyncCompletion, SyncProgress,
};
