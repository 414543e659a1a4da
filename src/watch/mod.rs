pub mod debounce;
pub mod fingerprint;
pub mod poller;
pub mod source;
pub use debounce::Debouncer;
pub use poller::PollReport;
pub use source::{ChangeNotice, ChangeSource, NameFilter, NotifyChangeSource, Subscription};
