use log::{error, info, warn};
/// Receiver for human-readable engine activity. The display layer decides
/// how (and whether) to surface these lines.
pub trait ActivityLog: Send + Sync {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}
/// Forwards activity to the `log` facade.
pub struct LogActivity;
impl ActivityLog for LogActivity {
    fn info(&self, message: &str) {
        info!("{}", message);
    }
    fn success(&self, message: &str) {
        info!("✓ {}", message);
    }
    fn warning(&self, message: &str) {
        warn!("{}", message);
    }
    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
