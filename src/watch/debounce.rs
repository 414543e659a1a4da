use std::{
    future::Future, sync::{Mutex, PoisonError},
    time::Duration,
};
use tokio::task::JoinHandle;
/// Single-slot delayed trigger. Each [`schedule`](Debouncer::schedule)
/// replaces the pending one, so a burst collapses into one run after the
/// last call.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}
impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}
impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
