use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// One-shot, edge-triggered signal fired exactly once when a node finishes.
///
/// Cloning shares the same underlying signal: the factory hands a clone to
/// both the node itself (to fire) and the bookkeeping worker that waits on
/// it (`spec.md` §4.4, §4.6).
#[derive(Debug, Clone)]
pub struct StoppedEvent {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Default for StoppedEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl StoppedEvent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    /// Fires the event. Idempotent: firing an already-fired event is a
    /// no-op, matching "No transitions out of Finished".
    pub fn fire(&self) {
        let (lock, cvar) = &*self.inner;
        let mut fired = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !*fired {
            *fired = true;
            cvar.notify_all();
        }
    }

    #[must_use]
    pub fn is_fired(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Blocks the calling thread until the event fires.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut fired = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        while !*fired {
            fired = cvar
                .wait(fired)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    /// Blocks with a timeout, returning whether the event had fired.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let fired = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if *fired {
            return true;
        }
        let (fired, _) = cvar
            .wait_timeout(fired, timeout)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *fired
    }
}
