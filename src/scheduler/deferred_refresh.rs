//! Delayed, cancellable follow-up work
//!
//! After a refresh job finishes the backend needs a moment before its status
//! file reflects the new state, so the controller re-reads status after a
//! short delay. The delay runs as a tokio task bound to the owner's lifetime:
//! scheduling again replaces the pending task, and `shutdown` (or drop)
//! cancels whatever is still waiting.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct Pending {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of at most one pending delayed task
pub struct DeferredTask {
    name: &'static str,
    shutdown: CancellationToken,
    pending: Mutex<Option<Pending>>,
}

impl DeferredTask {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            shutdown: CancellationToken::new(),
            pending: Mutex::new(None),
        }
    }

    /// Run `job` after `delay` unless cancelled first.
    ///
    /// Must be called from within a tokio runtime. Does nothing after
    /// `shutdown`.
    pub fn schedule<F, Fut>(&self, delay: Duration, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.shutdown.is_cancelled() {
            debug!("{} not scheduled: owner shut down", self.name);
            return;
        }

        let token = self.shutdown.child_token();
        let cancelled = token.clone();
        let name = self.name;

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    debug!("{} cancelled before it ran", name);
                }
                _ = tokio::time::sleep(delay) => {
                    debug!("{} running", name);
                    job().await;
                }
            }
        });

        let previous = self.pending.lock().replace(Pending { token, handle });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        debug!("{} scheduled in {:?}", self.name, delay);
    }

    /// Whether a scheduled task has not finished yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Cancel the pending task and refuse new ones
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.pending.lock().take();
    }
}

impl Drop for DeferredTask {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
