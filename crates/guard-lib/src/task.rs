//! Spawned tasks tied to the lifetime of their owner

use std::future::Future;
use tokio::task::JoinHandle;

/// Handle to a spawned task that aborts the task when dropped
#[derive(Debug)]
pub struct ScopedTask {
    handle: Option<JoinHandle<()>>,
}

impl ScopedTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    /// True once the task has run to completion or been aborted
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Release the task without aborting it. Used by a task clearing its
    /// own handle.
    pub fn detach(mut self) {
        self.handle.take();
    }

    /// Abort and wait for the task to wind down
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for ScopedTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
