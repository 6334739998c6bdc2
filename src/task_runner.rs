//! Injected "post to a task runner" capability.
//!
//! Several components (the bandwidth meter, the manifest fetcher) must never
//! invoke a caller-supplied callback inline from a worker thread/task — the
//! embedder's callback may touch UI state or other single-threaded-affinity
//! data. Both components take an `Arc<dyn TaskRunner>` and post a boxed
//! closure to it instead of calling the listener directly.
pub trait TaskRunner: Send + Sync {
    fn post(&self, task: Box<dyn FnOnce() + Send>);
}

/// A `TaskRunner` that spawns each posted task onto a Tokio runtime handle.
/// The natural choice for an async embedder; a synchronous embedder can
/// implement `TaskRunner` itself (e.g. pushing onto an event-loop queue).
pub struct TokioTaskRunner {
    handle: tokio::runtime::Handle,
}

impl TokioTaskRunner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        TokioTaskRunner { handle }
    }

    pub fn current() -> Self {
        TokioTaskRunner { handle: tokio::runtime::Handle::current() }
    }
}

impl TaskRunner for TokioTaskRunner {
    fn post(&self, task: Box<dyn FnOnce() + Send>) {
        self.handle.spawn_blocking(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn posts_onto_runtime() {
        let runner = TokioTaskRunner::current();
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = ran.clone();
        runner.post(Box::new(move || ran2.store(true, Ordering::SeqCst)));
        // Give the spawned blocking task a chance to run.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
