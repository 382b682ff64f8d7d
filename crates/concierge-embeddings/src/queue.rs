//! Single-flight inference queue.
//!
//! The local model runtime cannot safely service concurrent invocations,
//! so every encoder and answer-model call funnels through this queue: a
//! strict FIFO that runs one task to settlement before starting the next.
//! A failing task surfaces its error to its own caller only; queued
//! successors still run. There is no priority and no cancellation, so a
//! hung task blocks the queue until it resolves.

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::QueueError;

type QueuedJob = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// FIFO executor with at most one in-flight task.
pub struct InferenceQueue {
    tx: mpsc::UnboundedSender<QueuedJob>,
}

impl InferenceQueue {
    /// Create the queue and spawn its worker.
    ///
    /// Must be called within a tokio runtime. The worker exits when the
    /// queue handle (and all clones of the sender) are dropped.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                // One at a time, to settlement
                job().await;
            }
            debug!("Inference queue worker stopped");
        });

        Self { tx }
    }

    /// Run a task after every previously submitted task has settled.
    ///
    /// The task's output (including an error output) is handed back to
    /// this caller; it never affects other queued tasks.
    pub async fn run<F, Fut, T>(&self, task: F) -> Result<T, QueueError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();

        let job: QueuedJob = Box::new(move || {
            Box::pin(async move {
                let value = task().await;
                // Receiver may have given up waiting; the slot still ran
                let _ = done_tx.send(value);
            })
        });

        self.tx.send(job).map_err(|_| QueueError::Closed)?;
        done_rx.await.map_err(|_| QueueError::Closed)
    }
}

impl Default for InferenceQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_tasks_complete_in_submission_order() {
        let queue = InferenceQueue::new();
        let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        // A is slowest, C fastest; completion order must still be A, B, C
        let log_a = log.clone();
        let a = queue.run(move || async move {
            sleep(Duration::from_millis(50)).await;
            log_a.lock().unwrap().push("a");
        });
        let log_b = log.clone();
        let b = queue.run(move || async move {
            sleep(Duration::from_millis(10)).await;
            log_b.lock().unwrap().push("b");
        });
        let log_c = log.clone();
        let c = queue.run(move || async move {
            log_c.lock().unwrap().push("c");
        });

        let (ra, rb, rc) = tokio::join!(a, b, c);
        ra.unwrap();
        rb.unwrap();
        rc.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_no_task_starts_before_predecessor_settles() {
        let queue = InferenceQueue::new();
        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for index in 0..3 {
            let events = events.clone();
            handles.push(queue.run(move || async move {
                events.lock().unwrap().push(format!("start-{index}"));
                sleep(Duration::from_millis(15)).await;
                events.lock().unwrap().push(format!("end-{index}"));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let observed = events.lock().unwrap().clone();
        assert_eq!(
            observed,
            vec!["start-0", "end-0", "start-1", "end-1", "start-2", "end-2"]
        );
    }

    #[tokio::test]
    async fn test_failing_task_does_not_abort_successors() {
        let queue = InferenceQueue::new();

        let failed: Result<Result<(), String>, QueueError> = queue
            .run(|| async { Err("inference exploded".to_string()) })
            .await;
        assert!(failed.unwrap().is_err());

        let ok = queue.run(|| async { 41 + 1 }).await.unwrap();
        assert_eq!(ok, 42);
    }

    #[tokio::test]
    async fn test_queue_returns_task_value() {
        let queue = InferenceQueue::new();
        let value = queue.run(|| async { "embedding".to_string() }).await.unwrap();
        assert_eq!(value, "embedding");
    }
}
