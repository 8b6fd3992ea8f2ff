//! Bounded worker pool for concurrent per-item work.
//!
//! A pool owns a fixed number of long-lived Tokio tasks that pull from one bounded
//! task queue and push into one bounded result queue. It is meant to be used
//! stack-like within a single request:
//!
//! ```text
//! new(workers, capacity, handler)
//!     → post_task × k → finish_posting → get_result × k → close
//! ```
//!
//! Results come back in completion order, so tasks should carry whatever identity
//! the caller needs to re-associate them. There is no per-task timeout or
//! cancellation: a stuck handler stalls its worker and therefore the caller's drain.
//! A handler panic is re-raised in the caller by [`WorkerPool::close`].

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default number of workers per pool.
pub const DEFAULT_WORKERS: usize = 8;

/// Task handler function type.
pub type TaskHandler<T, R> = Arc<dyn Fn(T) -> BoxFuture<'static, R> + Send + Sync>;

/// Fixed-size pool of workers applying one handler to posted tasks.
pub struct WorkerPool<T, R> {
    tasks: Option<mpsc::Sender<T>>,
    results: mpsc::Receiver<R>,
    workers: Vec<JoinHandle<()>>,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Starts `workers` workers with task and result queues of `capacity` slots each.
    ///
    /// Both queues are bounded: a caller that posts more than `capacity` tasks
    /// before draining any result can block forever once both queues fill up.
    /// Size `capacity` to the batch when using the fill-then-drain pattern.
    pub fn new<F>(workers: usize, capacity: usize, handler: F) -> Self
    where
        F: Fn(T) -> BoxFuture<'static, R> + Send + Sync + 'static,
    {
        let workers = workers.max(1);
        let capacity = capacity.max(1);
        let (task_tx, task_rx) = mpsc::channel::<T>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<R>(capacity);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let handler: TaskHandler<T, R> = Arc::new(handler);

        let handles = (0..workers)
            .map(|worker| {
                let task_rx = Arc::clone(&task_rx);
                let result_tx = result_tx.clone();
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    loop {
                        let next = task_rx.lock().await.recv().await;
                        let Some(task) = next else { break };
                        let result = handler(task).await;
                        if result_tx.send(result).await.is_err() {
                            debug!(worker, "Result queue closed, worker exiting");
                            break;
                        }
                    }
                    debug!(worker, "Worker stopped");
                })
            })
            .collect();

        Self {
            tasks: Some(task_tx),
            results: result_rx,
            workers: handles,
        }
    }

    /// Enqueues one task, waiting for room when the task queue is full.
    ///
    /// # Panics
    ///
    /// Panics if every worker has already exited, which only happens when a
    /// handler panicked, or if [`finish_posting`](Self::finish_posting) was
    /// already called. Both are bugs in the caller.
    pub async fn post_task(&self, task: T) {
        let Some(tasks) = &self.tasks else {
            panic!("task posted to a worker pool after posting finished");
        };
        if tasks.send(task).await.is_err() {
            panic!("task posted to a worker pool with no live workers");
        }
    }

    /// Closes the task queue. Workers exit once the queued tasks are done,
    /// so [`get_result`](Self::get_result) ends with `None` even when a
    /// handler panicked and some results will never arrive.
    pub fn finish_posting(&mut self) {
        self.tasks = None;
    }

    /// Waits for the next finished result, in completion order.
    ///
    /// Returns `None` only once every worker has exited and the queue is empty.
    pub async fn get_result(&mut self) -> Option<R> {
        self.results.recv().await
    }

    /// Stops the pool and waits for every worker to exit.
    ///
    /// Workers finish the task they are running; results that were never
    /// retrieved are dropped with the queue.
    ///
    /// # Panics
    ///
    /// Resumes the first handler panic seen among the workers.
    pub async fn close(self) {
        let Self {
            tasks,
            results,
            workers,
        } = self;
        drop(tasks);
        drop(results);
        let mut panic = None;
        for handle in workers {
            match handle.await {
                Ok(()) => {}
                Err(e) if e.is_panic() => {
                    warn!("Worker panicked: {}", e);
                    if panic.is_none() {
                        panic = Some(e.into_panic());
                    }
                }
                Err(e) => warn!("Worker task failed: {}", e),
            }
        }
        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }
    }

    /// Runs `handler` over every item using a fresh pool of `workers` workers.
    ///
    /// This is the whole create → fill → drain → close cycle. The output holds one
    /// result per input, in completion order. A panicking handler panics the
    /// caller once the remaining tasks have drained.
    pub async fn process_all<F>(workers: usize, items: Vec<T>, handler: F) -> Vec<R>
    where
        F: Fn(T) -> BoxFuture<'static, R> + Send + Sync + 'static,
    {
        let expected = items.len();
        if expected == 0 {
            return Vec::new();
        }

        let mut pool = Self::new(workers.min(expected), expected, handler);
        for item in items {
            pool.post_task(item).await;
        }
        pool.finish_posting();

        let mut results = Vec::with_capacity(expected);
        while results.len() < expected {
            match pool.get_result().await {
                Some(result) => results.push(result),
                None => break,
            }
        }
        if results.len() < expected {
            warn!(
                expected,
                received = results.len(),
                "Worker pool lost results"
            );
        }
        pool.close().await;
        results
    }
}

impl<T, R> std::fmt::Debug for WorkerPool<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}
