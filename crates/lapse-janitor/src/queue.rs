//! Bounded-concurrency task queue
//!
//! Items are pushed onto an unbounded channel and drained by a fixed number of
//! worker tasks, so at most `width` items are ever being processed at once no
//! matter how many are queued. Pushing never blocks.

use crate::JanitorError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};

/// Fixed-width worker pool reading from a FIFO queue
pub struct TaskQueue<T> {
    name: &'static str,
    width: usize,
    sender: mpsc::UnboundedSender<T>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl<T: Send + 'static> TaskQueue<T> {
    /// Spawn `width` workers running `handler` for each pushed item
    ///
    /// Must be called from within a tokio runtime. The handler owns its own
    /// failure handling: an item is finished when its future completes.
    pub fn spawn<H, Fut>(name: &'static str, width: usize, handler: H) -> Self
    where
        H: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let width = width.max(1);
        let (sender, receiver) = mpsc::unbounded_channel::<T>();
        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);
        let pending = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(Notify::new());

        for worker in 0..width {
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(&handler);
            let pending = Arc::clone(&pending);
            let idle = Arc::clone(&idle);

            tokio::spawn(async move {
                loop {
                    // Only the receive is done under the lock
                    let item = { receiver.lock().await.recv().await };
                    let Some(item) = item else { break };

                    handler(item).await;

                    if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                        idle.notify_waiters();
                    }
                }
                tracing::debug!("{} queue worker {} stopped", name, worker);
            });
        }

        tracing::debug!("{} queue started with {} worker(s)", name, width);

        Self {
            name,
            width,
            sender,
            pending,
            idle,
        }
    }

    /// Queue an item without waiting for it to be processed
    pub fn push(&self, item: T) -> Result<(), JanitorError> {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.sender.send(item).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            JanitorError::Worker(format!("{} queue is closed", self.name))
        })
    }

    /// Number of items queued or being processed
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Maximum number of items processed at once
    pub fn width(&self) -> usize {
        self.width
    }

    /// Queue name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait until every pushed item has been processed
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_processes_every_item() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let queue = TaskQueue::spawn("test", 1, move |n: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(n);
            }
        });

        for n in 0..50 {
            queue.push(n).unwrap();
        }
        queue.wait_idle().await;

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, (0..50).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_respects_width() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        let queue = TaskQueue::spawn("test", 2, move |_: u32| {
            let (active, peak) = (Arc::clone(&a), Arc::clone(&p));
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        });

        for n in 0..20 {
            queue.push(n).unwrap();
        }
        queue.wait_idle().await;

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_on_empty_queue() {
        let queue = TaskQueue::spawn("test", 1, |_: u32| async {});
        queue.wait_idle().await;
        assert_eq!(queue.width(), 1);
        assert_eq!(queue.name(), "test");
    }

    #[tokio::test]
    async fn test_zero_width_is_raised_to_one() {
        let queue = TaskQueue::spawn("test", 0, |_: u32| async {});
        assert_eq!(queue.width(), 1);
        queue.push(1).unwrap();
        queue.wait_idle().await;
    }
}
