//! FIFO task queue shared between the producer and the download workers.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

use crate::error::{Error, Result};
use crate::types::Task;

/// Queue contents and the producer flag, guarded together
#[derive(Debug, Default)]
struct QueueState {
    tasks: VecDeque<Task>,
    /// Set once by the producer; no task may be pushed afterwards
    producer_done: bool,
}

/// Thread-safe FIFO of pending tasks with a "no more work" signal
///
/// Workers call [`pop`](TaskQueue::pop) in a loop. It waits while the queue is
/// empty and open, and returns `None` once the producer has called
/// [`mark_done`](TaskQueue::mark_done) and every task has been handed out.
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl TaskQueue {
    /// Create an empty, open queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task and wake one waiting worker
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if [`mark_done`](TaskQueue::mark_done) was already called.
    pub async fn push(&self, task: Task) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.producer_done {
                return Err(Error::QueueClosed);
            }
            state.tasks.push_back(task);
        }

        self.notify.notify_one();
        Ok(())
    }

    /// Signal that no more tasks will be pushed and wake every waiting worker
    ///
    /// Returns `true` for the call that closed the queue, `false` if it was already closed.
    pub async fn mark_done(&self) -> bool {
        let transitioned = {
            let mut state = self.state.lock().await;
            !std::mem::replace(&mut state.producer_done, true)
        };

        self.notify.notify_waiters();
        transitioned
    }

    /// Take the task at the head of the queue, waiting while the queue is empty
    ///
    /// Returns `None` when the queue is empty and closed.
    pub async fn pop(&self) -> Option<Task> {
        loop {
            // Register for wake-ups before looking at the state so a push or
            // mark_done between the check and the await is not missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if let Some(task) = state.tasks.pop_front() {
                    // Pass the wake-up along while work remains
                    if !state.tasks.is_empty() {
                        self.notify.notify_one();
                    }
                    return Some(task);
                }
                if state.producer_done {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Number of tasks waiting to be picked up
    pub async fn len(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    /// Whether no tasks are waiting
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.tasks.is_empty()
    }

    /// Whether the producer has closed the queue
    pub async fn is_done(&self) -> bool {
        self.state.lock().await.producer_done
    }
}
