// Copyright 2026 The firestore-mobile-core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A single-threaded, FIFO, cooperative task queue.
//!
//! Every state mutation in the streaming client core, and every delegate
//! callback it fires, is expected to run as a job submitted to exactly one
//! [`WorkerQueue`]. The queue itself is realized as a Tokio task draining an
//! unbounded channel: jobs run to completion one at a time, which gives the
//! "no preemption inside a job" guarantee the rest of the core is built on,
//! regardless of which OS thread the async runtime happens to poll the
//! underlying task from.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static CURRENT_QUEUE: QueueId;
}

/// Identifies a [`WorkerQueue`] for the purposes of reentrancy checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueueId(u64);

/// A serial, cooperative executor.
///
/// Cloning a `WorkerQueue` shares the same underlying job channel and
/// background task; all clones are the same logical queue.
#[derive(Clone)]
pub struct WorkerQueue {
    id: QueueId,
    sender: mpsc::UnboundedSender<Job>,
}

impl WorkerQueue {
    /// Spawns the background task that drains jobs and returns a handle to
    /// it.
    pub fn new() -> Self {
        let id = QueueId(NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed));
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(CURRENT_QUEUE.scope(id, async move {
            while let Some(job) = receiver.recv().await {
                job();
            }
        }));

        Self { id, sender }
    }

    /// Enqueues `job` to run after everything already queued.
    ///
    /// Panics if called from a job already running on this same queue; use
    /// [`WorkerQueue::dispatch_async_allowing_same_queue`] there instead.
    pub fn dispatch_async(&self, job: impl FnOnce() + Send + 'static) {
        let reentrant = CURRENT_QUEUE.try_with(|current| *current == self.id).unwrap_or(false);
        assert!(
            !reentrant,
            "dispatch_async called re-entrantly on the same worker queue; \
             use dispatch_async_allowing_same_queue"
        );
        self.dispatch_async_allowing_same_queue(job);
    }

    /// Enqueues `job`, tolerating the case where the caller is itself
    /// currently executing a job on this queue. The job still only runs
    /// after the current one returns; there is no synchronous reentry.
    pub fn dispatch_async_allowing_same_queue(&self, job: impl FnOnce() + Send + 'static) {
        // The receiver only goes away when the queue itself is dropped; a
        // send failing here means every handle to this queue, including the
        // background task, is gone, so there is nothing useful to do with
        // the job.
        let _ = self.sender.send(Box::new(job));
    }

    /// Enqueues `job` to run after `delay` has elapsed, returning a handle
    /// that can cancel it before it fires.
    pub fn dispatch_after(&self, delay: Duration, job: impl FnOnce() + Send + 'static) -> DelayedTask {
        let queue = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.dispatch_async_allowing_same_queue(job);
        });
        DelayedTask {
            abort: handle.abort_handle(),
        }
    }

    /// Asserts that the current job is executing on this queue. Intended to
    /// be the first line of every state-sensitive method.
    pub fn verify_is_current_queue(&self) {
        let on_queue = CURRENT_QUEUE.try_with(|current| *current == self.id).unwrap_or(false);
        assert!(on_queue, "called off the expected worker queue");
    }
}

impl Default for WorkerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerQueue").field("id", &self.id.0).finish()
    }
}

/// A handle to a job scheduled with [`WorkerQueue::dispatch_after`].
///
/// Dropping the handle does not cancel the job; call [`DelayedTask::cancel`]
/// explicitly.
pub struct DelayedTask {
    abort: AbortHandle,
}

impl DelayedTask {
    /// Cancels the task if it has not already fired.
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

/// A boxed future, used where the worker queue needs to await something
/// before enqueuing a follow-up job (e.g. token acquisition).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Spawns `future` on the async runtime and, once it resolves, submits
/// `continuation` to `queue`. This is the standard way a job that needs to
/// await a foreign future (credentials, a transport handshake) hands control
/// back to the queue, per the "marshal back via dispatch_async" rule.
pub fn spawn_then_dispatch<T, F>(queue: Arc<WorkerQueue>, future: F, continuation: impl FnOnce(T) + Send + 'static)
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    tokio::spawn(async move {
        let value = future.await;
        queue.dispatch_async_allowing_same_queue(move || continuation(value));
    });
}
