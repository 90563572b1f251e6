//! Marshalling work onto the host's UI-affinity thread
//!
//! The bridge never calls back into the host from a native or worker thread.
//! Results and events are wrapped in a [`Task`] and handed to a
//! [`UiDispatcher`], which runs tasks one at a time in submission order.

use engagebridge_core::{BridgeError, BridgeResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc;

/// Unit of work to run on the UI thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Executor bound to the host's UI thread
///
/// Implementations must run tasks in the order they were dispatched.
pub trait UiDispatcher: Send + Sync {
    /// Queue `task` for execution on the UI thread
    fn dispatch(&self, task: Task);
}

/// Shared dispatcher handle
pub type SharedDispatcher = Arc<dyn UiDispatcher>;

fn run_task(task: Task) {
    if catch_unwind(AssertUnwindSafe(task)).is_err() {
        tracing::error!("UI task panicked");
    }
}

/// Dispatcher backed by a dedicated thread draining a FIFO queue
///
/// Dispatch always enqueues, even when called from the UI thread itself, so
/// tasks never overtake each other.
pub struct UiThread {
    sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl UiThread {
    /// Spawn the UI thread
    pub fn spawn(name: impl Into<String>) -> BridgeResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();

        let worker = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                while let Some(task) = receiver.blocking_recv() {
                    run_task(task);
                }
                tracing::debug!("UI thread queue closed");
            })
            .map_err(|e| BridgeError::RuntimeError(format!("failed to spawn UI thread: {}", e)))?;

        let thread_id = worker.thread().id();

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            thread_id,
        })
    }

    /// Check whether the caller is running on the UI thread
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stop accepting tasks and wait for the queue to drain
    ///
    /// Idempotent. Must not be called from the UI thread itself.
    pub fn shutdown(&self) {
        self.sender.lock().take();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if self.is_current() {
                tracing::warn!("UiThread::shutdown called from the UI thread, not joining");
                return;
            }
            if worker.join().is_err() {
                tracing::error!("UI thread terminated abnormally");
            }
        }
    }
}

impl UiDispatcher for UiThread {
    fn dispatch(&self, task: Task) {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(task).is_err() {
                    tracing::warn!("UI thread gone, task dropped");
                }
            }
            None => tracing::warn!("UI thread shut down, task dropped"),
        }
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Dispatcher that runs each task inline on the calling thread
///
/// Intended for tests and single-threaded hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatcher;

impl UiDispatcher for ImmediateDispatcher {
    fn dispatch(&self, task: Task) {
        run_task(task);
    }
}

/// Dispatcher that holds tasks until the owner drains them
///
/// Lets tests observe that work was queued rather than run inline.
#[derive(Default)]
pub struct ManualDispatcher {
    queue: Mutex<VecDeque<Task>>,
}

impl ManualDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks in order, including tasks queued while draining
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.queue.lock().pop_front();
            match next {
                Some(task) => {
                    run_task(task);
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl UiDispatcher for ManualDispatcher {
    fn dispatch(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}

#[cfg(test)]
#[path = "dispatcher/dispatcher_tests.rs"]
mod dispatcher_tests;
