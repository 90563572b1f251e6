//! Cancellation of in-flight native operations
//!
//! The [`AsyncRuntime`](crate::AsyncRuntime) owns one [`ShutdownHandle`].
//! Operations it runs are counted until they finish and may race their work
//! against a [`ShutdownSignal`]. On shutdown the handle cancels them and waits
//! for the count to drain, so a cancelled inbox fetch still gets to answer its
//! Dart caller before the workers are torn down.

use parking_lot::{Condvar, Mutex};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    drained: Condvar,
}

/// Owner side of the cancellation signal
#[derive(Clone)]
pub struct ShutdownHandle {
    cancelled: Arc<watch::Sender<bool>>,
    in_flight: Arc<InFlight>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
            in_flight: Arc::default(),
        }
    }

    /// Cancel every current and future operation
    ///
    /// Returns `true` only for the call that flipped the signal.
    pub fn trigger(&self) -> bool {
        !self.cancelled.send_replace(true)
    }

    pub fn is_triggered(&self) -> bool {
        *self.cancelled.borrow()
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            cancelled: self.cancelled.subscribe(),
        }
    }

    /// Count `future` as in flight from now until it completes or is dropped
    pub fn track<F: Future>(&self, future: F) -> impl Future<Output = F::Output> + use<F> {
        let guard = InFlightGuard::enter(self.in_flight.clone());
        async move {
            let output = future.await;
            drop(guard);
            output
        }
    }

    /// Number of tracked operations that have not finished
    pub fn in_flight(&self) -> usize {
        *self.in_flight.count.lock()
    }

    /// Block until every tracked operation finished or `timeout` elapsed
    ///
    /// Returns whether the count drained.
    pub fn wait_drained(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.in_flight.count.lock();
        while *count > 0 {
            if self
                .in_flight
                .drained
                .wait_until(&mut count, deadline)
                .timed_out()
            {
                return *count == 0;
            }
        }
        true
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn enter(in_flight: Arc<InFlight>) -> Self {
        *in_flight.count.lock() += 1;
        Self(in_flight)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock();
        *count -= 1;
        if *count == 0 {
            self.0.drained.notify_all();
        }
    }
}

/// Receiver side handed to each operation
#[derive(Clone)]
pub struct ShutdownSignal {
    cancelled: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Drive `future` unless the runtime is cancelled first
    ///
    /// `None` means the work was abandoned; a signal already triggered never
    /// polls the future at all. A dropped handle counts as cancelled.
    pub async fn run_until_shutdown<F: Future>(mut self, future: F) -> Option<F::Output> {
        if self.is_triggered() {
            return None;
        }
        tokio::select! {
            output = future => Some(output),
            () = self.wait_cancelled() => None,
        }
    }

    async fn wait_cancelled(&mut self) {
        // An error means the handle is gone, which only happens on teardown.
        let _ = self.cancelled.wait_for(|cancelled| *cancelled).await;
    }
}
