//! Tokio runtime management

use crate::shutdown::{ShutdownHandle, ShutdownSignal};
use engagebridge_core::{BridgeError, BridgeResult};
use parking_lot::Mutex;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

/// Configuration for the async runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (None = number of CPU cores)
    pub worker_threads: Option<usize>,
    /// Name prefix for worker threads
    pub thread_name: String,
    /// Maximum blocking threads
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: Some(2),
            thread_name: "engagebridge-worker".to_string(),
            max_blocking_threads: 16,
        }
    }
}

impl RuntimeConfig {
    /// Create a new runtime configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set the thread name prefix
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Tokio runtime used for asynchronous native operations
///
/// Inbox fetches run here; their completions are marshalled back to the UI
/// thread by the caller. After [`AsyncRuntime::shutdown`] no new work is
/// accepted, tasks waiting on a [`ShutdownSignal`] are released, and spawned
/// tasks get until the timeout to finish before the workers stop.
pub struct AsyncRuntime {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    shutdown_handle: ShutdownHandle,
    config: RuntimeConfig,
}

impl AsyncRuntime {
    /// Create a new async runtime with the given configuration
    pub fn new(config: RuntimeConfig) -> BridgeResult<Self> {
        let mut builder = Builder::new_multi_thread();

        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        builder
            .thread_name(&config.thread_name)
            .max_blocking_threads(config.max_blocking_threads)
            .enable_all();

        let runtime = builder
            .build()
            .map_err(|e| BridgeError::RuntimeError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            shutdown_handle: ShutdownHandle::new(),
            config,
        })
    }

    /// Create a runtime with default configuration
    pub fn with_defaults() -> BridgeResult<Self> {
        Self::new(RuntimeConfig::default())
    }

    /// Get the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Get a handle to the underlying Tokio runtime
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Get a shutdown signal that can be used to detect shutdown
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown_handle.signal()
    }

    /// Block on a future from a sync context
    ///
    /// Must not be called from within the runtime or from the UI thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }

    /// Spawn a task on the runtime
    ///
    /// Fails once shutdown has started.
    pub fn spawn<F>(&self, future: F) -> BridgeResult<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if self.is_shutting_down() {
            return Err(BridgeError::RuntimeError(
                "Runtime is shutting down".to_string(),
            ));
        }
        Ok(self.handle.spawn(self.shutdown_handle.track(future)))
    }

    /// Initiate shutdown and wait up to `timeout` for running tasks
    ///
    /// Cancelled tasks run to completion first so their callers get an
    /// answer. Idempotent; later calls return immediately. Must not be called
    /// from a runtime worker.
    pub fn shutdown(&self, timeout: Duration) {
        self.shutdown_handle.trigger();

        let runtime = self.runtime.lock().take();
        if let Some(runtime) = runtime {
            tracing::info!("Shutting down async runtime with timeout {:?}", timeout);
            let started = Instant::now();
            if !self.shutdown_handle.wait_drained(timeout) {
                tracing::warn!(
                    in_flight = self.shutdown_handle.in_flight(),
                    "tasks still running at shutdown deadline"
                );
            }
            runtime.shutdown_timeout(timeout.saturating_sub(started.elapsed()));
            tracing::info!("Async runtime shutdown complete");
        }
    }

    /// Check if shutdown has been triggered
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_handle.is_triggered()
    }
}

impl Drop for AsyncRuntime {
    fn drop(&mut self) {
        self.shutdown_handle.trigger();
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}
