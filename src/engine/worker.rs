//! Request/response worker (C9): a single dedicated OS thread owns the process-wide
//! [`Environment`] and [`HandleManager`] and is the only thread that ever touches them directly.
//! Every public operation is submitted as a job over an [`mpsc::Sender`] and answered on a
//! per-request reply channel, correlated by a monotonically increasing request id (spec.md §4.9).

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::Environment;

use super::error::EngineError;
use super::handle_manager::HandleManager;

/// Default per-request timeout applied when a caller does not override it (spec.md §4.9).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type JobResult = Result<Box<dyn Any + Send>, EngineError>;
type Job = Box<dyn FnOnce(&'static Environment, &HandleManager) -> JobResult + Send>;

struct WorkerRequest {
    request_id: u64,
    reply: mpsc::Sender<JobResult>,
    job: Job,
}

/// A running worker. Dropping it closes the request channel, causing the worker thread's receive
/// loop to exit, and joins the thread.
pub struct Worker {
    next_request_id: AtomicU64,
    requests: Option<mpsc::Sender<WorkerRequest>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns the worker thread. The thread allocates the single process-wide ODBC environment
    /// and a fresh [`HandleManager`]; both live exclusively on this thread for the worker's
    /// lifetime (spec.md §4.9, §9 "Global state").
    ///
    /// # Safety
    ///
    /// At most one [`Worker`] may exist per process, for the same reason
    /// [`Environment::new`] is unsafe: a second ODBC environment allocated concurrently
    /// violates the driver manager's one-environment-per-process contract.
    pub unsafe fn spawn() -> Result<Self, EngineError> {
        let (tx, rx) = mpsc::channel::<WorkerRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), EngineError>>();

        let thread = std::thread::spawn(move || {
            let environment = match unsafe { Environment::new() } {
                Ok(env) => env,
                Err(err) => {
                    let _ = ready_tx.send(Err(EngineError::from(err)));
                    return;
                }
            };
            // Leaked once per process, for the worker thread's entire life: `Pool` (C3) stores
            // `&'static Environment` so pools can outlive any single request (see
            // `src/engine/pool.rs`), the same "one environment lives for the process" contract
            // `Environment::new`'s own safety doc describes.
            let environment: &'static Environment = Box::leak(Box::new(environment));
            let handles = HandleManager::new();
            let _ = ready_tx.send(Ok(()));

            for request in rx {
                let WorkerRequest {
                    request_id,
                    reply,
                    job,
                } = request;
                let result = match panic::catch_unwind(AssertUnwindSafe(|| job(environment, &handles))) {
                    Ok(result) => result,
                    Err(payload) => {
                        let err = EngineError::worker_panicked(&*payload);
                        log::error!("request {request_id} panicked: {}", err.message);
                        Err(err)
                    }
                };
                // A `SendError` here just means the caller already timed out and dropped its
                // receiver; mpsc gives us "late response is dropped" for free.
                if reply.send(result).is_err() {
                    log::warn!("worker reply for request {request_id} dropped, caller already gone");
                }
            }
            log::warn!("request/response worker thread terminating");
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Worker {
                next_request_id: AtomicU64::new(1),
                requests: Some(tx),
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(EngineError::worker_terminated())
            }
        }
    }

    /// Submits `job` to the worker thread and blocks for up to `timeout` (default 30s, `None`
    /// disables the bound) waiting for its reply. On timeout the request id is simply forgotten
    /// here; the worker keeps processing and its eventual late reply is dropped on send.
    pub fn submit<T, F>(&self, timeout: Option<Duration>, job: F) -> Result<T, EngineError>
    where
        T: Send + 'static,
        F: FnOnce(&'static Environment, &HandleManager) -> Result<T, EngineError> + Send + 'static,
    {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = mpsc::channel();
        let boxed_job: Job = Box::new(move |env, handles| {
            job(env, handles).map(|value| Box::new(value) as Box<dyn Any + Send>)
        });
        let request = WorkerRequest {
            request_id,
            reply: reply_tx,
            job: boxed_job,
        };

        let requests = self
            .requests
            .as_ref()
            .ok_or_else(EngineError::worker_terminated)?;
        requests
            .send(request)
            .map_err(|_| EngineError::worker_terminated())?;

        let outcome = match timeout {
            Some(duration) => reply_rx.recv_timeout(duration).map_err(|err| match err {
                RecvTimeoutError::Timeout => {
                    log::warn!("request {request_id} timed out after {duration:?}");
                    EngineError::request_timeout(request_id)
                }
                RecvTimeoutError::Disconnected => EngineError::worker_terminated(),
            }),
            None => reply_rx.recv().map_err(|_| EngineError::worker_terminated()),
        }?;

        let boxed = outcome?;
        Ok(*boxed
            .downcast::<T>()
            .expect("worker job result type mismatch"))
    }

    /// Per-statement cancellation is not guaranteed by every driver; this revision always returns
    /// `UnsupportedFeature`, reserving the error code for a future background-execution path
    /// (spec.md §4.9, §8 Open Questions).
    pub fn cancel(&self, _statement_id: u64) -> Result<(), EngineError> {
        Err(EngineError::unsupported_feature(
            "Statement cancellation is not supported in this revision; use a query timeout.",
        ))
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
