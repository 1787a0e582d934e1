//! Background execution of storage calls for a single-threaded UI loop.
//!
//! # Responsibility
//! - Run one blocking `RecipeService` call per short-lived worker thread.
//! - Hand results back to the rendering thread through a completion queue.
//!
//! # Invariants
//! - At most one service call is in flight; workers serialize on the lock.
//! - Completion callbacks run only on the thread that drains the queue.
//! - A worker that panicked does not make the service unusable.

use crate::service::recipe_service::RecipeService;
use log::{debug, warn};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

type Completion = Box<dyn FnOnce() + Send + 'static>;

static WORKER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Queue of finished-work callbacks, owned by the rendering thread.
pub struct CompletionQueue {
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl Default for CompletionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Returns a handle that workers use to post callbacks.
    pub fn sender(&self) -> CompletionSender {
        CompletionSender {
            sender: self.sender.clone(),
        }
    }

    /// Runs every callback already queued without blocking.
    ///
    /// Returns how many callbacks ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.receiver.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }

    /// Blocks up to `timeout` for one callback and runs it.
    ///
    /// Returns `false` when nothing arrived in time.
    pub fn wait_one(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(callback) => {
                callback();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// Cloneable posting side of a [`CompletionQueue`].
#[derive(Clone)]
pub struct CompletionSender {
    sender: Sender<Completion>,
}

impl CompletionSender {
    /// Queues `callback` for the rendering thread.
    ///
    /// Returns `false` when the queue was dropped.
    pub fn post(&self, callback: impl FnOnce() + Send + 'static) -> bool {
        self.sender.send(Box::new(callback)).is_ok()
    }
}

/// Cloneable handle that serializes access to one [`RecipeService`].
#[derive(Clone)]
pub struct SharedRecipeService {
    inner: Arc<Mutex<RecipeService>>,
}

impl SharedRecipeService {
    pub fn new(service: RecipeService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Runs `job` on the calling thread while holding the service lock.
    pub fn with_service<T>(&self, job: impl FnOnce(&mut RecipeService) -> T) -> T {
        let mut guard = self.lock();
        job(&mut *guard)
    }

    /// Runs `job` on a new worker thread and posts `on_complete(result)` to
    /// `completions` when it finishes.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned; neither
    ///   `job` nor `on_complete` runs in that case.
    pub fn spawn<T, J, C>(
        &self,
        completions: &CompletionSender,
        job: J,
        on_complete: C,
    ) -> io::Result<JoinHandle<()>>
    where
        T: Send + 'static,
        J: FnOnce(&mut RecipeService) -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let shared = self.clone();
        let completions = completions.clone();
        let worker_id = WORKER_SEQ.fetch_add(1, Ordering::Relaxed);

        thread::Builder::new()
            .name(format!("recipebox-worker-{worker_id}"))
            .spawn(move || {
                let started_at = Instant::now();
                let result = shared.with_service(job);
                debug!(
                    "event=worker_done module=worker status=ok worker_id={worker_id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                if !completions.post(move || on_complete(result)) {
                    warn!(
                        "event=worker_done module=worker status=error worker_id={worker_id} error_code=completion_queue_closed"
                    );
                }
            })
    }

    fn lock(&self) -> MutexGuard<'_, RecipeService> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("event=worker_lock module=worker status=recovered reason=poisoned");
            poisoned.into_inner()
        })
    }
}
