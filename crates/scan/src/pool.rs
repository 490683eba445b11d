use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, PoisonError, RwLock},
    thread::{self, JoinHandle},
};

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};
use twin_runtime::default_worker_count;

use crate::error::PoolError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed set of worker threads draining one unbounded task queue.
///
/// The pool is owned explicitly: construct it, share it behind an `Arc`, and
/// call [`WorkerPool::shutdown`] (or drop it) to drain and stop the workers.
/// Submitting after shutdown is a caller bug.
pub struct WorkerPool {
    /// `None` once shut down. Workers exit when every sender is gone.
    queue: RwLock<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

/// Completion handle for one submitted task.
///
/// Dropping it abandons the result; the task itself still runs.
#[must_use = "dropping a TaskHandle discards the task's result"]
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes.
    ///
    /// Returns `None` when the task panicked instead of producing a value.
    pub fn wait(self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Whether the result is already available.
    pub fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }
}

impl WorkerPool {
    /// Spawn `size` workers. A size of zero is treated as one.
    pub fn new(size: usize) -> io::Result<Self> {
        let size = size.max(1);
        let (tx, rx) = channel::unbounded::<Job>();

        let pool = WorkerPool {
            queue: RwLock::new(Some(tx)),
            workers: Mutex::new(Vec::with_capacity(size)),
            size,
        };

        for id in 0..size {
            let rx = rx.clone();
            // On failure `pool` is dropped here, which stops the workers
            // already started.
            let handle = thread::Builder::new()
                .name(format!("twin-worker-{id}"))
                .spawn(move || worker_loop(id, rx))?;
            pool.lock_workers().push(handle);
        }

        debug!("[pool] started {size} workers");
        Ok(pool)
    }

    /// Pool sized from `TWIN_THREADS` or the host parallelism.
    pub fn with_default_size() -> io::Result<Self> {
        Self::new(default_worker_count())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_shut_down(&self) -> bool {
        self.queue
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Enqueue `task` and return immediately.
    ///
    /// # Panics
    ///
    /// Panics if the pool has been shut down.
    pub fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match self.try_submit(task) {
            Ok(handle) => handle,
            Err(e) => panic!("[pool] submit rejected: {e}"),
        }
    }

    /// Enqueue `task`, or report that the pool no longer accepts work.
    pub fn try_submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        let job: Job = Box::new(move || {
            // Receiver gone means the caller abandoned the result.
            let _ = tx.send(task());
        });

        let queue = self.queue.read().unwrap_or_else(PoisonError::into_inner);
        let sender = queue.as_ref().ok_or(PoolError::ShutDown)?;
        sender.send(job).map_err(|_| PoolError::ShutDown)?;

        Ok(TaskHandle { rx })
    }

    /// Stop accepting work, run everything still queued, then join the workers.
    ///
    /// Idempotent. Must not be called from inside a task.
    pub fn shutdown(&self) {
        let sender = self
            .queue
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        let workers = std::mem::take(&mut *self.lock_workers());
        if workers.is_empty() {
            return;
        }

        for handle in workers {
            if handle.join().is_err() {
                warn!("[pool] worker thread panicked outside a task");
            }
        }
        debug!("[pool] all workers stopped");
    }

    fn lock_workers(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

fn worker_loop(id: usize, jobs: Receiver<Job>) {
    // recv keeps returning queued jobs after the sender is dropped, so the
    // queue is fully drained before this loop ends.
    while let Ok(job) = jobs.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!("[pool] worker {id}: task panicked");
        }
    }
    debug!("[pool] worker {id} exiting");
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
