//! Ordered scan pipeline.
//!
//! One traversal thread walks the tree and submits a fingerprint task per
//! entry to the [`WorkerPool`], pushing the task handle into a bounded FIFO.
//! The consumer pops handles strictly in that order and blocks only on the
//! oldest one, so records come out in traversal order however the workers
//! happen to finish.
//!
//! No timeout exists at this layer: a read that never returns (e.g. on a hung
//! network mount) stalls the scan at that entry.

use std::{
    panic,
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};
use twin_fs::{FileRecord, WalkEntry, WalkOptions, Walker};
use twin_runtime::DEFAULT_LOOKAHEAD;

use crate::{
    fingerprint::{ContentFingerprint, Fingerprint},
    pool::{TaskHandle, WorkerPool},
};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Entries the traversal may run ahead of the consumer. Clamped to at least 1.
    pub lookahead: usize,
    pub walk: WalkOptions,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
            walk: WalkOptions::default(),
        }
    }
}

/// A discovered entry whose digest may still be in flight.
struct Pending {
    /// Traversal position, starting at 0.
    position: u64,
    entry: WalkEntry,
    handle: TaskHandle<Option<String>>,
}

/// Starts scans against a shared worker pool.
#[derive(Clone)]
pub struct Scanner {
    pool: Arc<WorkerPool>,
    fingerprint: Arc<dyn Fingerprint>,
    walk: Arc<WalkOptions>,
    lookahead: usize,
}

impl Scanner {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self {
            pool,
            fingerprint: Arc::new(ContentFingerprint),
            walk: Arc::new(WalkOptions::default()),
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.lookahead = options.lookahead.max(1);
        self.walk = Arc::new(options.walk);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Arc<dyn Fingerprint>) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Start scanning `root`. Records are produced as the returned [`Scan`] is pulled.
    ///
    /// A missing root gives an empty scan.
    pub fn scan(&self, root: impl Into<PathBuf>) -> Scan {
        let root = root.into();
        let (tx, rx) = channel::bounded::<Pending>(self.lookahead);

        let traversal = {
            let pool = Arc::clone(&self.pool);
            let fingerprint = Arc::clone(&self.fingerprint);
            let walk = Arc::clone(&self.walk);

            thread::spawn(move || traverse(root, walk, pool, fingerprint, tx))
        };

        Scan {
            pending: Some(rx),
            traversal: Some(traversal),
            emitted: 0,
        }
    }

    /// Run a scan to completion.
    pub fn scan_all(&self, root: impl Into<PathBuf>) -> Vec<FileRecord> {
        self.scan(root).collect()
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("pool", &self.pool)
            .field("walk", &self.walk)
            .field("lookahead", &self.lookahead)
            .finish_non_exhaustive()
    }
}

fn traverse(
    root: PathBuf,
    walk: Arc<WalkOptions>,
    pool: Arc<WorkerPool>,
    fingerprint: Arc<dyn Fingerprint>,
    tx: Sender<Pending>,
) {
    debug!("[scan] traversal of {:?} started", root);
    let mut position = 0u64;

    for entry in Walker::new(root.clone(), walk) {
        let path = entry.path.clone();
        let fingerprint = Arc::clone(&fingerprint);
        let handle = pool.submit(move || fingerprint.fingerprint(&path));

        // Blocks while the look-ahead window is full.
        if tx
            .send(Pending {
                position,
                entry,
                handle,
            })
            .is_err()
        {
            debug!("[scan] consumer gone after {position} entries, stopping traversal");
            return;
        }
        position += 1;
    }

    debug!("[scan] traversal of {:?} finished: {position} entries", root);
}

/// Lazy, ordered, one-shot sequence of records for one root.
///
/// Dropping it early stops the traversal; digests already in flight finish
/// on the pool and are discarded.
pub struct Scan {
    pending: Option<Receiver<Pending>>,
    traversal: Option<JoinHandle<()>>,
    emitted: u64,
}

impl Scan {
    /// Number of records produced so far.
    pub fn position(&self) -> u64 {
        self.emitted
    }

    /// Join the traversal thread, re-raising its panic on this thread.
    fn finish(&mut self) {
        if let Some(handle) = self.traversal.take()
            && let Err(payload) = handle.join()
        {
            panic::resume_unwind(payload);
        }
    }
}

impl Iterator for Scan {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        let rx = self.pending.as_ref()?;

        match rx.recv() {
            Ok(Pending {
                position,
                entry,
                handle,
            }) => {
                debug_assert_eq!(position, self.emitted, "records out of traversal order");
                let digest = handle.wait().flatten();
                self.emitted += 1;
                Some(FileRecord::from_entry(entry, digest))
            }
            Err(_) => {
                // Traversal ended (or died): every pending entry was drained.
                self.pending = None;
                self.finish();
                None
            }
        }
    }
}

impl Drop for Scan {
    fn drop(&mut self) {
        // Closing the receiver makes the traversal's next send fail.
        self.pending = None;

        if let Some(handle) = self.traversal.take()
            && handle.join().is_err()
        {
            warn!("[scan] traversal thread panicked after the scan was dropped");
        }
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
