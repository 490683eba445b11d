use std::{path::Path, sync::Arc};

use twin_fs::FileRecord;

use crate::{
    fingerprint::{ContentFingerprint, Fingerprint},
    pool::{TaskHandle, WorkerPool},
};

/// Decides whether two records hold the same content.
#[derive(Clone)]
pub struct Comparator {
    pool: Arc<WorkerPool>,
    fingerprint: Arc<dyn Fingerprint>,
}

impl Comparator {
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self {
            pool,
            fingerprint: Arc::new(ContentFingerprint),
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: Arc<dyn Fingerprint>) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Content equality by digest.
    ///
    /// When either record lacks a digest, both are recomputed on the pool
    /// before deciding. A digest that still cannot be computed never matches
    /// anything, including another missing one.
    pub fn equal(&self, a: &FileRecord, b: &FileRecord) -> bool {
        if let (Some(da), Some(db)) = (&a.digest, &b.digest) {
            return da == db;
        }

        matches!(self.resolve(a, b), (Some(da), Some(db)) if da == db)
    }

    /// Freshly compute both digests, blocking until each is done.
    ///
    /// The records themselves are left untouched.
    pub fn resolve(&self, a: &FileRecord, b: &FileRecord) -> (Option<String>, Option<String>) {
        // Both are queued before waiting so they can run in parallel.
        let ha = self.submit(&a.path);
        let hb = self.submit(&b.path);

        (ha.wait().flatten(), hb.wait().flatten())
    }

    fn submit(&self, path: &Path) -> TaskHandle<Option<String>> {
        let fingerprint = Arc::clone(&self.fingerprint);
        let path = path.to_path_buf();
        self.pool.submit(move || fingerprint.fingerprint(&path))
    }
}

#[cfg(test)]
#[path = "compare_tests.rs"]
mod tests;
