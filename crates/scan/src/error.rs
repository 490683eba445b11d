use thiserror::Error;

/// Failures surfaced by the worker pool.
///
/// Environmental problems (unreadable files, vanished entries) never show up
/// here; they are folded into a missing digest on the affected record.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool has been shut down")]
    ShutDown,
}
