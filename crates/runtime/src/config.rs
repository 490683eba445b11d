use std::{num::NonZeroUsize, thread};

pub const PROGRAM_NAME: &str = "twin";
pub const PROGRAM_LOG_LEVEL: &str = "TWIN_LOG_LEVEL";
/// Overrides the worker pool size when set to a positive integer.
pub const PROGRAM_THREADS: &str = "TWIN_THREADS";

/// Fallback worker count when the host parallelism cannot be queried.
pub const FALLBACK_WORKER_COUNT: usize = 4;

/// How many entries the traversal thread may run ahead of the consumer.
pub const DEFAULT_LOOKAHEAD: usize = 64;

/// Number of fingerprint workers to spawn when the caller does not choose.
///
/// `TWIN_THREADS` wins when it parses to a non-zero count, then the host's
/// available parallelism, then [`FALLBACK_WORKER_COUNT`].
pub fn default_worker_count() -> usize {
    threads_from_env().unwrap_or_else(|| {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(FALLBACK_WORKER_COUNT)
    })
}

fn threads_from_env() -> Option<usize> {
    std::env::var(PROGRAM_THREADS)
        .ok()
        .and_then(|s| s.trim().parse::<NonZeroUsize>().ok())
        .map(NonZeroUsize::get)
}

/// Optional project-relative ignore patterns for build artifacts, VCS dirs, etc.
///
/// Not applied unless the caller opts in; a duplicate scan reports every file by default.
pub const DEFAULT_PROJECT_IGNORE_PATTERNS: &[&str] = &[
    "venv/",
    ".venv/",
    "build/",
    ".cache/",
    "dist/",
    ".DS_Store",
    ".git/",
    ".hg/",
    ".svn/",
    "node_modules/",
    "target/",
    "Thumbs.db",
    "lost+found/",
];

/// Pseudo filesystems that never hold user content.
pub const DEFAULT_SYSTEM_SKIP_PREFIXES: &[&str] = &["/proc", "/sys", "/dev", "/run", "/var/run"];

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
