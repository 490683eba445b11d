mod config;
pub mod logging;

pub use config::{
    DEFAULT_LOOKAHEAD, DEFAULT_PROJECT_IGNORE_PATTERNS, DEFAULT_SYSTEM_SKIP_PREFIXES,
    FALLBACK_WORKER_COUNT, PROGRAM_LOG_LEVEL, PROGRAM_NAME, PROGRAM_THREADS,
    default_worker_count,
};

pub use logging::init;
