use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::{Mutex, OnceLock},
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::config::PROGRAM_LOG_LEVEL;

enum LogTarget {
    Stderr,
    /// Append-only log file; lines are written whole under the lock.
    File(Mutex<File>),
}

pub struct Logger {
    level: Level,
    target: LogTarget,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// A logger was already installed by this process.
    #[error("logger already initialised")]
    AlreadySet,
    /// The log file could not be opened.
    #[error("cannot open log file: {0}")]
    Io(#[source] io::Error),
}

fn format_line(record: &Record<'_>) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!(
        "{} {} [{}] {}",
        timestamp,
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let msg = format_line(record);

            match &self.target {
                LogTarget::Stderr => {
                    eprintln!("{msg}")
                }
                LogTarget::File(file) => {
                    if let Ok(mut f) = file.lock() {
                        let _ = writeln!(f, "{msg}");
                    }
                }
            }
        }
    }

    fn flush(&self) {
        if let LogTarget::File(file) = &self.target
            && let Ok(mut f) = file.lock()
        {
            let _ = f.flush();
        }
    }
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

/// Install the stderr logger at the level taken from `TWIN_LOG_LEVEL`.
pub fn init() -> Result<(), InitError> {
    install(Logger {
        level: get_level_from_env(),
        target: LogTarget::Stderr,
    })
}

/// Install a logger appending to `path` instead of stderr.
///
/// Without an explicit `TWIN_LOG_LEVEL` the file receives `info` and above.
pub fn init_with_file(path: &Path) -> Result<(), InitError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(InitError::Io)?;

    let level = if std::env::var_os(PROGRAM_LOG_LEVEL).is_some() {
        get_level_from_env()
    } else {
        Level::Info
    };

    install(Logger {
        level,
        target: LogTarget::File(Mutex::new(file)),
    })
}

fn install(logger: Logger) -> Result<(), InitError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // Only the first caller gets to pick the target; a second init would
    // otherwise leave `set_max_level` out of sync with the installed logger.
    if LOGGER.get().is_some() {
        return Err(InitError::AlreadySet);
    }

    let level = logger.level;
    let logger = LOGGER.get_or_init(|| logger);

    log::set_logger(logger).map_err(|_| InitError::AlreadySet)?;
    log::set_max_level(level.to_level_filter());

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
