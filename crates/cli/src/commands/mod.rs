pub mod cmp;
pub mod dupes;
pub mod scan;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use twin_fs::{IgnoreEngine, IgnoreOptions, UserExcludes};
use twin_runtime::{DEFAULT_LOOKAHEAD, default_worker_count};
use twin_scan::{FileRecord, ScanOptions, Scanner, WalkOptions, WorkerPool};

use crate::printer::{ColorChoice, OutputFormat, PrinterConfig, ReportPrinter, Summary};

pub use cmp::CmpArgs;
pub use dupes::DupesArgs;
pub use scan::ScanArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fingerprint every file under one or more roots, in traversal order.
    ///
    /// Example:
    ///   twin scan ~/photos /mnt/backup/photos
    ///   twin scan --json --exclude '*.tmp' .
    Scan(ScanArgs),

    /// Report groups of files with identical content (or identical names).
    ///
    /// Example:
    ///   twin dupes ~/music
    ///   twin dupes --by name ~/docs
    Dupes(DupesArgs),

    /// Compare the content of two files.
    Cmp(CmpArgs),
}

/// Traversal and pool settings shared by the scanning subcommands.
#[derive(Debug, Args)]
pub struct WalkArgs {
    /// Directories (or single files) to scan
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Number of fingerprint workers [default: TWIN_THREADS or CPU count]
    #[arg(long, short = 'j', value_name = "N")]
    pub threads: Option<usize>,

    /// Descend into symlinked directories (cycles are detected and skipped)
    #[arg(long, short = 'L')]
    pub follow_symlinks: bool,

    /// Gitignore-style pattern to skip; may be repeated
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub excludes: Vec<String>,

    /// Skip VCS and build directories such as .git/ and node_modules/
    #[arg(long)]
    pub skip_project_dirs: bool,

    /// Skip pseudo filesystems such as /proc and /sys
    #[arg(long)]
    pub skip_system_dirs: bool,

    /// How many files may be queued for hashing ahead of the output
    #[arg(long, value_name = "N", default_value_t = DEFAULT_LOOKAHEAD)]
    pub lookahead: usize,
}

impl WalkArgs {
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(default_worker_count)
    }

    pub fn start_pool(&self) -> Result<Arc<WorkerPool>> {
        let workers = self.worker_count();
        let pool = WorkerPool::new(workers)
            .with_context(|| format!("Failed to start {workers} worker threads"))?;
        Ok(Arc::new(pool))
    }

    /// Scan options for one root; ignore patterns are anchored at that root.
    pub fn scan_options(&self, root: &Path) -> Result<ScanOptions> {
        let ignore = IgnoreEngine::new(
            root,
            Some(IgnoreOptions {
                use_default_patterns: self.skip_project_dirs,
                extra_patterns: self.excludes.clone().into_boxed_slice(),
                ..IgnoreOptions::default()
            }),
        )
        .with_context(|| format!("Invalid exclude pattern for {}", root.display()))?;

        let user_excludes = if self.skip_system_dirs {
            UserExcludes::with_system_defaults()
        } else {
            UserExcludes::default()
        };

        Ok(ScanOptions {
            lookahead: self.lookahead,
            walk: WalkOptions {
                follow_dir_symlinks: self.follow_symlinks,
                ignore,
                user_excludes,
            },
        })
    }
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output results as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Suppress the closing summary
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl OutputOptions {
    pub fn printer_config(&self) -> PrinterConfig {
        PrinterConfig {
            format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
            color: ColorChoice::parse(&self.color),
            show_summary: !self.quiet,
        }
    }
}

/// Scan every root in order, handing each record to `on_record`.
///
/// Roots are scanned one after another on a shared pool. The returned
/// summary leaves the group count for the caller.
pub fn scan_roots(
    walk: &WalkArgs,
    printer: &mut dyn ReportPrinter,
    mut on_record: impl FnMut(&mut dyn ReportPrinter, FileRecord) -> Result<()>,
) -> Result<Summary> {
    let started = Instant::now();
    let pool = walk.start_pool()?;
    let mut summary = Summary {
        roots: walk.roots.len(),
        ..Summary::default()
    };

    for root in &walk.roots {
        let scanner = Scanner::new(Arc::clone(&pool)).with_options(walk.scan_options(root)?);

        printer.begin_root(root)?;
        for record in scanner.scan(root) {
            summary.records += 1;
            if !record.has_digest() {
                summary.unhashed += 1;
            }
            on_record(&mut *printer, record)?;
        }
    }

    pool.shutdown();
    summary.elapsed = started.elapsed();
    Ok(summary)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
