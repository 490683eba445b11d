use std::{fs, path::Path, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use log::error;
use twin_scan::{Comparator, FileRecord, WorkerPool};

#[derive(Debug, Args)]
pub struct CmpArgs {
    /// First file
    pub left: std::path::PathBuf,

    /// Second file
    pub right: std::path::PathBuf,

    /// Print nothing; report through the exit status only
    #[arg(long, short = 's')]
    pub silent: bool,
}

pub fn run(args: CmpArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[cmp] {e:#}");
            eprintln!("[cmp] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: CmpArgs) -> Result<ExitCode> {
    let left = unhashed_record(&args.left)?;
    let right = unhashed_record(&args.right)?;

    let pool = Arc::new(WorkerPool::new(2).context("Failed to start worker threads")?);
    let comparator = Comparator::new(Arc::clone(&pool));
    let same = comparator.equal(&left, &right);
    pool.shutdown();

    if !args.silent {
        let verdict = if same { "same content" } else { "different" };
        println!(
            "{} {} {}: {verdict}",
            left.path.display(),
            if same { "==" } else { "!=" },
            right.path.display()
        );
    }

    Ok(if same {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Build a record for `path` without a digest, so the comparator hashes it.
pub(crate) fn unhashed_record(path: &Path) -> Result<FileRecord> {
    let meta = fs::symlink_metadata(path)
        .with_context(|| format!("Cannot stat {}", path.display()))?;

    anyhow::ensure!(!meta.is_dir(), "{} is a directory", path.display());

    let size = if meta.file_type().is_symlink() {
        fs::read_link(path)
            .with_context(|| format!("Cannot read link {}", path.display()))?
            .as_os_str()
            .len() as u64
    } else {
        meta.len()
    };

    Ok(FileRecord {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size,
        digest: None,
    })
}
