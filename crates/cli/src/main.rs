use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

mod commands;
mod printer;

use commands::Command;
use twin_runtime::{PROGRAM_NAME, logging};

#[derive(Debug, Parser)]
#[command(
    name = "twin",
    version,
    about = "Find files with identical content",
    propagate_version = true
)]
pub struct Cli {
    /// Append log output to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = match &cli.log_file {
        Some(path) => logging::init_with_file(path),
        None => logging::init(),
    };
    if let Err(e) = logger {
        eprintln!("[{PROGRAM_NAME}] logging disabled: {e}");
    }

    match cli.command {
        Command::Scan(args) => commands::scan::run(args),
        Command::Dupes(args) => commands::dupes::run(args),
        Command::Cmp(args) => commands::cmp::run(args),
    }
}
