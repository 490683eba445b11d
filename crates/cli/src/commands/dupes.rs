use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::{error, info};
use twin_scan::{GroupKey, group};

use crate::commands::{OutputOptions, WalkArgs, scan_roots};
use crate::printer::make_printer;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum GroupBy {
    /// Identical content
    #[default]
    Digest,
    /// Identical file name, whatever the content
    Name,
}

impl From<GroupBy> for GroupKey {
    fn from(by: GroupBy) -> Self {
        match by {
            GroupBy::Digest => GroupKey::Digest,
            GroupBy::Name => GroupKey::Name,
        }
    }
}

#[derive(Debug, Args)]
pub struct DupesArgs {
    #[command(flatten)]
    pub walk: WalkArgs,

    /// What counts as a duplicate
    #[arg(long, value_enum, default_value_t = GroupBy::Digest)]
    pub by: GroupBy,

    /// Exit with status 1 when duplicates are found
    #[arg(long)]
    pub fail_on_dupes: bool,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: DupesArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[dupes] {e:#}");
            eprintln!("[dupes] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: DupesArgs) -> Result<ExitCode> {
    let mut printer = make_printer(args.output.printer_config());
    let mut records = Vec::new();

    let mut summary = scan_roots(&args.walk, printer.as_mut(), |_, record| {
        records.push(record);
        Ok(())
    })?;

    let groups = group(records, args.by.into());
    info!("[dupes] {} groups by {:?}", groups.len(), args.by);

    for g in &groups {
        printer.print_group(g)?;
    }

    summary.groups = Some(groups.len());
    printer.finish(&summary)?;

    if args.fail_on_dupes && !groups.is_empty() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
