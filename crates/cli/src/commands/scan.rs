use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::error;

use crate::commands::{OutputOptions, WalkArgs, scan_roots};
use crate::printer::make_printer;

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub walk: WalkArgs,

    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: ScanArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[scan] {e:#}");
            eprintln!("[scan] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: ScanArgs) -> Result<ExitCode> {
    let mut printer = make_printer(args.output.printer_config());

    let summary = scan_roots(&args.walk, printer.as_mut(), |printer, record| {
        printer.print_record(&record)?;
        Ok(())
    })?;

    printer.finish(&summary)?;
    Ok(ExitCode::SUCCESS)
}
