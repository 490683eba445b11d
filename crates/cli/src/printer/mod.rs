use std::{
    io::{self, Write},
    path::Path,
    time::Duration,
};

use twin_scan::{DuplicateGroup, FileRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Automatically detect TTY and enable colors if appropriate.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn parse(s: &str) -> Self {
        match s {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub format: OutputFormat,
    pub color: ColorChoice,
    /// Whether to print the closing summary line.
    pub show_summary: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorChoice::Auto,
            show_summary: true,
        }
    }
}

/// Totals reported once all roots are done.
#[derive(Debug, Default, Clone)]
pub struct Summary {
    pub roots: usize,
    pub records: usize,
    /// Records whose content could not be read.
    pub unhashed: usize,
    pub groups: Option<usize>,
    pub elapsed: Duration,
}

/// Receives scan output in order and renders it.
pub trait ReportPrinter {
    /// Called before the records of each root.
    fn begin_root(&mut self, root: &Path) -> io::Result<()>;

    fn print_record(&mut self, record: &FileRecord) -> io::Result<()>;

    fn print_group(&mut self, group: &DuplicateGroup) -> io::Result<()>;

    /// Called once at the end, for summaries.
    fn finish(&mut self, summary: &Summary) -> io::Result<()>;
}

const MISSING_DIGEST: &str = "-";

/// Human-readable printer with optional color support.
pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    /// Auto color resolves to no color here, since arbitrary writers can't be
    /// probed for a TTY.
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        let use_color = cfg.color == ColorChoice::Always;

        Self {
            out,
            err,
            cfg,
            use_color,
        }
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }

    #[inline]
    fn format_path(&self, path: &Path) -> String {
        if self.use_color {
            format!("\x1b[32m{}\x1b[0m", path.display())
        } else {
            path.display().to_string()
        }
    }
}

impl HumanPrinter<io::Stdout, io::Stderr> {
    /// Create a printer that writes to stdout and stderr with TTY detection.
    pub fn stdout(cfg: PrinterConfig) -> Self {
        use std::io::IsTerminal;

        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
            use_color,
        }
    }
}

impl<W: Write, E: Write> ReportPrinter for HumanPrinter<W, E> {
    fn begin_root(&mut self, root: &Path) -> io::Result<()> {
        writeln!(self.out, "Scanning directory: {}", root.display())
    }

    fn print_record(&mut self, record: &FileRecord) -> io::Result<()> {
        let path = self.format_path(&record.path);
        writeln!(
            self.out,
            "{} ({} bytes) {}",
            path,
            record.size,
            record.digest.as_deref().unwrap_or(MISSING_DIGEST)
        )
    }

    fn print_group(&mut self, group: &DuplicateGroup) -> io::Result<()> {
        writeln!(
            self.out,
            "{} ({} files, {} bytes redundant)",
            group.key,
            group.members.len(),
            group.redundant_bytes()
        )?;
        for member in &group.members {
            let path = self.format_path(&member.path);
            writeln!(self.out, "  {} ({} bytes)", path, member.size)?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        if !self.cfg.show_summary {
            return Ok(());
        }

        let groups = summary
            .groups
            .map(|g| format!(", {g} duplicate groups"))
            .unwrap_or_default();

        writeln!(
            self.err,
            "\n[scan] {} files in {} roots ({} unreadable){} in {:.2}ms",
            summary.records,
            summary.roots,
            summary.unhashed,
            groups,
            summary.elapsed.as_secs_f64() * 1000.0,
        )
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl JsonPrinter<io::Stdout, io::Stderr> {
    pub fn stdout(cfg: PrinterConfig) -> Self {
        JsonPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
        }
    }
}

impl<W: Write, E: Write> ReportPrinter for JsonPrinter<W, E> {
    fn begin_root(&mut self, _root: &Path) -> io::Result<()> {
        Ok(())
    }

    fn print_record(&mut self, record: &FileRecord) -> io::Result<()> {
        let mut obj = record_json(record);
        obj["type"] = "file".into();
        writeln!(self.out, "{}", obj)
    }

    fn print_group(&mut self, group: &DuplicateGroup) -> io::Result<()> {
        let obj = serde_json::json!({
            "type": "group",
            "key": group.key,
            "redundant_bytes": group.redundant_bytes(),
            "members": group.members.iter().map(record_json).collect::<Vec<_>>(),
        });
        writeln!(self.out, "{}", obj)
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        if !self.cfg.show_summary {
            return Ok(());
        }

        let obj = serde_json::json!({
            "type": "summary",
            "roots": summary.roots,
            "records": summary.records,
            "unhashed": summary.unhashed,
            "groups": summary.groups,
            "elapsed_ms": summary.elapsed.as_secs_f64() * 1000.0,
        });
        writeln!(self.err, "{}", obj)
    }
}

/// Paths go through `to_string_lossy` so non UTF-8 names still print.
fn record_json(record: &FileRecord) -> serde_json::Value {
    serde_json::json!({
        "path": record.path.to_string_lossy(),
        "name": record.name,
        "size": record.size,
        "digest": record.digest,
    })
}

pub fn make_printer(cfg: PrinterConfig) -> Box<dyn ReportPrinter> {
    match cfg.format {
        OutputFormat::Human => Box::new(HumanPrinter::stdout(cfg)),
        OutputFormat::Json => Box::new(JsonPrinter::stdout(cfg)),
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
