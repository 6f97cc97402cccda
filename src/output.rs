//! Output Formatting - Table and JSON summaries
//!
//! Logs go through `tracing`; this module only prints the end-of-run summaries
//! a person (or a CI job reading JSON) looks at.

use std::io;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format (default)
    #[default]
    Table,
    /// JSON output for machine processing
    Json,
}

/// Output writer that handles formatting based on configuration
pub struct OutputWriter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("{} {}", style("✓").green().bold(), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow().bold(), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("{} {}", style("ℹ").cyan().bold(), message);
    }

    /// Print a section divider
    pub fn divider(&self) {
        if self.quiet || self.format == OutputFormat::Json {
            return;
        }
        println!("{}", style("─".repeat(50)).dim());
    }

    /// Print a header/title with styled formatting
    pub fn header(&self, title: &str) {
        if self.quiet || self.format == OutputFormat::Json {
            return;
        }
        self.divider();
        println!("  {}", style(title).bold().cyan());
        self.divider();
    }

    /// Print JSON output (always prints, ignores quiet)
    pub fn json<T: Serialize + ?Sized>(&self, data: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        println!("{}", json);
        Ok(())
    }

    pub fn table(&self, table: &Table) {
        if self.quiet {
            return;
        }
        println!("{}", table);
    }

    /// Create a table with headers
    pub fn create_table_with_headers(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                headers
                    .iter()
                    .map(|h| Cell::new(h).fg(Color::Cyan))
                    .collect::<Vec<_>>(),
            );
        table
    }
}

/// Progress indicator for downloads
pub struct ProgressIndicator {
    bar: indicatif::ProgressBar,
}

impl ProgressIndicator {
    /// Spinner for downloads of unknown size
    pub fn spinner(message: &str) -> Self {
        let bar = indicatif::ProgressBar::new_spinner();
        if let Ok(template) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(template);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    /// Byte progress bar with known length
    pub fn bar(len: u64, message: &str) -> Self {
        let bar = indicatif::ProgressBar::new(len);
        if let Ok(template) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        {
            bar.set_style(template.progress_chars("█▓░"));
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Shorten a long cell value, keeping its tail (file names live at the end of paths)
pub fn truncate_start(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - max_len.saturating_sub(3)).collect();
    format!("...{}", tail)
}
