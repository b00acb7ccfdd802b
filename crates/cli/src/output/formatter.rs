//! Output formatter for human-readable and JSON output
//!
//! Every command prints through a [`Formatter`] so JSON mode stays strict:
//! one document on stdout, errors as JSON on stderr, no colors.

use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use super::OutputConfig;

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Confirmation on stdout; nothing in JSON mode, where the exit code says it
    pub fn success(&self, message: &str) {
        if !self.config.quiet && !self.config.json {
            println!("{}", self.mark("32", "✓", message));
        }
    }

    /// Errors print even in quiet mode; in JSON mode they are a JSON object on stderr
    pub fn error(&self, message: &str) {
        if self.config.json {
            eprintln!("{}", serde_json::json!({ "error": message }));
        } else {
            eprintln!("{}", self.mark("31", "✗", message));
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.config.quiet && !self.config.json {
            eprintln!("{}", self.mark("33", "⚠", message));
        }
    }

    /// `symbol message`, with the symbol in ANSI color `sgr` when colors are on
    fn mark(&self, sgr: &str, symbol: &str, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{sgr}m{symbol}\x1b[0m {message}")
        } else {
            format!("{symbol} {message}")
        }
    }

    /// Output JSON directly
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Print rows as a table (respects quiet mode)
    pub fn table(&self, header: &[&str], rows: Vec<Vec<String>>) {
        if self.config.quiet {
            return;
        }
        println!("{}", self.render_table(header, rows));
    }

    fn render_table(&self, header: &[&str], rows: Vec<Vec<String>>) -> Table {
        let mut table = Table::new();
        table
            .load_preset(if self.colors_enabled() { UTF8_FULL } else { NOTHING })
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header.to_vec());
        for row in rows {
            table.add_row(row);
        }
        table
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
