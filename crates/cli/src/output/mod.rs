//! Output formatting utilities
//!
//! Human-readable or JSON output, plus a spinner for transfers.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::Spinner;

use b2_core::config::{ColorMode, Defaults, OutputFormat};

/// Output configuration derived from CLI flags and config defaults
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable the transfer spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Merge command-line flags over the stored defaults
    pub fn from_flags(
        json: bool,
        no_color: bool,
        no_progress: bool,
        quiet: bool,
        defaults: &Defaults,
    ) -> Self {
        Self {
            json: json || defaults.output == OutputFormat::Json,
            no_color: no_color || defaults.color == ColorMode::Never,
            no_progress: no_progress || !defaults.progress,
            quiet,
        }
    }
}
