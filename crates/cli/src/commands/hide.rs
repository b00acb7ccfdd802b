//! hide command - Hide a file name
//!
//! Hiding adds a marker version; earlier versions stay until deleted.

use b2_core::parse_path;
use clap::Args;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Hide a file
#[derive(Args, Debug)]
pub struct HideArgs {
    /// File path (account/bucket/name)
    pub path: String,
}

/// Execute the hide command
pub async fn execute(args: HideArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let name = match path.require_key() {
        Ok(k) => k.to_string(),
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };

    let bucket = match open_bucket(&path).await {
        Ok(b) => b,
        Err(e) => return fail(&formatter, "Failed to open bucket", &e),
    };

    match bucket.hide_file(&name).await {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                formatter.success(&format!("Hidden {path} (marker {})", meta.id));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to hide file", &e),
    }
}
