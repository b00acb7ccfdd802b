//! rm command - Delete a file version
//!
//! Deletion is permanent and addresses one version by name and id.

use b2_core::parse_path;
use clap::Args;
use serde::Serialize;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Delete a file version
#[derive(Args, Debug)]
pub struct RmArgs {
    /// File path (account/bucket/name)
    pub path: String,

    /// File id of the version to delete
    pub file_id: String,

    /// Only show what would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    file_name: String,
    file_id: String,
    dry_run: bool,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(&args.path) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let name = match path.require_key() {
        Ok(k) => k.to_string(),
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    if args.file_id.is_empty() {
        formatter.error("File id cannot be empty");
        return ExitCode::UsageError;
    }

    if !args.dry_run {
        let bucket = match open_bucket(&path).await {
            Ok(b) => b,
            Err(e) => return fail(&formatter, "Failed to open bucket", &e),
        };
        if let Err(e) = bucket.delete_file_version(&name, &args.file_id).await {
            return fail(&formatter, "Failed to delete file version", &e);
        }
    }

    if formatter.is_json() {
        formatter.json(&RmOutput {
            status: "success",
            file_name: name,
            file_id: args.file_id,
            dry_run: args.dry_run,
        });
    } else if args.dry_run {
        formatter.println(&format!("Would delete: {path} ({})", args.file_id));
    } else {
        formatter.success(&format!("Deleted {path} ({})", args.file_id));
    }
    ExitCode::Success
}
