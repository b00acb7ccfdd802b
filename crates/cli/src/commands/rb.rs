//! rb command - Remove bucket
//!
//! The service refuses to delete a bucket that still holds file versions;
//! `--force` deletes every version first.

use b2_core::{Bucket, Error, parse_path};
use clap::Args;
use serde::Serialize;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Target path (account/bucket)
    pub target: String,

    /// Delete every file version in the bucket first
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput {
    status: &'static str,
    bucket: String,
    deleted_versions: usize,
}

/// Execute the rb command
pub async fn execute(args: RbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(args.target.trim_end_matches('/')) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    if !path.key.is_empty() {
        formatter.error("rb takes account/bucket");
        return ExitCode::UsageError;
    }

    let bucket = match open_bucket(&path).await {
        Ok(b) => b,
        Err(e) => return fail(&formatter, "Failed to open bucket", &e),
    };

    let deleted_versions = if args.force {
        let spinner = Spinner::new(formatter.config(), &format!("Emptying {path}"));
        let result = delete_all_versions(&bucket, &spinner).await;
        spinner.finish_and_clear();
        match result {
            Ok(n) => n,
            Err(e) => return fail(&formatter, "Failed to empty bucket", &e),
        }
    } else {
        0
    };

    match bucket.delete().await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RbOutput {
                    status: "success",
                    bucket: bucket.name().to_string(),
                    deleted_versions,
                });
            } else {
                formatter.success(&format!("Bucket '{path}' removed successfully."));
            }
            ExitCode::Success
        }
        Err(e) if is_not_empty(&e) => {
            formatter.error(&format!(
                "Bucket '{path}' is not empty. Use --force to delete all file versions first."
            ));
            ExitCode::Conflict
        }
        Err(e) => fail(&formatter, "Failed to remove bucket", &e),
    }
}

async fn delete_all_versions(bucket: &Bucket, spinner: &Spinner) -> b2_core::Result<usize> {
    let mut deleted = 0;
    let mut start_name = String::new();
    let mut start_id = String::new();

    loop {
        let page = bucket
            .list_file_versions(&start_name, &start_id, 1000)
            .await?;
        let cursor = page.cursor();

        for file in &page.files {
            bucket.delete_file_version(&file.name, &file.id).await?;
            deleted += 1;
            spinner.set_message(&format!("Deleted {deleted} file versions"));
        }

        match cursor {
            Some(next) => {
                start_name = next.file_name;
                start_id = next.file_id.unwrap_or_default();
            }
            None => break,
        }
    }

    tracing::debug!(bucket = bucket.name(), deleted, "Deleted all file versions");
    Ok(deleted)
}

fn is_not_empty(error: &Error) -> bool {
    error
        .as_api()
        .is_some_and(|api| api.code == "cannot_delete_non_empty_bucket")
}
