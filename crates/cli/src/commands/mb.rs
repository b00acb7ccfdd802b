//! mb command - Make bucket

use b2_core::{BucketType, Error, parse_path};
use clap::Args;
use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Target path (account/bucket)
    pub target: String,

    /// Make the bucket's files downloadable without authorization
    #[arg(long)]
    pub public: bool,

    /// Succeed if the account already owns a bucket with this name
    #[arg(short = 'p', long)]
    pub ignore_existing: bool,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Execute the mb command
pub async fn execute(args: MbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(args.target.trim_end_matches('/')) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let name = match path.require_bucket() {
        Ok(b) => b.to_string(),
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    if let Err(msg) = validate_bucket_name(&name) {
        formatter.error(&msg);
        return ExitCode::UsageError;
    }

    let session = match connect(&path.account).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to authorize", &e),
    };

    let bucket_type = if args.public {
        BucketType::AllPublic
    } else {
        BucketType::AllPrivate
    };

    match session.create_bucket(&name, bucket_type.clone()).await {
        Ok(bucket) => {
            if formatter.is_json() {
                formatter.json(&MbOutput {
                    status: "success",
                    bucket: name,
                    bucket_id: Some(bucket.id().to_string()),
                    message: None,
                });
            } else {
                formatter.success(&format!("Bucket '{path}' created ({bucket_type})."));
            }
            ExitCode::Success
        }
        Err(e) if args.ignore_existing && is_duplicate(&e) => {
            if formatter.is_json() {
                formatter.json(&MbOutput {
                    status: "success",
                    bucket: name,
                    bucket_id: None,
                    message: Some("Bucket already exists".to_string()),
                });
            } else {
                formatter.warning(&format!("Bucket '{path}' already exists."));
            }
            ExitCode::Success
        }
        Err(e) if is_duplicate(&e) => {
            formatter.error(&format!("Bucket '{path}' already exists: {e}"));
            ExitCode::Conflict
        }
        Err(e) => fail(&formatter, "Failed to create bucket", &e),
    }
}

fn is_duplicate(error: &Error) -> bool {
    error
        .as_api()
        .is_some_and(|api| api.code == "duplicate_bucket_name")
}

/// Bucket names are 6 to 50 letters, digits and dashes
fn validate_bucket_name(name: &str) -> Result<(), String> {
    if !(6..=50).contains(&name.len()) {
        return Err("Bucket name must be between 6 and 50 characters".to_string());
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("Bucket name may only contain letters, digits and '-'".to_string());
    }
    if name.to_ascii_lowercase().starts_with("b2-") {
        return Err("Bucket names starting with 'b2-' are reserved".to_string());
    }
    Ok(())
}
