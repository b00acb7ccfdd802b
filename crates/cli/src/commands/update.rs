//! update command - Change bucket visibility

use b2_core::{BucketType, parse_path};
use clap::Args;
use serde::Serialize;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Make a bucket public or private
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("visibility").required(true))]
pub struct UpdateArgs {
    /// Target path (account/bucket)
    pub target: String,

    /// Anyone can download files
    #[arg(long, group = "visibility")]
    pub public: bool,

    /// Downloads need authorization
    #[arg(long, group = "visibility")]
    pub private: bool,
}

#[derive(Debug, Serialize)]
struct UpdateOutput {
    bucket: String,
    bucket_type: String,
}

/// Execute the update command
pub async fn execute(args: UpdateArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(args.target.trim_end_matches('/')) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };

    let bucket = match open_bucket(&path).await {
        Ok(b) => b,
        Err(e) => return fail(&formatter, "Failed to open bucket", &e),
    };

    let bucket_type = if args.public {
        BucketType::AllPublic
    } else {
        BucketType::AllPrivate
    };

    if let Err(e) = bucket.update(bucket_type).await {
        return fail(&formatter, "Failed to update bucket", &e);
    }

    if formatter.is_json() {
        formatter.json(&UpdateOutput {
            bucket: bucket.name().to_string(),
            bucket_type: bucket.bucket_type().to_string(),
        });
    } else {
        formatter.success(&format!("Bucket '{path}' is now {}.", bucket.bucket_type()));
    }
    ExitCode::Success
}
