//! ls command - List buckets and files
//!
//! Lists buckets when given an account only, or every file in a bucket when
//! given `account/bucket`. File listings follow the cursor to the end.

use b2_core::{Action, Bucket, FileMeta, FilePage, Session, parse_path};
use clap::Args;
use serde::Serialize;

use super::{connect, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List buckets or files
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote path (account or account/bucket)
    pub path: String,

    /// List every version of every file, including hide markers
    #[arg(long)]
    pub versions: bool,

    /// Files requested per page
    #[arg(long, default_value = "1000")]
    pub max_count: u32,

    /// Show totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Debug, Serialize)]
struct BucketInfo {
    name: String,
    id: String,
    bucket_type: String,
}

#[derive(Debug, Serialize)]
struct LsOutput {
    files: Vec<FileMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_files: usize,
    total_size_bytes: u64,
    total_size_human: String,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(args.path.trim_end_matches('/')) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    if !path.key.is_empty() {
        formatter.error("ls takes account or account/bucket");
        return ExitCode::UsageError;
    }

    let session = match connect(&path.account).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to authorize", &e),
    };

    match &path.bucket {
        None => list_buckets(&session, &formatter).await,
        Some(name) => match session.bucket(name).await {
            Ok(bucket) => list_files(&bucket, &args, &formatter).await,
            Err(e) => fail(&formatter, "Failed to open bucket", &e),
        },
    }
}

async fn list_buckets(session: &std::sync::Arc<Session>, formatter: &Formatter) -> ExitCode {
    let buckets = match session.list_buckets().await {
        Ok(b) => b,
        Err(e) => return fail(formatter, "Failed to list buckets", &e),
    };

    if formatter.is_json() {
        let items: Vec<BucketInfo> = buckets
            .iter()
            .map(|b| BucketInfo {
                name: b.name().to_string(),
                id: b.id().to_string(),
                bucket_type: b.bucket_type().to_string(),
            })
            .collect();
        formatter.json(&items);
    } else {
        let rows = buckets
            .iter()
            .map(|b| {
                vec![
                    b.name().to_string(),
                    b.bucket_type().to_string(),
                    b.id().to_string(),
                ]
            })
            .collect();
        formatter.table(&["Bucket", "Type", "Id"], rows);
    }
    ExitCode::Success
}

async fn list_files(bucket: &Bucket, args: &LsArgs, formatter: &Formatter) -> ExitCode {
    let mut files = Vec::new();
    let mut start_name = String::new();
    let mut start_id = String::new();

    loop {
        let result: b2_core::Result<FilePage> = if args.versions {
            bucket
                .list_file_versions(&start_name, &start_id, args.max_count)
                .await
        } else {
            bucket.list_file_names(&start_name, args.max_count).await
        };

        let page = match result {
            Ok(page) => page,
            Err(e) => return fail(formatter, "Failed to list files", &e),
        };
        let cursor = page.cursor();
        files.extend(page.files);

        match cursor {
            Some(next) => {
                start_name = next.file_name;
                start_id = next.file_id.unwrap_or_default();
            }
            None => break,
        }
    }

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    let summary = args.summarize.then(|| Summary {
        total_files: files.len(),
        total_size_bytes: total_size,
        total_size_human: humansize::format_size(total_size, humansize::BINARY),
    });

    if formatter.is_json() {
        formatter.json(&LsOutput { files, summary });
        return ExitCode::Success;
    }

    for file in &files {
        formatter.println(&format_line(file, args.versions));
    }
    if let Some(summary) = summary {
        formatter.println(&format!(
            "\nTotal: {} files, {}",
            summary.total_files, summary.total_size_human
        ));
    }
    ExitCode::Success
}

fn format_line(file: &FileMeta, versions: bool) -> String {
    let date = jiff::Timestamp::from_millisecond(file.upload_timestamp)
        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| " ".repeat(19));
    let size = humansize::format_size(file.size, humansize::BINARY);

    if versions {
        let marker = match file.action {
            Action::Upload => "",
            Action::Hide => " (hidden)",
            Action::Start => " (unfinished)",
        };
        format!("[{date}] {size:>10} {} {}{marker}", file.id, file.name)
    } else {
        format!("[{date}] {size:>10} {}", file.name)
    }
}
