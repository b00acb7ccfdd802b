//! put command - Upload a file
//!
//! Reads a local file (or stdin with `-`) fully into memory, then uploads it
//! with its SHA-1 in a single request.

use std::collections::BTreeMap;
use std::path::Path;

use b2_core::{FileMeta, MAX_FILE_INFO_ENTRIES, UploadOptions, parse_path};
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncReadExt;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Upload a file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file, or - for stdin
    pub source: String,

    /// Destination path (account/bucket/name)
    pub target: String,

    /// File info entry stored with the file (repeatable)
    #[arg(long = "info", value_name = "KEY=VALUE", value_parser = parse_info)]
    pub info: Vec<(String, String)>,

    /// Content type (default: guessed from the file name, else by the service)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
    size_human: String,
    file: FileMeta,
}

fn parse_info(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Later entries win on duplicate keys; the service stores at most ten
fn collect_info(entries: Vec<(String, String)>) -> Result<BTreeMap<String, String>, String> {
    let info: BTreeMap<_, _> = entries.into_iter().collect();
    if info.len() > MAX_FILE_INFO_ENTRIES {
        return Err(format!(
            "At most {MAX_FILE_INFO_ENTRIES} --info entries are allowed, got {}",
            info.len()
        ));
    }
    Ok(info)
}

/// Execute the put command
pub async fn execute(args: PutArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(&args.target) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let name = match path.require_key() {
        Ok(k) => k.to_string(),
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let file_info = match collect_info(args.info) {
        Ok(info) => info,
        Err(msg) => {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };

    let data = match read_source(&args.source).await {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&format!("Failed to read {}: {e}", args.source));
            return ExitCode::GeneralError;
        }
    };
    let size = data.len() as u64;

    let content_type = args.content_type.clone().or_else(|| {
        (args.source != "-")
            .then(|| mime_guess::from_path(&args.source).first())
            .flatten()
            .map(|m| m.essence_str().to_string())
    });
    let options = UploadOptions {
        content_type,
        file_info,
    };

    let bucket = match open_bucket(&path).await {
        Ok(b) => b,
        Err(e) => return fail(&formatter, "Failed to open bucket", &e),
    };

    let spinner = Spinner::new(formatter.config(), &format!("Uploading {name}"));
    let result = bucket.upload_file_with(&name, data, options).await;
    spinner.finish_and_clear();

    match result {
        Ok(meta) => {
            let size_human = humansize::format_size(size, humansize::BINARY);
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    source: args.source,
                    target: path.to_string(),
                    size_bytes: size,
                    size_human,
                    file: meta,
                });
            } else {
                formatter.println(&format!(
                    "{} -> {path} ({size_human}, id {})",
                    args.source, meta.id
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Failed to upload {}", args.source), &e),
    }
}

async fn read_source(source: &str) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    if source == "-" {
        tokio::io::stdin().read_to_end(&mut data).await?;
    } else {
        tokio::fs::File::open(Path::new(source))
            .await?
            .read_to_end(&mut data)
            .await?;
    }
    Ok(data)
}
