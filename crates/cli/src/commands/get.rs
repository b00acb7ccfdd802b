//! get command - Download a file
//!
//! Nothing is written unless the downloaded data matches its SHA-1.

use std::path::PathBuf;

use b2_core::{File, RemotePath, parse_path};
use clap::Args;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Download a file
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Source path (account/bucket/name, or account/bucket with --id)
    pub source: String,

    /// Destination file, or - for stdout (default: the file's base name)
    pub dest: Option<String>,

    /// Download this file version instead of the latest one by name
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    file_id: String,
    file_name: String,
    dest: String,
    size_bytes: u64,
    content_sha1: String,
}

/// Execute the get command
pub async fn execute(args: GetArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(&args.source) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };
    let check = match &args.id {
        Some(_) => path.require_bucket().map(|_| ()),
        None => path.require_key().map(|_| ()),
    };
    if let Err(e) = check {
        return fail(&formatter, "Invalid path", &e);
    }

    let bucket = match open_bucket(&path).await {
        Ok(b) => b,
        Err(e) => return fail(&formatter, "Failed to open bucket", &e),
    };

    let spinner = Spinner::new(formatter.config(), &format!("Downloading {path}"));
    let result = match &args.id {
        Some(id) => bucket.download_file_by_id(id).await,
        None => bucket.download_file_by_name(&path.key).await,
    };
    spinner.finish_and_clear();

    let file = match result {
        Ok(f) => f,
        Err(e) => return fail(&formatter, &format!("Failed to download {path}"), &e),
    };

    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_dest(&path, &file));
    if let Err(e) = write_dest(&dest, file.data()).await {
        formatter.error(&format!("Failed to write {dest}: {e}"));
        return ExitCode::GeneralError;
    }

    let meta = file.meta();
    if dest == "-" {
        // Stdout carries the data; keep it free of anything else
    } else if formatter.is_json() {
        formatter.json(&GetOutput {
            status: "success",
            file_id: meta.id.clone(),
            file_name: meta.name.clone(),
            dest,
            size_bytes: meta.size,
            content_sha1: meta.content_sha1.clone(),
        });
    } else {
        formatter.println(&format!(
            "{path} -> {dest} ({})",
            humansize::format_size(meta.size, humansize::BINARY)
        ));
    }
    ExitCode::Success
}

/// Base name of the file, taken from the path or else from the download
fn default_dest(path: &RemotePath, file: &File) -> String {
    let name = if path.key.is_empty() {
        file.meta().name.as_str()
    } else {
        path.key.as_str()
    };
    name.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

async fn write_dest(dest: &str, data: &[u8]) -> std::io::Result<()> {
    if dest == "-" {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(data).await?;
        stdout.flush().await
    } else {
        tokio::fs::write(PathBuf::from(dest), data).await
    }
}
