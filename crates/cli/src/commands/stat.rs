//! stat command - Show file version metadata

use b2_core::{FileMeta, parse_path};
use clap::Args;

use super::{fail, open_bucket};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show metadata of a file version
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Bucket path (account/bucket)
    pub path: String,

    /// File id of the version
    pub file_id: String,
}

/// Execute the stat command
pub async fn execute(args: StatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_path(args.path.trim_end_matches('/')) {
        Ok(p) => p,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };

    let bucket = match open_bucket(&path).await {
        Ok(b) => b,
        Err(e) => return fail(&formatter, "Failed to open bucket", &e),
    };

    match bucket.get_file_info(&args.file_id).await {
        Ok(meta) => {
            if formatter.is_json() {
                formatter.json(&meta);
            } else {
                for line in describe(&meta) {
                    formatter.println(&line);
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to get file info", &e),
    }
}

fn describe(meta: &FileMeta) -> Vec<String> {
    let mut lines = vec![
        format!("Name      : {}", meta.name),
        format!("Id        : {}", meta.id),
        format!("Action    : {}", meta.action),
    ];
    if let Ok(uploaded) = jiff::Timestamp::from_millisecond(meta.upload_timestamp) {
        lines.push(format!(
            "Date      : {}",
            uploaded.strftime("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    lines.push(format!(
        "Size      : {} ({} bytes)",
        humansize::format_size(meta.content_length, humansize::BINARY),
        meta.content_length
    ));
    if !meta.content_type.is_empty() {
        lines.push(format!("Type      : {}", meta.content_type));
    }
    if !meta.content_sha1.is_empty() {
        lines.push(format!("SHA1      : {}", meta.content_sha1));
    }
    for (key, value) in &meta.file_info {
        lines.push(format!("Info      : {key}={value}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_describe() {
        let meta = FileMeta {
            id: "4_z27".into(),
            name: "cats.txt".into(),
            content_length: 19,
            content_sha1: "78498e5096b20e3f1c063e8740ff83d595ededb3".into(),
            content_type: "text/plain".into(),
            file_info: BTreeMap::from([("file-cats".to_string(), "yes".to_string())]),
            upload_timestamp: 1_700_000_000_000,
            ..Default::default()
        };

        let lines = describe(&meta);
        assert_eq!(lines[0], "Name      : cats.txt");
        assert!(lines.iter().any(|l| l == "Action    : upload"));
        assert!(lines.iter().any(|l| l == "Date      : 2023-11-14 22:13:20 UTC"));
        assert!(lines.iter().any(|l| l.contains("19 bytes")));
        assert!(lines.iter().any(|l| l == "Info      : file-cats=yes"));
    }
}
