//! Remote path parsing
//!
//! Remote paths have the form `account[/bucket[/file name]]`. Everything after
//! the bucket, slashes included, is the file name.

use std::fmt;

use crate::error::{Error, Result};

/// A parsed `account/bucket/name` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    /// Name of a stored account
    pub account: String,
    pub bucket: Option<String>,
    /// File name (empty when the path stops at the bucket)
    pub key: String,
}

impl RemotePath {
    pub fn new(
        account: impl Into<String>,
        bucket: Option<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            bucket,
            key: key.into(),
        }
    }

    /// The bucket name, or an error naming the expected format
    pub fn require_bucket(&self) -> Result<&str> {
        self.bucket.as_deref().ok_or_else(|| {
            Error::InvalidPath(format!(
                "Path '{self}' has no bucket. Use format: account/bucket"
            ))
        })
    }

    /// The file name, or an error naming the expected format
    pub fn require_key(&self) -> Result<&str> {
        self.require_bucket()?;
        if self.key.is_empty() {
            return Err(Error::InvalidPath(format!(
                "Path '{self}' has no file name. Use format: account/bucket/name"
            )));
        }
        Ok(&self.key)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.account)?;
        if let Some(bucket) = &self.bucket {
            write!(f, "/{bucket}")?;
            if !self.key.is_empty() {
                write!(f, "/{}", self.key)?;
            }
        }
        Ok(())
    }
}

/// Parse `account[/bucket[/name]]`
pub fn parse_path(path: &str) -> Result<RemotePath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let mut parts = path.splitn(3, '/');
    let account = parts.next().unwrap_or_default();
    if !is_valid_account_name(account) {
        return Err(Error::InvalidPath(format!(
            "Invalid account name in '{path}'. Use format: account/bucket[/name]"
        )));
    }

    let bucket = match parts.next() {
        None => None,
        Some("") => {
            return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
        }
        Some(bucket) => Some(bucket.to_string()),
    };
    let key = parts.next().unwrap_or_default();

    Ok(RemotePath::new(account, bucket, key))
}

fn is_valid_account_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
