//! b2-core: Core library for the b2 cloud storage client
//!
//! This crate provides:
//! - Account authorization ([`Session`])
//! - Bucket management and the per-bucket upload-URL pool
//! - Uploads and downloads verified with SHA-1
//! - Cursor-based file listing
//! - Configuration, stored accounts and remote path parsing for the CLI
//!
//! All network access goes through the [`Transport`] trait, so the crate does
//! not depend on any particular HTTP client.

pub mod account;
pub mod bucket;
pub mod config;
pub mod error;
pub mod file;
pub mod listing;
pub mod path;
pub mod session;
pub mod transfer;
pub mod transport;
pub mod upload_url;

pub use account::{Account, AccountManager};
pub use bucket::{Bucket, BucketType};
pub use config::{Config, ConfigManager};
pub use error::{ApiError, Error, Result};
pub use file::{Action, File, FileMeta, sha1_hex};
pub use listing::{FilePage, ListCursor};
pub use path::{RemotePath, parse_path};
pub use session::{AuthorizedAccount, DEFAULT_AUTH_URL, Session};
pub use transfer::{AUTO_CONTENT_TYPE, MAX_FILE_INFO_ENTRIES, UploadOptions};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use upload_url::{UPLOAD_URL_LIFETIME, UploadUrl, UploadUrlLease, UploadUrlPool};
