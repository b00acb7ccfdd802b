//! Uploads and downloads with SHA-1 verification
//!
//! Uploads are buffered in full so the checksum covers exactly the bytes
//! sent. Downloads are verified against the checksum the service declares
//! before the caller ever sees the data.

use std::collections::BTreeMap;

use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

use crate::bucket::Bucket;
use crate::error::{Error, Result};
use crate::file::{File, FileMeta, sha1_hex};
use crate::transport::{HttpRequest, HttpResponse};

/// The service accepts at most this many `X-Bz-Info-*` headers per file
pub const MAX_FILE_INFO_ENTRIES: usize = 10;

/// Content type asking the service to guess from the file name
pub const AUTO_CONTENT_TYPE: &str = "b2/x-auto";

const INFO_HEADER_PREFIX: &str = "X-Bz-Info-";

/// Optional upload settings
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Defaults to [`AUTO_CONTENT_TYPE`]
    pub content_type: Option<String>,
    pub file_info: BTreeMap<String, String>,
}

impl UploadOptions {
    pub fn with_info(file_info: BTreeMap<String, String>) -> Self {
        Self {
            content_type: None,
            file_info,
        }
    }
}

/// Percent-encode a file name, keeping `/` separators readable
fn encode_file_name(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_header(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl Bucket {
    /// Upload `data` as `name` with the given file info
    pub async fn upload_file(
        &self,
        name: &str,
        data: Vec<u8>,
        file_info: BTreeMap<String, String>,
    ) -> Result<FileMeta> {
        self.upload_file_with(name, data, UploadOptions::with_info(file_info))
            .await
    }

    /// Read `reader` to the end, then upload it as `name`
    pub async fn upload_reader<R>(
        &self,
        name: &str,
        mut reader: R,
        file_info: BTreeMap<String, String>,
    ) -> Result<FileMeta>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.upload_file(name, data, file_info).await
    }

    /// Upload `data` as `name`
    ///
    /// All arguments are checked before an upload URL is acquired. The URL
    /// goes back to the pool only when the service accepts the upload.
    pub async fn upload_file_with(
        &self,
        name: &str,
        data: Vec<u8>,
        options: UploadOptions,
    ) -> Result<FileMeta> {
        if name.is_empty() {
            return Err(Error::Validation("no file name provided".into()));
        }
        if data.is_empty() {
            return Err(Error::Validation("no file data provided".into()));
        }
        if options.file_info.len() > MAX_FILE_INFO_ENTRIES {
            return Err(Error::Validation(format!(
                "at most {MAX_FILE_INFO_ENTRIES} file info entries are allowed, got {}",
                options.file_info.len()
            )));
        }

        let lease = self.acquire_upload_url().await?;

        let content_type = options
            .content_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(AUTO_CONTENT_TYPE);
        let mut request = HttpRequest::post(lease.upload_url.as_str())
            .header("Authorization", lease.authorization_token.as_str())
            .header("X-Bz-File-Name", encode_file_name(name))
            .header("Content-Type", content_type)
            .header("Content-Length", data.len().to_string())
            .header("X-Bz-Content-Sha1", sha1_hex(&data));
        for (key, value) in &options.file_info {
            request = request.header(
                format!("{INFO_HEADER_PREFIX}{key}"),
                urlencoding::encode(value).into_owned(),
            );
        }
        let size = data.len();
        let request = request.body(data);

        tracing::debug!(bucket = self.name(), file = name, size, "Uploading file");
        let response = match self.session().transport().send(request).await {
            Ok(response) => response,
            Err(e) => {
                lease.discard();
                return Err(e);
            }
        };

        match response.into_json::<FileMeta>() {
            Ok(meta) => {
                lease.release();
                tracing::info!(bucket = self.name(), file = name, file_id = %meta.id, "Uploaded file");
                Ok(meta.in_bucket(self))
            }
            Err(e) => {
                lease.discard();
                Err(e)
            }
        }
    }

    /// Download the latest version of `name`
    pub async fn download_file_by_name(&self, name: &str) -> Result<File> {
        if name.is_empty() {
            return Err(Error::Validation("no file name provided".into()));
        }

        let url = format!(
            "{}/file/{}/{}",
            self.session().download_url(),
            self.name(),
            encode_file_name(name)
        );
        self.download(url).await
    }

    /// Download one specific file version
    pub async fn download_file_by_id(&self, file_id: &str) -> Result<File> {
        if file_id.is_empty() {
            return Err(Error::Validation("no file id provided".into()));
        }

        let url = Url::parse_with_params(
            &self.session().download_endpoint("b2_download_file_by_id"),
            &[("fileId", file_id)],
        )?;
        self.download(url.into()).await
    }

    async fn download(&self, url: String) -> Result<File> {
        let mut request = HttpRequest::get(url);
        if self.is_private() {
            request = request.header("Authorization", self.session().authorization_token());
        }

        tracing::debug!(bucket = self.name(), url = %request.url, "Downloading file");
        let response = self.session().transport().send(request).await?;
        if !response.is_ok() {
            return Err(response.into_api_error().into());
        }

        let meta = meta_from_headers(&response)?.in_bucket(self);
        let file = File::new(meta, response.body)?;
        tracing::debug!(
            bucket = self.name(),
            file = %file.meta().name,
            size = file.meta().size,
            "Downloaded and verified file"
        );
        Ok(file)
    }
}

/// Build file metadata from download response headers
fn meta_from_headers(response: &HttpResponse) -> Result<FileMeta> {
    let header = |name: &str| response.header(name).unwrap_or_default().to_string();

    let content_length = match response.header("Content-Length") {
        Some(value) => value.trim().parse::<u64>().map_err(|_| Error::Integrity {
            expected: format!("Content-Length {value:?}"),
            actual: format!("{} bytes", response.body.len()),
        })?,
        None => response.body.len() as u64,
    };

    let file_info = response
        .headers_with_prefix(INFO_HEADER_PREFIX)
        .map(|(key, value)| (key.to_string(), decode_header(value)))
        .collect();

    Ok(FileMeta {
        id: header("X-Bz-File-Id"),
        name: decode_header(&header("X-Bz-File-Name")),
        size: response.body.len() as u64,
        content_length,
        content_sha1: header("X-Bz-Content-Sha1"),
        content_type: header("Content-Type"),
        upload_timestamp: response
            .header("X-Bz-Upload-Timestamp")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default(),
        file_info,
        ..Default::default()
    })
}
