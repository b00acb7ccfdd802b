//! File records and single-request file operations

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use sha1::{Digest, Sha1};

use crate::bucket::Bucket;
use crate::error::{Error, Result};

/// Lifecycle state of a file version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// A complete upload
    #[default]
    Upload,
    /// A tombstone hiding earlier versions
    Hide,
    /// A large file that was started but not finished
    Start,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Upload => "upload",
            Action::Hide => "hide",
            Action::Start => "start",
        })
    }
}

/// Metadata of one stored file version
///
/// `bucket` is never part of the service's answer; the client fills it in
/// with the bucket the record was fetched through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    #[serde(rename = "fileId", default)]
    pub id: String,
    #[serde(rename = "fileName", default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_length: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_sha1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_info: BTreeMap<String, String>,
    #[serde(default)]
    pub upload_timestamp: i64,
    #[serde(skip)]
    pub bucket: Option<Bucket>,
}

impl FileMeta {
    pub(crate) fn in_bucket(mut self, bucket: &Bucket) -> Self {
        self.bucket = Some(bucket.clone());
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Hex-encoded SHA-1 of `data`
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// A downloaded file: metadata plus the verified payload
#[derive(Debug, Clone)]
pub struct File {
    meta: FileMeta,
    data: Vec<u8>,
}

impl File {
    /// Pair `data` with its metadata after checking it against the declared
    /// length and SHA-1
    ///
    /// The declared checksum may carry the service's `unverified:` prefix.
    /// `meta.size` is set to the number of bytes actually received.
    pub fn new(mut meta: FileMeta, data: Vec<u8>) -> Result<Self> {
        let received = data.len() as u64;
        if meta.content_length != received {
            return Err(Error::Integrity {
                expected: format!("{} bytes", meta.content_length),
                actual: format!("{received} bytes"),
            });
        }

        let declared = meta
            .content_sha1
            .strip_prefix("unverified:")
            .unwrap_or(&meta.content_sha1);
        let actual = sha1_hex(&data);
        if !declared.eq_ignore_ascii_case(&actual) {
            return Err(Error::Integrity {
                expected: format!("sha1 {declared}"),
                actual: format!("sha1 {actual}"),
            });
        }

        meta.size = received;
        Ok(Self { meta, data })
    }

    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_parts(self) -> (FileMeta, Vec<u8>) {
        (self.meta, self.data)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<&'a str>,
}

impl Bucket {
    /// Metadata of one file version
    pub async fn get_file_info(&self, file_id: &str) -> Result<FileMeta> {
        if file_id.is_empty() {
            return Err(Error::Validation("no file id provided".into()));
        }

        let meta: FileMeta = self
            .session()
            .call(
                "b2_get_file_info",
                &FileRequest {
                    bucket_id: None,
                    file_name: None,
                    file_id: Some(file_id),
                },
            )
            .await?;
        Ok(meta.in_bucket(self))
    }

    /// Hide a file name so it no longer shows up in name listings
    pub async fn hide_file(&self, file_name: &str) -> Result<FileMeta> {
        if file_name.is_empty() {
            return Err(Error::Validation("no file name provided".into()));
        }

        let meta: FileMeta = self
            .session()
            .call(
                "b2_hide_file",
                &FileRequest {
                    bucket_id: Some(self.id()),
                    file_name: Some(file_name),
                    file_id: None,
                },
            )
            .await?;
        Ok(meta.in_bucket(self))
    }

    /// Permanently delete one version of a file
    pub async fn delete_file_version(&self, file_name: &str, file_id: &str) -> Result<FileMeta> {
        if file_id.is_empty() {
            return Err(Error::Validation("no file id provided".into()));
        }
        if file_name.is_empty() {
            return Err(Error::Validation("no file name provided".into()));
        }

        let meta: FileMeta = self
            .session()
            .call(
                "b2_delete_file_version",
                &FileRequest {
                    bucket_id: None,
                    file_name: Some(file_name),
                    file_id: Some(file_id),
                },
            )
            .await?;
        Ok(meta.in_bucket(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::tests::test_bucket;
    use crate::transport::{HttpResponse, MockTransport};

    const HIDDEN_CATS: &str =
        r#"{"fileId":"1","fileName":"cats.txt","action":"hide","size":0,"uploadTimestamp":1000}"#;

    #[test]
    fn test_file_meta_from_json() {
        let meta: FileMeta = serde_json::from_str(HIDDEN_CATS).unwrap();
        assert_eq!(meta.id, "1");
        assert_eq!(meta.name, "cats.txt");
        assert_eq!(meta.action, Action::Hide);
        assert_eq!(meta.size, 0);
        assert_eq!(meta.upload_timestamp, 1000);
        assert!(meta.file_info.is_empty());
        assert!(meta.bucket.is_none());
    }

    #[test]
    fn test_file_meta_accepts_nulls() {
        let meta: FileMeta = serde_json::from_str(
            r#"{"fileId":"2","fileName":"x","contentSha1":null,"contentType":null,"fileInfo":null,"action":"start"}"#,
        )
        .unwrap();
        assert_eq!(meta.content_sha1, "");
        assert_eq!(meta.action, Action::Start);
    }

    #[test]
    fn test_sha1_hex() {
        assert_eq!(
            sha1_hex(b"cats cats cats cats"),
            "78498e5096b20e3f1c063e8740ff83d595ededb3"
        );
    }

    fn meta_for(data: &[u8]) -> FileMeta {
        FileMeta {
            content_length: data.len() as u64,
            content_sha1: sha1_hex(data),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_new_verifies_checksum() {
        let data = b"some bytes".to_vec();
        let file = File::new(meta_for(&data), data.clone()).unwrap();
        assert_eq!(file.data(), data.as_slice());
        assert_eq!(file.meta().size, data.len() as u64);
        assert_eq!(sha1_hex(file.data()), file.meta().content_sha1);
    }

    #[test]
    fn test_file_new_accepts_unverified_prefix() {
        let data = b"some bytes".to_vec();
        let mut meta = meta_for(&data);
        meta.content_sha1 = format!("unverified:{}", meta.content_sha1.to_uppercase());
        assert!(File::new(meta, data).is_ok());
    }

    #[test]
    fn test_file_new_rejects_missing_checksum() {
        // Large-file uploads are served with "none"; there is nothing to verify against
        let data = b"hello".to_vec();
        let mut meta = meta_for(&data);
        meta.content_sha1 = "none".into();
        let err = File::new(meta, data).unwrap_err();
        assert!(matches!(err, Error::Integrity { ref expected, .. } if expected == "sha1 none"));
    }

    #[test]
    fn test_file_new_rejects_corruption() {
        let meta = meta_for(b"original!!");
        let err = File::new(meta, b"corrupted!".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Integrity { .. }));
    }

    #[test]
    fn test_file_new_rejects_length_mismatch() {
        let mut meta = meta_for(b"abc");
        meta.content_length = 4;
        let err = File::new(meta, b"abc".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Integrity { .. }));
    }

    #[tokio::test]
    async fn test_get_file_info_attaches_bucket() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url.ends_with("/b2api/v1/b2_get_file_info") && req.body == br#"{"fileId":"1"}"#
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, HIDDEN_CATS)));
        let bucket = test_bucket(transport);

        let meta = bucket.get_file_info("1").await.unwrap();

        assert_eq!(meta.name, "cats.txt");
        assert_eq!(meta.bucket.as_ref(), Some(&bucket));
    }

    #[tokio::test]
    async fn test_get_file_info_requires_id() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();
        let bucket = test_bucket(transport);

        let err = bucket.get_file_info("").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_hide_file() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url.ends_with("/b2_hide_file")
                    && req.body == br#"{"bucketId":"bucket-id","fileName":"cats.txt"}"#
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, HIDDEN_CATS)));
        let bucket = test_bucket(transport);

        let meta = bucket.hide_file("cats.txt").await.unwrap();
        assert_eq!(meta.action, Action::Hide);
        assert_eq!(meta.bucket, Some(bucket));
    }

    #[tokio::test]
    async fn test_delete_file_version() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url.ends_with("/b2_delete_file_version")
                    && req.body == br#"{"fileName":"cats.txt","fileId":"1"}"#
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"fileId":"1","fileName":"cats.txt"}"#)));
        let bucket = test_bucket(transport);

        let meta = bucket.delete_file_version("cats.txt", "1").await.unwrap();
        assert_eq!(meta.id, "1");
        assert_eq!(meta.bucket, Some(bucket));
    }

    #[tokio::test]
    async fn test_delete_file_version_api_error() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                400,
                r#"{"status":400,"code":"file_not_present","message":"File not present: cats.txt 1"}"#,
            ))
        });
        let bucket = test_bucket(transport);

        let err = bucket.delete_file_version("cats.txt", "1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Status: 400, Code: file_not_present, Message: File not present: cats.txt 1"
        );
    }
}
