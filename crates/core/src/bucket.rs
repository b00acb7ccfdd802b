//! Bucket handles and bucket lifecycle calls
//!
//! A [`Bucket`] is a cheap, cloneable handle. Clones share the same session,
//! visibility, and upload-URL pool, and compare equal only to each other.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::Session;
use crate::upload_url::UploadUrlPool;

/// Bucket visibility
///
/// Types this client does not know (e.g. `snapshot`) are kept verbatim and
/// treated as private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BucketType {
    /// Downloads require the account's bearer token
    AllPrivate,
    /// Anyone can download
    AllPublic,
    Other(String),
}

impl BucketType {
    pub fn as_str(&self) -> &str {
        match self {
            BucketType::AllPrivate => "allPrivate",
            BucketType::AllPublic => "allPublic",
            BucketType::Other(name) => name,
        }
    }
}

impl From<String> for BucketType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "allPrivate" => BucketType::AllPrivate,
            "allPublic" => BucketType::AllPublic,
            _ => BucketType::Other(name),
        }
    }
}

impl From<BucketType> for String {
    fn from(bucket_type: BucketType) -> Self {
        match bucket_type {
            BucketType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BucketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allPrivate" | "private" => Ok(BucketType::AllPrivate),
            "allPublic" | "public" => Ok(BucketType::AllPublic),
            other => Err(Error::Validation(format!("unknown bucket type: {other}"))),
        }
    }
}

/// Bucket record as the service returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketRecord {
    bucket_id: String,
    bucket_name: String,
    bucket_type: BucketType,
}

#[derive(Debug, Deserialize)]
struct ListBucketsResponse {
    buckets: Vec<BucketRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketRequest<'a> {
    account_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_type: Option<BucketType>,
}

struct BucketInner {
    id: String,
    name: String,
    bucket_type: Mutex<BucketType>,
    session: Arc<Session>,
    upload_urls: UploadUrlPool,
}

/// A named container for files
#[derive(Clone)]
pub struct Bucket {
    inner: Arc<BucketInner>,
}

impl Bucket {
    /// Attach a session to a bucket known by id and name
    pub fn new(
        session: Arc<Session>,
        id: impl Into<String>,
        name: impl Into<String>,
        bucket_type: BucketType,
    ) -> Self {
        Self {
            inner: Arc::new(BucketInner {
                id: id.into(),
                name: name.into(),
                bucket_type: Mutex::new(bucket_type),
                session,
                upload_urls: UploadUrlPool::default(),
            }),
        }
    }

    fn from_record(session: &Arc<Session>, record: BucketRecord) -> Self {
        Self::new(
            Arc::clone(session),
            record.bucket_id,
            record.bucket_name,
            record.bucket_type,
        )
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn bucket_type(&self) -> BucketType {
        self.inner
            .bucket_type
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Anything but `allPublic` needs the bearer token to download
    pub fn is_private(&self) -> bool {
        self.bucket_type() != BucketType::AllPublic
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    /// The bucket's pool of pre-authorized upload endpoints
    pub fn upload_urls(&self) -> &UploadUrlPool {
        &self.inner.upload_urls
    }

    /// Change the bucket's visibility
    pub async fn update(&self, bucket_type: BucketType) -> Result<()> {
        let session = self.session();
        let record: BucketRecord = session
            .call(
                "b2_update_bucket",
                &BucketRequest {
                    account_id: session.account_id(),
                    bucket_id: Some(self.id()),
                    bucket_name: None,
                    bucket_type: Some(bucket_type),
                },
            )
            .await?;

        *self
            .inner
            .bucket_type
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = record.bucket_type;
        Ok(())
    }

    /// Delete the bucket; the service refuses if it still holds files
    pub async fn delete(&self) -> Result<()> {
        let session = self.session();
        let _: BucketRecord = session
            .call(
                "b2_delete_bucket",
                &BucketRequest {
                    account_id: session.account_id(),
                    bucket_id: Some(self.id()),
                    bucket_name: None,
                    bucket_type: None,
                },
            )
            .await?;
        Ok(())
    }
}

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Bucket {}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("bucket_type", &self.bucket_type())
            .field("upload_urls", &self.inner.upload_urls.len())
            .finish()
    }
}

impl Session {
    /// List all buckets of the account
    pub async fn list_buckets(self: &Arc<Self>) -> Result<Vec<Bucket>> {
        let response: ListBucketsResponse = self
            .call(
                "b2_list_buckets",
                &BucketRequest {
                    account_id: self.account_id(),
                    bucket_id: None,
                    bucket_name: None,
                    bucket_type: None,
                },
            )
            .await?;

        Ok(response
            .buckets
            .into_iter()
            .map(|record| Bucket::from_record(self, record))
            .collect())
    }

    /// Create a bucket
    pub async fn create_bucket(self: &Arc<Self>, name: &str, bucket_type: BucketType) -> Result<Bucket> {
        if name.is_empty() {
            return Err(Error::Validation("bucket name cannot be empty".into()));
        }

        let record: BucketRecord = self
            .call(
                "b2_create_bucket",
                &BucketRequest {
                    account_id: self.account_id(),
                    bucket_id: None,
                    bucket_name: Some(name),
                    bucket_type: Some(bucket_type),
                },
            )
            .await?;

        tracing::debug!(bucket = name, bucket_id = %record.bucket_id, "Bucket created");
        Ok(Bucket::from_record(self, record))
    }

    /// Find a bucket by name
    pub async fn bucket(self: &Arc<Self>, name: &str) -> Result<Bucket> {
        self.list_buckets()
            .await?
            .into_iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| Error::BucketNotFound(name.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::tests::test_session;
    use crate::transport::{HttpResponse, MockTransport};

    /// A private bucket on a session wired to `transport`
    pub(crate) fn test_bucket(transport: MockTransport) -> Bucket {
        Bucket::new(test_session(transport), "bucket-id", "cats", BucketType::AllPrivate)
    }

    fn body_json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn test_bucket_type_serde() {
        assert_eq!(
            serde_json::to_string(&BucketType::AllPublic).unwrap(),
            "\"allPublic\""
        );
        let t: BucketType = serde_json::from_str("\"allPrivate\"").unwrap();
        assert_eq!(t, BucketType::AllPrivate);
        let t: BucketType = serde_json::from_str("\"snapshot\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"snapshot\"");
        assert_eq!("public".parse::<BucketType>().unwrap(), BucketType::AllPublic);
        assert!("snapshot".parse::<BucketType>().is_err());
    }

    #[tokio::test]
    async fn test_list_buckets_attaches_session() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url == "https://api.example.com/b2api/v1/b2_list_buckets"
                    && req.header_value("Authorization") == Some("auth-token")
                    && body_json(&req.body) == serde_json::json!({"accountId": "acct"})
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"buckets":[
                        {"bucketId":"1","bucketName":"a","bucketType":"allPrivate"},
                        {"bucketId":"2","bucketName":"b","bucketType":"allPublic"}
                    ]}"#,
                ))
            });
        let session = test_session(transport);

        let buckets = session.list_buckets().await.unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].id(), "1");
        assert!(buckets[0].is_private());
        assert_eq!(buckets[1].name(), "b");
        assert_eq!(buckets[1].bucket_type(), BucketType::AllPublic);
        assert!(buckets.iter().all(|b| Arc::ptr_eq(b.session(), &session)));
    }

    #[tokio::test]
    async fn test_list_buckets_keeps_unknown_type() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(2).returning(|_| {
            Ok(HttpResponse::new(
                200,
                r#"{"buckets":[
                    {"bucketId":"1","bucketName":"a","bucketType":"allPrivate"},
                    {"bucketId":"2","bucketName":"snaps","bucketType":"snapshot"}
                ]}"#,
            ))
        });
        let session = test_session(transport);

        let buckets = session.list_buckets().await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].bucket_type(), BucketType::Other("snapshot".into()));
        assert_eq!(buckets[1].bucket_type().to_string(), "snapshot");
        assert!(buckets[1].is_private());

        assert_eq!(session.bucket("a").await.unwrap().id(), "1");
    }

    #[tokio::test]
    async fn test_create_bucket() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url.ends_with("/b2_create_bucket")
                    && body_json(&req.body)
                        == serde_json::json!({
                            "accountId": "acct",
                            "bucketName": "dogs",
                            "bucketType": "allPublic"
                        })
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"bucketId":"9","bucketName":"dogs","bucketType":"allPublic","accountId":"acct"}"#,
                ))
            });
        let session = test_session(transport);

        let bucket = session.create_bucket("dogs", BucketType::AllPublic).await.unwrap();
        assert_eq!(bucket.id(), "9");
        assert_eq!(bucket.name(), "dogs");
        assert!(!bucket.is_private());
        assert!(bucket.upload_urls().is_empty());
    }

    #[tokio::test]
    async fn test_create_bucket_error() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                400,
                r#"{"status":400,"code":"duplicate_bucket_name","message":"taken"}"#,
            ))
        });
        let session = test_session(transport);

        let err = session.create_bucket("dogs", BucketType::AllPrivate).await.unwrap_err();
        assert_eq!(err.as_api().unwrap().code, "duplicate_bucket_name");
    }

    #[tokio::test]
    async fn test_update_bucket_changes_visibility() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url.ends_with("/b2_update_bucket")
                    && body_json(&req.body)
                        == serde_json::json!({
                            "accountId": "acct",
                            "bucketId": "bucket-id",
                            "bucketType": "allPublic"
                        })
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"bucketId":"bucket-id","bucketName":"cats","bucketType":"allPublic"}"#,
                ))
            });
        let bucket = test_bucket(transport);
        let clone = bucket.clone();

        bucket.update(BucketType::AllPublic).await.unwrap();

        assert_eq!(clone.bucket_type(), BucketType::AllPublic);
    }

    #[tokio::test]
    async fn test_update_bucket_error_keeps_visibility() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                401,
                r#"{"status":401,"code":"unauthorized","message":"no"}"#,
            ))
        });
        let bucket = test_bucket(transport);

        assert!(bucket.update(BucketType::AllPublic).await.is_err());
        assert_eq!(bucket.bucket_type(), BucketType::AllPrivate);
    }

    #[tokio::test]
    async fn test_delete_bucket() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url.ends_with("/b2_delete_bucket")
                    && body_json(&req.body)
                        == serde_json::json!({"accountId": "acct", "bucketId": "bucket-id"})
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"bucketId":"bucket-id","bucketName":"cats","bucketType":"allPrivate"}"#,
                ))
            });

        test_bucket(transport).delete().await.unwrap();
    }

    #[tokio::test]
    async fn test_bucket_lookup_by_name() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(2).returning(|_| {
            Ok(HttpResponse::new(
                200,
                r#"{"buckets":[{"bucketId":"1","bucketName":"a","bucketType":"allPrivate"}]}"#,
            ))
        });
        let session = test_session(transport);

        assert_eq!(session.bucket("a").await.unwrap().id(), "1");
        assert!(matches!(
            session.bucket("zzz").await,
            Err(Error::BucketNotFound(_))
        ));
    }

    #[test]
    fn test_bucket_equality_is_identity() {
        let bucket = test_bucket(MockTransport::new());
        let same = bucket.clone();
        let other = Bucket::new(
            Arc::clone(bucket.session()),
            "bucket-id",
            "cats",
            BucketType::AllPrivate,
        );
        assert_eq!(bucket, same);
        assert_ne!(bucket, other);
    }
}
