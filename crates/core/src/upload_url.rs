//! Upload-URL pool
//!
//! Uploads go to a bucket-scoped endpoint obtained from `b2_get_upload_url`,
//! each with its own token. The service does not say how long they live; the
//! client assumes 24 hours from issuance.
//!
//! Each [`Bucket`] owns one [`UploadUrlPool`]. Handing out a URL removes it
//! from the pool (a checkout), so no two in-flight uploads ever share one.
//! The [`UploadUrlLease`] returned by [`Bucket::acquire_upload_url`] puts the
//! URL back on [`release`](UploadUrlLease::release); a lease that is dropped
//! without being released takes its URL with it.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::Result;

/// Assumed lifetime of an upload URL
pub const UPLOAD_URL_LIFETIME: SignedDuration = SignedDuration::from_hours(24);

/// A pre-authorized upload endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct UploadUrl {
    pub upload_url: String,
    pub authorization_token: String,
    pub expiration: Timestamp,
}

impl UploadUrl {
    /// An upload URL issued at `issued_at`
    pub fn new(
        upload_url: impl Into<String>,
        authorization_token: impl Into<String>,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            upload_url: upload_url.into(),
            authorization_token: authorization_token.into(),
            expiration: issued_at + UPLOAD_URL_LIFETIME,
        }
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expiration
    }
}

impl fmt::Debug for UploadUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadUrl")
            .field("upload_url", &self.upload_url)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GetUploadUrlRequest<'a> {
    bucket_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUploadUrlResponse {
    upload_url: String,
    authorization_token: String,
}

/// Idle upload URLs of one bucket, oldest first
#[derive(Debug, Default)]
pub struct UploadUrlPool {
    urls: Mutex<VecDeque<UploadUrl>>,
}

impl UploadUrlPool {
    fn lock(&self) -> MutexGuard<'_, VecDeque<UploadUrl>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of idle URLs (checked-out URLs are not counted)
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append an idle URL
    pub fn push(&self, url: UploadUrl) {
        self.lock().push_back(url);
    }

    /// Copy of the idle URLs, in pool order
    pub fn snapshot(&self) -> Vec<UploadUrl> {
        self.lock().iter().cloned().collect()
    }

    /// Drop every URL expired at `now`; returns how many were dropped
    pub fn clean_at(&self, now: Timestamp) -> usize {
        let mut urls = self.lock();
        let before = urls.len();
        urls.retain(|url| !url.is_expired_at(now));
        before - urls.len()
    }

    /// Purge expired URLs, then take the oldest remaining one out of the pool
    pub fn checkout_at(&self, now: Timestamp) -> Option<UploadUrl> {
        let mut urls = self.lock();
        urls.retain(|url| !url.is_expired_at(now));
        urls.pop_front()
    }
}

/// Exclusive use of one upload URL
///
/// Dereferences to the [`UploadUrl`].
pub struct UploadUrlLease {
    bucket: Bucket,
    url: Option<UploadUrl>,
}

impl UploadUrlLease {
    fn new(bucket: Bucket, url: UploadUrl) -> Self {
        Self {
            bucket,
            url: Some(url),
        }
    }

    /// Return the URL to its bucket's pool for the next upload
    pub fn release(mut self) {
        if let Some(url) = self.url.take() {
            self.bucket.upload_urls().push(url);
        }
    }

    /// Throw the URL away, e.g. after the service rejected an upload to it
    pub fn discard(mut self) {
        self.url = None;
    }
}

impl Deref for UploadUrlLease {
    type Target = UploadUrl;

    fn deref(&self) -> &UploadUrl {
        // Only `release` and `discard` take the URL, and both consume the lease.
        self.url.as_ref().unwrap_or_else(|| unreachable!("lease used after release"))
    }
}

impl Drop for UploadUrlLease {
    fn drop(&mut self) {
        if let Some(url) = self.url.take() {
            tracing::debug!(bucket = self.bucket.name(), url = %url.upload_url, "Discarding unreleased upload URL");
        }
    }
}

impl fmt::Debug for UploadUrlLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadUrlLease")
            .field("bucket", &self.bucket.name())
            .field("url", &self.url)
            .finish()
    }
}

impl Bucket {
    /// Drop expired upload URLs from the pool
    pub fn clean_upload_urls(&self) {
        let removed = self.upload_urls().clean_at(Timestamp::now());
        if removed > 0 {
            tracing::debug!(bucket = self.name(), removed, "Purged expired upload URLs");
        }
    }

    /// Check out an upload URL, fetching a new one when the pool has none left
    ///
    /// If fetching fails the pool is left as it was.
    pub async fn acquire_upload_url(&self) -> Result<UploadUrlLease> {
        if let Some(url) = self.upload_urls().checkout_at(Timestamp::now()) {
            tracing::debug!(bucket = self.name(), url = %url.upload_url, "Reusing upload URL");
            return Ok(UploadUrlLease::new(self.clone(), url));
        }

        let url = self.fetch_upload_url().await?;
        Ok(UploadUrlLease::new(self.clone(), url))
    }

    /// Fetch a new upload URL and add it to the pool
    pub async fn get_upload_url(&self) -> Result<UploadUrl> {
        let url = self.fetch_upload_url().await?;
        self.upload_urls().push(url.clone());
        Ok(url)
    }

    async fn fetch_upload_url(&self) -> Result<UploadUrl> {
        let response: GetUploadUrlResponse = self
            .session()
            .call("b2_get_upload_url", &GetUploadUrlRequest { bucket_id: self.id() })
            .await?;

        tracing::debug!(bucket = self.name(), url = %response.upload_url, "Fetched new upload URL");
        Ok(UploadUrl::new(
            response.upload_url,
            response.authorization_token,
            Timestamp::now(),
        ))
    }
}
