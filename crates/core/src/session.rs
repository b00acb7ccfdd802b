//! Account authorization and the session it yields
//!
//! A [`Session`] is created once per authorization and never changes
//! afterwards; re-authorizing produces a new one. Buckets and file records
//! keep an `Arc<Session>` so they can issue further requests.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::{HttpRequest, Transport};

/// Account authorization endpoint of the public service
pub const DEFAULT_AUTH_URL: &str = "https://api.backblazeb2.com/b2api/v1/b2_authorize_account";

/// Path prefix of every versioned API call
const API_PREFIX: &str = "/b2api/v1/";

/// What the authorization exchange returns
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedAccount {
    pub account_id: String,
    pub authorization_token: String,
    pub api_url: String,
    pub download_url: String,
}

/// An authorized account: identity, bearer token, and service endpoints
pub struct Session {
    account_id: String,
    application_key_id: String,
    authorization_token: String,
    api_url: String,
    download_url: String,
    transport: Arc<dyn Transport>,
}

impl Session {
    /// Authorize with an application key
    ///
    /// Sends a single Basic-auth GET to `auth_url`. Any non-200 answer is
    /// returned as the service's error and no session is built.
    pub async fn authorize(
        transport: Arc<dyn Transport>,
        auth_url: &str,
        application_key_id: &str,
        application_key: &str,
    ) -> Result<Arc<Self>> {
        let credentials = STANDARD.encode(format!("{application_key_id}:{application_key}"));
        let request = HttpRequest::get(auth_url).header("Authorization", format!("Basic {credentials}"));

        tracing::debug!(url = auth_url, "Authorizing account");
        let account: AuthorizedAccount = transport.send(request).await?.into_json()?;
        tracing::debug!(account_id = %account.account_id, api_url = %account.api_url, "Account authorized");

        Ok(Arc::new(Self::new(transport, application_key_id, account)))
    }

    /// Build a session from an authorization obtained elsewhere
    pub fn new(
        transport: Arc<dyn Transport>,
        application_key_id: impl Into<String>,
        account: AuthorizedAccount,
    ) -> Self {
        Self {
            account_id: account.account_id,
            application_key_id: application_key_id.into(),
            authorization_token: account.authorization_token,
            api_url: account.api_url.trim_end_matches('/').to_string(),
            download_url: account.download_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn application_key_id(&self) -> &str {
        &self.application_key_id
    }

    pub fn authorization_token(&self) -> &str {
        &self.authorization_token
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Full URL of an API operation, e.g. `b2_list_buckets`
    pub(crate) fn api_endpoint(&self, operation: &str) -> String {
        format!("{}{API_PREFIX}{operation}", self.api_url)
    }

    /// Full URL of an operation served from the download host
    pub(crate) fn download_endpoint(&self, operation: &str) -> String {
        format!("{}{API_PREFIX}{operation}", self.download_url)
    }

    /// POST a typed JSON body with the bearer token and decode the 200 answer
    pub(crate) async fn call<B, T>(&self, operation: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = HttpRequest::post(self.api_endpoint(operation))
            .header("Authorization", self.authorization_token.as_str())
            .json(body)?;

        tracing::debug!(operation, "Calling API");
        self.transport.send(request).await?.into_json()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account_id", &self.account_id)
            .field("application_key_id", &self.application_key_id)
            .field("api_url", &self.api_url)
            .field("download_url", &self.download_url)
            .finish_non_exhaustive()
    }
}
