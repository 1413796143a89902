use anyhow::{Context, Result};
use async_trait::async_trait;
use auth_core::{BlobStore, DocumentStore, IdentityProvider, ProviderError, USERS_COLLECTION};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{CreatedAccount, SessionResult, Uid, UserProfileRecord},
    error::{ApiError, EMAIL_IN_USE_CODE},
};
use tracing::debug;
use url::Url;

/// REST client for the identity/storage backend. One instance implements
/// all three storage-facing seams over a shared connection pool, so the
/// controllers stay oblivious to the transport.
pub struct RestBackend {
    http: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AccountRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    uid: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    ok: bool,
    #[serde(default)]
    uid: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: &Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }
}

/// Maps a non-2xx backend response to a typed provider error. A `409` with
/// the well-known duplicate-email code becomes `EmailAlreadyInUse`; every
/// other body keeps its code for the caller's logs.
async fn provider_error(response: Response) -> ProviderError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(body) if body.code == EMAIL_IN_USE_CODE => ProviderError::EmailAlreadyInUse,
        Ok(body) => ProviderError::Backend {
            code: body.code,
            message: body.message,
        },
        Err(_) => ProviderError::Backend {
            code: format!("http/{}", status.as_u16()),
            message: "backend returned a non-JSON error body".into(),
        },
    }
}

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CreatedAccount, ProviderError> {
        let response = self
            .http
            .post(format!("{}/accounts", self.base_url))
            .json(&AccountRequest { email, password })
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let body: AccountResponse = response.json().await.map_err(anyhow::Error::from)?;
        debug!(uid = %body.uid, "account created");
        Ok(CreatedAccount {
            uid: Uid(body.uid),
            email: body.email,
        })
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionResult, ProviderError> {
        let response = self
            .http
            .post(format!("{}/sessions", self.base_url))
            .json(&AccountRequest { email, password })
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        // A rejection arrives as a 200 with `ok: false`; only transport and
        // backend faults are errors.
        let body: SessionResponse = response.json().await.map_err(anyhow::Error::from)?;
        Ok(SessionResult {
            established: body.ok,
            user_id: body.uid.map(Uid),
        })
    }
}

#[async_trait]
impl BlobStore for RestBackend {
    async fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<()> {
        let url = format!("{}/blobs/{key}", self.base_url);
        let mut request = self.http.put(&url).body(data.to_vec());
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("blob upload to {url} failed"))?;
        response
            .error_for_status()
            .with_context(|| format!("blob store rejected key {key}"))?;
        debug!(key, bytes = data.len(), "blob stored");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RestBackend {
    async fn set_user_record(&self, uid: &Uid, record: &UserProfileRecord) -> Result<()> {
        let url = format!("{}/documents/{USERS_COLLECTION}/{uid}", self.base_url);
        let response = self
            .http
            .put(&url)
            .json(record)
            .send()
            .await
            .with_context(|| format!("document write to {url} failed"))?;
        response
            .error_for_status()
            .with_context(|| format!("document store rejected uid {uid}"))?;
        debug!(%uid, "profile record written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
