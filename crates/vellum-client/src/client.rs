//! REST transport.
//!
//! Every request is JSON in, `{ "data": ... }` envelope out. The access
//! token is read from the credential store on each request, so a refresh
//! performed by one call is seen by the next.
//!
//! On a `401` for an authenticated request the client makes exactly one
//! repair attempt:
//!
//! ```text
//! request ──► 401 ──► POST /auth/refresh-token ──► ok ──► store pair ──► retry once
//!                                │                                        │
//!                                └── fail / no refresh token              └── 401 again
//!                                          │                                    │
//!                                          ▼                                    ▼
//!                         clear token + refreshToken, Err(SessionExpired)
//! ```

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use vellum_rbac::{CredentialKey, CredentialStore};
use vellum_types::TokenPair;

use crate::auth::AuthApi;
use crate::error::{ClientError, Result};
use crate::permissions::PermissionsApi;
use crate::roles::RolesApi;
use crate::users::UsersApi;

pub(crate) const REFRESH_PATH: &str = "/auth/refresh-token";

/// Whether a request carries the bearer token and takes part in refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    Anonymous,
}

/// A request that can be sent more than once.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    method: Method,
    path: String,
    auth: Auth,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl Request {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            auth: Auth::Bearer,
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sends without the bearer token and never triggers a refresh.
    pub(crate) fn anonymous(mut self) -> Self {
        self.auth = Auth::Anonymous;
        self
    }

    pub(crate) fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenBody<'a> {
    pub(crate) refresh_token: &'a str,
}

/// REST client for the document-management backend.
///
/// Owns the credential store: tokens obtained at login or refresh are
/// written to it, and a failed refresh removes them.
#[derive(Debug)]
pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: String,
    store: S,
}

impl<S: CredentialStore> ApiClient<S> {
    /// Creates a client with its own connection pool and request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration, store: S) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url, store))
    }

    /// Creates a client around an existing `reqwest` client.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>, store: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    pub fn auth(&mut self) -> AuthApi<'_, S> {
        AuthApi::new(self)
    }

    pub fn users(&mut self) -> UsersApi<'_, S> {
        UsersApi::new(self)
    }

    pub fn roles(&mut self) -> RolesApi<'_, S> {
        RolesApi::new(self)
    }

    pub fn permissions(&mut self) -> PermissionsApi<'_, S> {
        PermissionsApi::new(self)
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    /// Persists a fresh token pair.
    pub fn store_tokens(&mut self, tokens: &TokenPair) -> Result<()> {
        self.store.set(CredentialKey::Token, &tokens.access_token)?;
        self.store.set(CredentialKey::RefreshToken, &tokens.refresh_token)?;
        Ok(())
    }

    /// Exchanges the stored refresh token for a new pair.
    ///
    /// On any failure the stored tokens are removed and
    /// [`ClientError::SessionExpired`] is returned.
    pub async fn refresh_tokens(&mut self) -> Result<()> {
        let refresh_token = self
            .store
            .get(CredentialKey::RefreshToken)?
            .filter(|token| !token.is_empty());

        let Some(refresh_token) = refresh_token else {
            debug!("No refresh token stored");
            self.expire();
            return Err(ClientError::SessionExpired);
        };

        let request = Request::post(REFRESH_PATH).anonymous().json(&RefreshTokenBody {
            refresh_token: &refresh_token,
        })?;

        let outcome = async {
            let response = self.dispatch(&request).await?;
            decode::<TokenPair>(&read_body(response).await?)
        }
        .await;

        match outcome {
            Ok(tokens) => {
                self.store_tokens(&tokens)?;
                info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.expire();
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// Removes both tokens. The stored identity is left for the caller.
    fn expire(&mut self) {
        for key in [CredentialKey::Token, CredentialKey::RefreshToken] {
            if let Err(e) = self.store.remove(key) {
                warn!(key = %key, error = %e, "Failed to remove expired credential");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Sends `request` and unwraps the `data` envelope.
    pub(crate) async fn fetch<T: DeserializeOwned>(&mut self, request: Request) -> Result<T> {
        let body = self.execute(&request).await?;
        decode(&body)
    }

    /// Sends `request` and discards the response body.
    pub(crate) async fn fetch_ack(&mut self, request: Request) -> Result<()> {
        self.execute(&request).await.map(drop)
    }

    async fn execute(&mut self, request: &Request) -> Result<Vec<u8>> {
        let response = self.dispatch(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.auth == Auth::Anonymous {
            return read_body(response).await;
        }

        debug!(method = %request.method, path = %request.path, "Access token rejected");
        self.refresh_tokens().await?;

        let retried = self.dispatch(request).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!(method = %request.method, path = %request.path, "Rejected again after refresh");
            self.expire();
            return Err(ClientError::SessionExpired);
        }
        read_body(retried).await
    }

    async fn dispatch(&self, request: &Request) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if request.auth == Auth::Bearer
            && let Some(token) = self
                .store
                .get(CredentialKey::Token)?
                .filter(|token| !token.is_empty())
        {
            builder = builder.bearer_auth(token);
        }

        Ok(builder.send().await?)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok(envelope.data)
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(body.to_vec());
    }

    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Picks `message` (or `error`) from an error body, falling back to the
/// status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
