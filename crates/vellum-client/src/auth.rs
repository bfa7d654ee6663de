//! `/auth` endpoints.

use vellum_rbac::CredentialStore;
use vellum_types::{Credentials, Identity, LoginGrant, NewUser, TokenPair};

use crate::client::{ApiClient, REFRESH_PATH, RefreshTokenBody, Request};
use crate::error::Result;

/// Authentication endpoints.
pub struct AuthApi<'c, S> {
    client: &'c mut ApiClient<S>,
}

impl<'c, S: CredentialStore> AuthApi<'c, S> {
    pub(crate) fn new(client: &'c mut ApiClient<S>) -> Self {
        Self { client }
    }

    /// `POST /auth/login`. Rejected credentials surface as a `401`
    /// [`ClientError::Api`](crate::ClientError::Api), never as an expired
    /// session.
    pub async fn login(self, credentials: &Credentials) -> Result<LoginGrant> {
        let request = Request::post("/auth/login").anonymous().json(credentials)?;
        self.client.fetch(request).await
    }

    /// `POST /auth/register`
    pub async fn register(self, draft: &NewUser) -> Result<Identity> {
        let request = Request::post("/auth/register").anonymous().json(draft)?;
        self.client.fetch(request).await
    }

    /// `POST /auth/logout`, revoking `refresh_token` on the backend.
    pub async fn logout(self, refresh_token: &str) -> Result<()> {
        let request = Request::post("/auth/logout").json(&RefreshTokenBody { refresh_token })?;
        self.client.fetch_ack(request).await
    }

    /// `GET /auth/profile`
    pub async fn profile(self) -> Result<Identity> {
        self.client.fetch(Request::get("/auth/profile")).await
    }

    /// `POST /auth/refresh-token` without touching the credential store.
    ///
    /// [`ApiClient::refresh_tokens`] is the variant that persists the pair.
    pub async fn refresh(self, refresh_token: &str) -> Result<TokenPair> {
        let request = Request::post(REFRESH_PATH)
            .anonymous()
            .json(&RefreshTokenBody { refresh_token })?;
        self.client.fetch(request).await
    }
}
