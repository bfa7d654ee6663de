//! Session flows that tie backend calls to the [`Session`].
//!
//! A [`Console`] owns the session and the [`ApiClient`] (and through it the
//! credential store). It is the only writer of the session:
//!
//! | Flow                    | Backend                         | Session afterwards          |
//! |-------------------------|---------------------------------|-----------------------------|
//! | `login`                 | login, then my-permissions      | signed in, or empty on error|
//! | `logout`                | logout (best effort)            | empty, store cleared        |
//! | `check_auth`            | my-permissions (best effort)    | restored, or empty          |
//! | `refresh_permissions`   | my-permissions                  | permission list replaced    |
//!
//! Whenever a call ends in [`ClientError::SessionExpired`] the store and the
//! session are both cleared before the error is returned.

use tracing::{info, warn};
use vellum_rbac::{Authorizer, CredentialKey, CredentialStore, Session};
use vellum_types::{Credentials, LoginGrant, PermissionRecord};

use crate::client::ApiClient;
use crate::error::{ClientError, Result};

/// Owned console state: session plus backend client.
#[derive(Debug)]
pub struct Console<S> {
    session: Session,
    client: ApiClient<S>,
}

impl<S: CredentialStore> Console<S> {
    /// Creates a console with an empty session.
    pub fn new(client: ApiClient<S>) -> Self {
        Self {
            session: Session::new(),
            client,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn authorizer(&self) -> Authorizer<'_> {
        self.session.authorizer()
    }

    /// Returns the backend client for service calls.
    ///
    /// Pass results through [`Console::settle`] so an expired session is
    /// cleared.
    pub fn client(&mut self) -> &mut ApiClient<S> {
        &mut self.client
    }

    pub fn into_client(self) -> ApiClient<S> {
        self.client
    }

    /// Signs in with `credentials`.
    ///
    /// Persists the token pair and identity, then loads the permission list.
    /// A failed permission fetch leaves the list empty. On a rejected login
    /// the session stays empty and the backend error is returned.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        self.session.logout();

        let grant = self.client.auth().login(credentials).await?;
        if let Err(e) = self.persist_grant(&grant) {
            warn!(error = %e, "Failed to persist session; clearing credentials");
            self.clear();
            return Err(e);
        }

        let permissions = self.load_permissions().await?;
        self.session.login(grant.user, permissions);
        Ok(())
    }

    /// Signs out. Never fails.
    ///
    /// The backend is asked to revoke the refresh token if one is stored;
    /// whatever happens there, persisted credentials and the session are
    /// cleared.
    pub async fn logout(&mut self) {
        let refresh_token = match self.client.store().get(CredentialKey::RefreshToken) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read refresh token for logout");
                None
            }
        };

        if let Some(refresh_token) = refresh_token
            && let Err(e) = self.client.auth().logout(&refresh_token).await
        {
            warn!(error = %e, "Backend logout failed; clearing local session anyway");
        }

        self.clear();
    }

    /// Restores a persisted session and reloads its permissions.
    ///
    /// Returns whether a session is active afterwards.
    pub async fn check_auth(&mut self) -> bool {
        if !self.session.restore(self.client.store_mut()) {
            return false;
        }

        match self.load_permissions().await {
            Ok(permissions) => {
                self.session.replace_permissions(permissions);
                true
            }
            Err(_) => false,
        }
    }

    /// Refetches the signed-in user's permissions into the session.
    ///
    /// Does nothing when nobody is signed in.
    pub async fn refresh_permissions(&mut self) -> Result<()> {
        if !self.session.is_authenticated() {
            return Ok(());
        }

        let fetched = self.client.permissions().mine().await;
        let permissions = self.settle(fetched)?;
        self.session.replace_permissions(permissions);
        Ok(())
    }

    /// Clears all local state if `result` reports an expired session.
    pub fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ClientError::SessionExpired) = &result {
            info!("Session expired; signing out");
            self.clear();
        }
        result
    }

    /// Writes the token pair and the serialized identity.
    fn persist_grant(&mut self, grant: &LoginGrant) -> Result<()> {
        self.client.store_tokens(&grant.tokens)?;
        let identity_json = serde_json::to_string(&grant.user)?;
        self.client
            .store_mut()
            .set(CredentialKey::Identity, &identity_json)
            .map_err(Into::into)
    }

    /// Best-effort permission fetch: only an expired session is an error.
    async fn load_permissions(&mut self) -> Result<Vec<PermissionRecord>> {
        let fetched = self.client.permissions().mine().await;
        match self.settle(fetched) {
            Ok(permissions) => Ok(permissions),
            Err(ClientError::SessionExpired) => Err(ClientError::SessionExpired),
            Err(e) => {
                warn!(error = %e, "Failed to load permissions; continuing with none");
                Ok(Vec::new())
            }
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.client.store_mut().clear() {
            warn!(error = %e, "Failed to clear persisted credentials");
        }
        self.session.logout();
    }
}
