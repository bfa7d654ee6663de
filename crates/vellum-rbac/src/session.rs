//! Session store.
//!
//! The single source of truth for who is signed in. A [`Session`] is an
//! owned value: flows that change it take `&mut Session`, everything that
//! only decides access borrows it through [`Session::authorizer`].
//!
//! Lifecycle:
//! - created empty
//! - populated atomically by [`Session::login`] or a successful
//!   [`Session::restore`]
//! - cleared atomically by [`Session::logout`] or a failed restore

use tracing::{debug, info, warn};
use vellum_types::{Identity, PermissionRecord};

use crate::credentials::{CredentialKey, CredentialStore};
use crate::evaluator::Authorizer;
use crate::permissions::PermissionSet;

/// Current identity, permission list and authentication flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
    permissions: PermissionSet,
    authenticated: bool,
}

impl Session {
    /// Creates an empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `identity` as signed in with exactly `permissions`.
    ///
    /// Replaces any previous session state.
    pub fn login(&mut self, identity: Identity, permissions: Vec<PermissionRecord>) {
        info!(
            user_id = %identity.id,
            role = identity.role_name().unwrap_or("<none>"),
            permissions = permissions.len(),
            "Session established"
        );

        self.identity = Some(identity);
        self.permissions = PermissionSet::from(permissions);
        self.authenticated = true;
    }

    /// Clears the session. Safe to call when nobody is signed in.
    pub fn logout(&mut self) {
        if self.authenticated {
            info!("Session cleared");
        }
        *self = Self::default();
    }

    /// Rebuilds the session from persisted credentials.
    ///
    /// Requires both a non-empty `token` and an `identity` record. On
    /// success the identity is signed in with an empty permission list
    /// (callers refetch permissions afterwards) and `true` is returned.
    ///
    /// Fails closed: if the store cannot be read or the stored identity does
    /// not parse, every persisted key is cleared, the session is left empty
    /// and `false` is returned. Missing values also return `false` but leave
    /// the store untouched.
    pub fn restore(&mut self, store: &mut dyn CredentialStore) -> bool {
        self.logout();

        let stored = store
            .get(CredentialKey::Token)
            .and_then(|token| Ok((token, store.get(CredentialKey::Identity)?)));

        let (token, raw_identity) = match stored {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Persisted credentials unreadable; clearing");
                discard(store);
                return false;
            }
        };

        let raw_identity = match (token.as_deref(), raw_identity) {
            (Some(token), Some(raw)) if !token.is_empty() => raw,
            _ => {
                debug!("No persisted session to restore");
                return false;
            }
        };

        match serde_json::from_str::<Identity>(&raw_identity) {
            Ok(identity) => {
                self.login(identity, Vec::new());
                true
            }
            Err(e) => {
                warn!(error = %e, "Persisted identity is invalid; clearing");
                discard(store);
                false
            }
        }
    }

    /// Replaces the permission list of an authenticated session.
    ///
    /// Ignored when nobody is signed in, so a late permission fetch cannot
    /// resurrect data for a session that has since logged out.
    pub fn replace_permissions(&mut self, permissions: Vec<PermissionRecord>) {
        if !self.authenticated {
            debug!("Ignoring permission update for unauthenticated session");
            return;
        }
        self.permissions = PermissionSet::from(permissions);
    }

    /// Returns the signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the permission list as last stored.
    ///
    /// Only meaningful while [`Session::is_authenticated`] is true.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the read-only evaluator over this session.
    pub fn authorizer(&self) -> Authorizer<'_> {
        Authorizer::new(self)
    }
}

fn discard(store: &mut dyn CredentialStore) {
    if let Err(e) = store.clear() {
        warn!(error = %e, "Failed to clear persisted credentials");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use vellum_types::Role;

    fn admin() -> Identity {
        Identity::new(
            "1",
            "Demo User",
            "demo@example.com",
            Some(Role::new("ADMIN", "Administrator")),
        )
    }

    fn persisted(token: Option<&str>, identity: Option<&str>) -> MemoryCredentialStore {
        let mut store = MemoryCredentialStore::new();
        if let Some(token) = token {
            store.set(CredentialKey::Token, token).unwrap();
            store
                .set(CredentialKey::RefreshToken, "refresh-token")
                .unwrap();
        }
        if let Some(identity) = identity {
            store.set(CredentialKey::Identity, identity).unwrap();
        }
        store
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.identity().is_none());
        assert!(session.permissions().is_empty());
    }

    #[test]
    fn test_login_stores_exact_permissions() {
        let mut session = Session::new();
        let perms = vec![
            PermissionRecord::named("2", "users:update"),
            PermissionRecord::named("1", "users:read"),
        ];

        session.login(admin(), perms.clone());

        assert!(session.is_authenticated());
        assert_eq!(session.identity(), Some(&admin()));
        assert_eq!(session.permissions().as_slice(), perms.as_slice());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut session = Session::new();
        session.login(admin(), vec![PermissionRecord::named("1", "users:read")]);

        session.logout();
        let once = session.clone();
        session.logout();

        assert_eq!(session, once);
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_restore_success() {
        let json = serde_json::to_string(&admin()).unwrap();
        let mut store = persisted(Some("token"), Some(&json));
        let mut session = Session::new();

        assert!(session.restore(&mut store));
        assert!(session.is_authenticated());
        assert_eq!(session.identity(), Some(&admin()));
        assert!(session.permissions().is_empty());
        assert!(!store.is_empty());
    }

    #[test]
    fn test_restore_corrupt_identity_clears_store() {
        let mut store = persisted(Some("token"), Some("{not json"));
        let mut session = Session::new();

        assert!(!session.restore(&mut store));
        assert!(!session.is_authenticated());
        assert!(store.is_empty());
        assert!(!session.authorizer().has_permission("users:read"));
    }

    #[test]
    fn test_restore_wrong_shape_clears_store() {
        let mut store = persisted(Some("token"), Some(r#"{"id":"1","name":"x"}"#));
        let mut session = Session::new();

        assert!(!session.restore(&mut store));
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_without_token_leaves_store() {
        let json = serde_json::to_string(&admin()).unwrap();
        let mut store = persisted(None, Some(&json));
        let mut session = Session::new();

        assert!(!session.restore(&mut store));
        assert!(!session.is_authenticated());
        assert_eq!(
            store.get(CredentialKey::Identity).unwrap().as_deref(),
            Some(json.as_str())
        );
    }

    #[test]
    fn test_restore_failure_clears_previous_session() {
        let mut session = Session::new();
        session.login(admin(), vec![PermissionRecord::named("1", "users:read")]);

        let mut store = persisted(Some("token"), Some("garbage"));
        assert!(!session.restore(&mut store));
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_replace_permissions_requires_authentication() {
        let mut session = Session::new();
        session.replace_permissions(vec![PermissionRecord::named("1", "users:read")]);
        assert!(session.permissions().is_empty());

        session.login(admin(), Vec::new());
        session.replace_permissions(vec![PermissionRecord::named("1", "users:read")]);
        assert!(session.permissions().contains("users:read"));
    }
}
