//! Permission and role predicates.
//!
//! Every predicate is total and side-effect free. Unauthenticated sessions
//! are denied before any permission data is looked at, so stale lists left
//! behind by a logout can never grant access.

use vellum_types::PermissionRecord;

use crate::session::Session;

/// Read-only evaluator over a [`Session`].
#[derive(Debug, Clone, Copy)]
pub struct Authorizer<'s> {
    session: &'s Session,
}

impl<'s> Authorizer<'s> {
    /// Creates an evaluator over `session`.
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    /// Returns the session being evaluated.
    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Returns whether the session holds the super-admin role.
    pub fn is_super_admin(&self) -> bool {
        self.session.is_authenticated()
            && self
                .session
                .identity()
                .is_some_and(vellum_types::Identity::is_super_admin)
    }

    /// Returns whether the session may use permission `name`.
    ///
    /// 1. Unauthenticated sessions are denied
    /// 2. `SUPER_ADMIN` passes every check, listed or not
    /// 3. Otherwise a record named exactly `name` must be present
    pub fn has_permission(&self, name: &str) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }

        if self.is_super_admin() {
            return true;
        }

        self.session.permissions().contains(name)
    }

    /// Returns whether at least one of `names` passes. Empty input is denied.
    pub fn has_any_permission<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.has_permission(name.as_ref()))
    }

    /// Returns whether every one of `names` passes.
    ///
    /// Empty input is granted (vacuous truth).
    pub fn has_all_permissions<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.has_permission(name.as_ref()))
    }

    /// Returns whether the session's role is named exactly `name`.
    pub fn has_role(&self, name: &str) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }

        self.session
            .identity()
            .and_then(vellum_types::Identity::role_name)
            == Some(name)
    }

    /// Returns whether the session's role is one of `names`. Empty input is denied.
    pub fn has_any_role<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.has_role(name.as_ref()))
    }

    /// Pairs every catalog entry with whether the session holds it.
    pub fn effective_permissions<'c>(
        &self,
        catalog: &'c [PermissionRecord],
    ) -> Vec<(&'c PermissionRecord, bool)> {
        catalog
            .iter()
            .map(|record| (record, self.has_permission(&record.name)))
            .collect()
    }
}
