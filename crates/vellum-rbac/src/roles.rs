//! Rules for editing the role catalog.
//!
//! The built-in `SUPER_ADMIN` and `ADMIN` roles are managed by the backend
//! seed and cannot be deleted, renamed, re-described or have their
//! permissions changed from the console. `SUPER_ADMIN` is never offered when assigning roles to users.

use thiserror::Error;
use vellum_types::{Role, RoleRecord, is_protected_role_name};

/// Error type for role catalog rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleRuleError {
    #[error("role '{0}' is built in and cannot be deleted")]
    Undeletable(String),

    #[error("permissions of built-in role '{0}' cannot be edited")]
    PermissionsLocked(String),

    #[error("built-in role '{0}' cannot be renamed or re-described")]
    Locked(String),
}

/// Result type for role catalog rules.
pub type Result<T> = std::result::Result<T, RoleRuleError>;

/// Fails if `role` may not be deleted.
pub fn ensure_deletable(role: &RoleRecord) -> Result<()> {
    if is_protected_role_name(&role.name) {
        return Err(RoleRuleError::Undeletable(role.name.clone()));
    }
    Ok(())
}

/// Fails if the name or description of `role` may not be changed.
pub fn ensure_editable(role: &RoleRecord) -> Result<()> {
    if is_protected_role_name(&role.name) {
        return Err(RoleRuleError::Locked(role.name.clone()));
    }
    Ok(())
}

/// Fails if the permission set of `role` may not be replaced.
pub fn ensure_permissions_editable(role: &RoleRecord) -> Result<()> {
    if is_protected_role_name(&role.name) {
        return Err(RoleRuleError::PermissionsLocked(role.name.clone()));
    }
    Ok(())
}

/// Filters `roles` down to those that may be assigned to a user.
pub fn assignable_roles(roles: &[RoleRecord]) -> Vec<&RoleRecord> {
    roles
        .iter()
        .filter(|role| role.name != Role::SUPER_ADMIN)
        .collect()
}
