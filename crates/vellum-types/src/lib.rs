//! # vellum-types: Core types for `Vellum`
//!
//! This crate contains the shared record shapes used across the console:
//! - Entity IDs ([`UserId`], [`RoleId`], [`PermissionId`])
//! - Principals ([`Identity`], [`Role`])
//! - Capability grants ([`PermissionRecord`])
//! - Backend records ([`UserRecord`], [`RoleRecord`], [`UserPage`], [`Pagination`])
//! - Authentication payloads ([`Credentials`], [`TokenPair`], [`LoginGrant`])
//! - Request drafts ([`NewUser`], [`UserUpdate`], [`RoleDraft`], [`UserQuery`])
//!
//! All records serialize with camelCase field names, matching the REST
//! backend's JSON.

use std::fmt::{self, Debug, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Backend identifier of a user account.
    UserId
}

string_id! {
    /// Backend identifier of a role.
    RoleId
}

string_id! {
    /// Backend identifier of a permission grant.
    PermissionId
}

// ============================================================================
// Principals
// ============================================================================

/// A role assigned to an identity.
///
/// Roles are plain values. Two names are distinguished:
/// [`Role::SUPER_ADMIN`] bypasses every permission check, and
/// [`Role::ADMIN`] is protected from deletion alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Role {
    /// Sentinel name of the role that passes every permission check.
    pub const SUPER_ADMIN: &'static str = "SUPER_ADMIN";

    /// Name of the built-in administrator role.
    pub const ADMIN: &'static str = "ADMIN";

    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns whether this is the super-admin sentinel role.
    ///
    /// Exact, case-sensitive comparison: `super_admin` is an ordinary role.
    pub fn is_super_admin(&self) -> bool {
        self.name == Self::SUPER_ADMIN
    }

    /// Returns whether this role is one of the built-in roles that the
    /// console refuses to delete or re-permission.
    pub fn is_protected(&self) -> bool {
        is_protected_role_name(&self.name)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Returns whether `name` is a built-in protected role name.
pub fn is_protected_role_name(name: &str) -> bool {
    name == Role::SUPER_ADMIN || name == Role::ADMIN
}

/// The authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Accounts without a role are valid; they simply match no role check.
    #[serde(default)]
    pub role: Option<Role>,
}

impl Identity {
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Option<Role>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    /// Returns the role name, if a role is assigned.
    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.name.as_str())
    }

    /// Returns whether this identity holds the super-admin role.
    pub fn is_super_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_super_admin)
    }
}

// ============================================================================
// Capability Grants
// ============================================================================

/// A named capability grant.
///
/// `name` is the canonical key used by every permission check. It is
/// conventionally `"<resource>:<action>"`, but matching treats it as an
/// opaque, case-sensitive string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
}

impl PermissionRecord {
    pub fn new(
        id: impl Into<PermissionId>,
        name: impl Into<String>,
        description: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Builds a record from a `"<resource>:<action>"` name.
    ///
    /// Convenience for fixtures and local grants; the resource and action
    /// fields are informational only.
    pub fn named(id: impl Into<PermissionId>, name: impl Into<String>) -> Self {
        let name = name.into();
        let (resource, action) = name
            .split_once(':')
            .map_or((String::new(), String::new()), |(r, a)| {
                (r.to_string(), a.to_string())
            });
        Self {
            id: id.into(),
            description: String::new(),
            name,
            resource,
            action,
        }
    }
}

// ============================================================================
// Backend Records
// ============================================================================

/// A user account as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A role together with the permissions granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<PermissionRecord>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RoleRecord {
    /// Returns whether the console must refuse to delete or re-permission
    /// this role.
    pub fn is_protected(&self) -> bool {
        is_protected_role_name(&self.name)
    }
}

/// Page metadata returned with user listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_users: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of a user listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPage {
    pub users: Vec<UserRecord>,
    pub pagination: Pagination,
}

// ============================================================================
// Authentication Payloads
// ============================================================================

/// Login credentials. `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An access/refresh token pair. `Debug` redacts both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Successful login response: the identity plus its token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    pub user: Identity,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

// ============================================================================
// Request Drafts
// ============================================================================

/// Body for creating a user account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .field("image", &self.image)
            .finish()
    }
}

/// Partial update of a user account. Absent fields are left unchanged.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Only sent when the operator typed a new password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    /// Returns whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.role_id.is_none()
            && self.image.is_none()
            && self.password.is_none()
    }
}

impl Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("role_id", &self.role_id)
            .field("image", &self.image)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Body for creating or updating a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Query parameters for user listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl UserQuery {
    /// Default page size used by the user management screen.
    pub const DEFAULT_LIMIT: u32 = 10;
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            search: None,
        }
    }
}
