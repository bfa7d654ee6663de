//! Permission lists held by a session, and catalog helpers.
//!
//! A [`PermissionSet`] keeps the records exactly as the backend returned
//! them. Membership is by exact `name` match; resource and action fields are
//! informational.

use serde::{Deserialize, Serialize};
use vellum_types::PermissionRecord;

/// Well-known permission names used by the console's screens.
pub mod names {
    pub const DOCUMENTS_READ: &str = "documents:read";
    pub const DOCUMENTS_CREATE: &str = "documents:create";
    pub const DOCUMENTS_UPDATE: &str = "documents:update";
    pub const DOCUMENTS_DELETE: &str = "documents:delete";

    pub const USERS_READ: &str = "users:read";
    pub const USERS_CREATE: &str = "users:create";
    pub const USERS_UPDATE: &str = "users:update";
    pub const USERS_DELETE: &str = "users:delete";

    pub const ROLES_READ: &str = "roles:read";
    pub const ROLES_CREATE: &str = "roles:create";
    pub const ROLES_UPDATE: &str = "roles:update";
    pub const ROLES_DELETE: &str = "roles:delete";

    pub const PERMISSIONS_READ: &str = "permissions:read";
}

/// Ordered list of permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: Vec<PermissionRecord>,
}

impl PermissionSet {
    /// Creates a permission set holding `permissions` as given.
    pub fn new(permissions: Vec<PermissionRecord>) -> Self {
        Self { permissions }
    }

    /// Creates an empty permission set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether some record is named exactly `name`.
    ///
    /// Linear scan; lists are tens of entries.
    pub fn contains(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == name)
    }

    /// Returns all records in backend order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionRecord> {
        self.permissions.iter()
    }

    /// Returns the permission names in backend order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn as_slice(&self) -> &[PermissionRecord] {
        &self.permissions
    }
}

impl From<Vec<PermissionRecord>> for PermissionSet {
    fn from(permissions: Vec<PermissionRecord>) -> Self {
        Self::new(permissions)
    }
}

/// Case-insensitive search over name, description and resource.
///
/// An empty or whitespace-only term matches everything.
pub fn search<'a>(catalog: &'a [PermissionRecord], term: &str) -> Vec<&'a PermissionRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return catalog.iter().collect();
    }

    catalog
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&term)
                || p.description.to_lowercase().contains(&term)
                || p.resource.to_lowercase().contains(&term)
        })
        .collect()
}

/// Groups records by `resource`, keeping groups in first-seen order.
pub fn group_by_resource<'a, I>(records: I) -> Vec<(&'a str, Vec<&'a PermissionRecord>)>
where
    I: IntoIterator<Item = &'a PermissionRecord>,
{
    let mut groups: Vec<(&'a str, Vec<&'a PermissionRecord>)> = Vec::new();
    for record in records {
        match groups
            .iter_mut()
            .find(|(resource, _)| *resource == record.resource)
        {
            Some((_, members)) => members.push(record),
            None => groups.push((record.resource.as_str(), vec![record])),
        }
    }
    groups
}
