//! Access guard.
//!
//! An [`AccessGuard`] is a conjunction of optional criteria evaluated against
//! an [`Authorizer`]. Criteria are checked in a fixed order and the first one
//! that fails is reported in the [`Decision`]:
//!
//! 1. single `permission`
//! 2. `permissions` set, all or any according to `require_all`
//! 3. single `role`
//! 4. `roles` set, any
//!
//! A criterion that was never set (or an empty set) does not block. A guard
//! with no criteria gates nothing; whether the route needs a signed-in user
//! is decided by [`navigation`](crate::navigation).

use std::fmt;

use tracing::debug;

use crate::evaluator::Authorizer;

/// Why a guard denied access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The single required permission is missing.
    Permission(String),
    /// None (or not all, when `require_all`) of the permission set passed.
    Permissions {
        names: Vec<String>,
        require_all: bool,
    },
    /// The session's role does not match the required role.
    Role(String),
    /// The session's role is not in the role set.
    Roles(Vec<String>),
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission(name) => write!(f, "missing permission '{name}'"),
            Self::Permissions {
                names,
                require_all: true,
            } => write!(f, "missing one of the permissions [{}]", names.join(", ")),
            Self::Permissions {
                names,
                require_all: false,
            } => write!(f, "needs any of the permissions [{}]", names.join(", ")),
            Self::Role(name) => write!(f, "requires role '{name}'"),
            Self::Roles(names) => write!(f, "requires one of the roles [{}]", names.join(", ")),
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied(Denial),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns the failing criterion, if access was denied.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Granted => None,
            Self::Denied(denial) => Some(denial),
        }
    }
}

/// Builder for a conjunction of permission and role criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessGuard {
    permission: Option<String>,
    permissions: Vec<String>,
    require_all: bool,
    role: Option<String>,
    roles: Vec<String>,
}

impl AccessGuard {
    /// Creates a guard with no criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the single permission `name`.
    pub fn permission(mut self, name: impl Into<String>) -> Self {
        self.permission = Some(name.into());
        self
    }

    /// Requires any of `names` (or all of them, see [`Self::require_all`]).
    pub fn permissions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Switches the permission set from "any" to "all".
    pub fn require_all(mut self, require_all: bool) -> Self {
        self.require_all = require_all;
        self
    }

    /// Requires the session's role to be exactly `name`.
    pub fn role(mut self, name: impl Into<String>) -> Self {
        self.role = Some(name.into());
        self
    }

    /// Requires the session's role to be one of `names`.
    pub fn roles<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = names.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether no criterion has been set.
    pub fn is_unrestricted(&self) -> bool {
        self.permission.is_none()
            && self.permissions.is_empty()
            && self.role.is_none()
            && self.roles.is_empty()
    }

    /// Evaluates the guard.
    pub fn check(&self, auth: &Authorizer<'_>) -> Decision {
        let decision = self.evaluate(auth);
        if let Decision::Denied(denial) = &decision {
            debug!(
                user_id = auth.session().identity().map(|i| i.id.as_str()),
                reason = %denial,
                "Access denied"
            );
        }
        decision
    }

    /// Shorthand for `check(auth).is_granted()`.
    pub fn allows(&self, auth: &Authorizer<'_>) -> bool {
        self.check(auth).is_granted()
    }

    fn evaluate(&self, auth: &Authorizer<'_>) -> Decision {
        if let Some(name) = &self.permission
            && !auth.has_permission(name)
        {
            return Decision::Denied(Denial::Permission(name.clone()));
        }

        if !self.permissions.is_empty() {
            let passed = if self.require_all {
                auth.has_all_permissions(&self.permissions)
            } else {
                auth.has_any_permission(&self.permissions)
            };
            if !passed {
                return Decision::Denied(Denial::Permissions {
                    names: self.permissions.clone(),
                    require_all: self.require_all,
                });
            }
        }

        if let Some(name) = &self.role
            && !auth.has_role(name)
        {
            return Decision::Denied(Denial::Role(name.clone()));
        }

        if !self.roles.is_empty() && !auth.has_any_role(&self.roles) {
            return Decision::Denied(Denial::Roles(self.roles.clone()));
        }

        Decision::Granted
    }
}
