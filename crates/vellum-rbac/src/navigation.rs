//! Route access and sidebar sections.
//!
//! | Path            | Access        | Section          | Permission          |
//! |-----------------|---------------|------------------|---------------------|
//! | `/login`        | public only   |                  |                     |
//! | `/`             | redirect      |                  |                     |
//! | `/dashboard`    | protected     | Dashboard        |                     |
//! | `/documents`    | protected     | Documents        | `documents:read`    |
//! | `/users`        | protected     | User Management  | `users:read`        |
//! | `/roles`        | protected     | Role Management  | `roles:read`        |
//! | `/permissions`  | protected     | Permissions      | `permissions:read`  |
//!
//! Any other path redirects to `/`. Protected routes only require a signed-in
//! user; the section permission decides whether the section is listed.

use std::fmt;

use crate::guard::AccessGuard;
use crate::permissions::names;
use crate::session::Session;

/// Upper bound on redirects followed by [`resolve_final`].
const MAX_REDIRECTS: usize = 4;

/// A console route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Root,
    Dashboard,
    Documents,
    Users,
    Roles,
    Permissions,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Self::Login,
        Self::Root,
        Self::Dashboard,
        Self::Documents,
        Self::Users,
        Self::Roles,
        Self::Permissions,
    ];

    /// Parses a path. Trailing slashes are ignored; unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Root => "/",
            Self::Dashboard => "/dashboard",
            Self::Documents => "/documents",
            Self::Users => "/users",
            Self::Roles => "/roles",
            Self::Permissions => "/permissions",
        }
    }

    /// Returns whether the route needs a signed-in user.
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login | Self::Root)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of resolving one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Render(Route),
    Redirect(Route),
}

/// Resolves `path` for `session`, one step.
pub fn resolve(path: &str, session: &Session) -> RouteOutcome {
    let Some(route) = Route::parse(path) else {
        return RouteOutcome::Redirect(Route::Root);
    };

    match route {
        Route::Root => RouteOutcome::Redirect(Route::Dashboard),
        Route::Login if session.is_authenticated() => RouteOutcome::Redirect(Route::Dashboard),
        r if r.is_protected() && !session.is_authenticated() => {
            RouteOutcome::Redirect(Route::Login)
        }
        r => RouteOutcome::Render(r),
    }
}

/// Follows redirects from `path` until a route renders.
///
/// The table has no cycles; the hop limit falls back to the login screen.
pub fn resolve_final(path: &str, session: &Session) -> Route {
    let mut outcome = resolve(path, session);
    for _ in 0..MAX_REDIRECTS {
        match outcome {
            RouteOutcome::Render(route) => return route,
            RouteOutcome::Redirect(next) => outcome = resolve(next.path(), session),
        }
    }
    match outcome {
        RouteOutcome::Render(route) => route,
        RouteOutcome::Redirect(_) => Route::Login,
    }
}

/// A sidebar section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavSection {
    pub label: &'static str,
    pub route: Route,
    /// Permission required to list the section, if any.
    pub permission: Option<&'static str>,
}

impl NavSection {
    /// Returns the guard that decides whether the section is listed.
    pub fn guard(&self) -> AccessGuard {
        match self.permission {
            Some(name) => AccessGuard::new().permission(name),
            None => AccessGuard::new(),
        }
    }
}

/// Sidebar sections in display order.
pub const SECTIONS: [NavSection; 5] = [
    NavSection {
        label: "Dashboard",
        route: Route::Dashboard,
        permission: None,
    },
    NavSection {
        label: "Documents",
        route: Route::Documents,
        permission: Some(names::DOCUMENTS_READ),
    },
    NavSection {
        label: "User Management",
        route: Route::Users,
        permission: Some(names::USERS_READ),
    },
    NavSection {
        label: "Role Management",
        route: Route::Roles,
        permission: Some(names::ROLES_READ),
    },
    NavSection {
        label: "Permissions",
        route: Route::Permissions,
        permission: Some(names::PERMISSIONS_READ),
    },
];

/// Returns the sections `session` may see. Empty when nobody is signed in.
pub fn visible_sections(session: &Session) -> Vec<&'static NavSection> {
    if !session.is_authenticated() {
        return Vec::new();
    }

    let auth = session.authorizer();
    SECTIONS
        .iter()
        .filter(|section| section.guard().allows(&auth))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use vellum_types::{Identity, PermissionRecord, Role};

    fn signed_in(role: &str, perms: &[&str]) -> Session {
        let mut session = Session::new();
        session.login(
            Identity::new("1", "Demo", "demo@example.com", Some(Role::new(role, ""))),
            perms
                .iter()
                .enumerate()
                .map(|(i, name)| PermissionRecord::named(i.to_string(), *name))
                .collect(),
        );
        session
    }

    #[test_case("/login", RouteOutcome::Render(Route::Login) ; "login renders")]
    #[test_case("/dashboard", RouteOutcome::Redirect(Route::Login) ; "dashboard needs login")]
    #[test_case("/users/", RouteOutcome::Redirect(Route::Login) ; "trailing slash")]
    #[test_case("/", RouteOutcome::Redirect(Route::Dashboard) ; "root")]
    #[test_case("/nowhere", RouteOutcome::Redirect(Route::Root) ; "unknown path")]
    fn test_resolve_signed_out(path: &str, expected: RouteOutcome) {
        assert_eq!(resolve(path, &Session::new()), expected);
    }

    #[test_case("/login", RouteOutcome::Redirect(Route::Dashboard) ; "login bounces")]
    #[test_case("/dashboard", RouteOutcome::Render(Route::Dashboard) ; "dashboard renders")]
    #[test_case("/roles", RouteOutcome::Render(Route::Roles) ; "protected renders")]
    #[test_case("", RouteOutcome::Redirect(Route::Dashboard) ; "empty path is root")]
    fn test_resolve_signed_in(path: &str, expected: RouteOutcome) {
        assert_eq!(resolve(path, &signed_in("ADMIN", &[])), expected);
    }

    #[test]
    fn test_resolve_final_follows_redirects() {
        assert_eq!(resolve_final("/anything", &Session::new()), Route::Login);
        assert_eq!(
            resolve_final("/anything", &signed_in("ADMIN", &[])),
            Route::Dashboard
        );
        assert_eq!(resolve_final("/login", &signed_in("ADMIN", &[])), Route::Dashboard);
    }

    #[test]
    fn test_route_parse_roundtrip() {
        for route in Route::ALL {
            assert_eq!(Route::parse(route.path()), Some(route));
        }
        assert_eq!(Route::parse("/Users"), None);
    }

    #[test]
    fn test_visible_sections_follow_permissions() {
        let session = signed_in("ADMIN", &["users:read", "roles:read"]);
        let labels: Vec<&str> = visible_sections(&session)
            .iter()
            .map(|s| s.label)
            .collect();

        assert_eq!(labels, vec!["Dashboard", "User Management", "Role Management"]);
    }

    #[test]
    fn test_visible_sections_super_admin_sees_all() {
        let session = signed_in("SUPER_ADMIN", &[]);
        assert_eq!(visible_sections(&session).len(), SECTIONS.len());
    }

    #[test]
    fn test_visible_sections_signed_out() {
        assert!(visible_sections(&Session::new()).is_empty());
    }
}
