//! # vellum-rbac: Session and permission evaluation
//!
//! Answers "can the current identity do X" for the Vellum admin console:
//! - **Session store** ([`Session`]): who is signed in, with which role and
//!   permission list, and whether the session is authenticated
//! - **Evaluator** ([`Authorizer`]): pure permission and role predicates
//! - **Access guard** ([`AccessGuard`]): the conjunction used to gate screens
//!   and commands
//! - **Navigation** ([`navigation`]): route redirects and sidebar sections
//! - **Credential store** ([`CredentialStore`]): persisted `token`,
//!   `refreshToken` and `identity` values used by [`Session::restore`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Login / Restore / Logout                    │
//! └─────────────────┬───────────────────────────┘
//!                   │  (only writer)
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Session                                     │
//! │  ├─ identity (role.name)                     │
//! │  ├─ permissions (ordered, opaque names)      │
//! │  └─ authenticated                            │
//! └─────────────────┬───────────────────────────┘
//!                   │  (read-only)
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Authorizer  ──►  AccessGuard / Navigation   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! | Session                 | has_permission(x)          | has_role(r)            |
//! |-------------------------|----------------------------|------------------------|
//! | not authenticated       | ✗                          | ✗                      |
//! | role `SUPER_ADMIN`      | ✓ for every `x`            | `r == "SUPER_ADMIN"`   |
//! | any other role          | `x` in permission names    | `r == role.name`       |
//!
//! ## Examples
//!
//! ```
//! use vellum_rbac::{AccessGuard, Session};
//! use vellum_types::{Identity, PermissionRecord, Role};
//!
//! let mut session = Session::new();
//! session.login(
//!     Identity::new("1", "Ada", "ada@example.com", Some(Role::new("ADMIN", "Administrator"))),
//!     vec![
//!         PermissionRecord::named("1", "users:read"),
//!         PermissionRecord::named("2", "users:update"),
//!     ],
//! );
//!
//! let auth = session.authorizer();
//! assert!(auth.has_permission("users:read"));
//! assert!(!auth.has_permission("users:delete"));
//! assert!(auth.has_all_permissions(&["users:read", "users:update"]));
//!
//! let guard = AccessGuard::new().permission("users:read").role("ADMIN");
//! assert!(guard.check(&auth).is_granted());
//! ```

pub mod credentials;
pub mod evaluator;
pub mod guard;
pub mod navigation;
pub mod permissions;
pub mod roles;
pub mod session;

// Re-export commonly used types
pub use credentials::{
    CredentialError, CredentialKey, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
pub use evaluator::Authorizer;
pub use guard::{AccessGuard, Decision, Denial};
pub use navigation::{NavSection, Route, RouteOutcome};
pub use permissions::PermissionSet;
pub use roles::RoleRuleError;
pub use session::Session;

// Kani proofs for bounded model checking
#[cfg(kani)]
mod kani_proofs;
