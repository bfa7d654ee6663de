//! Kani bounded model checking proofs for session evaluation.
//!
//! - Proof #1: Unauthenticated sessions deny every permission and role
//! - Proof #2: The super-admin role passes every permission check
//! - Proof #3: Logout is idempotent and always fails closed
//! - Proof #4: Empty name lists (any → deny, all → grant)
//!
//! ```bash
//! cargo kani --package vellum-rbac
//! ```

use crate::{AccessGuard, Session};
use vellum_types::{Identity, PermissionRecord, Role};

const CANDIDATES: [&str; 4] = ["users:read", "users:delete", "roles:update", "documents:read"];
const ROLES: [&str; 4] = ["SUPER_ADMIN", "ADMIN", "EDITOR", "super_admin"];

fn any_candidate() -> &'static str {
    let idx: usize = kani::any();
    kani::assume(idx < CANDIDATES.len());
    CANDIDATES[idx]
}

fn any_role() -> &'static str {
    let idx: usize = kani::any();
    kani::assume(idx < ROLES.len());
    ROLES[idx]
}

fn signed_in(role: &str, granted: &str) -> Session {
    let mut session = Session::new();
    session.login(
        Identity::new("1", "Demo", "demo@example.com", Some(Role::new(role, ""))),
        vec![PermissionRecord::named("1", granted)],
    );
    session
}

//=============================================================================
// Proof #1: Unauthenticated Denial
//=============================================================================

/// **Property**: After logout, no permission or role check passes, even with
/// a super-admin identity and a non-empty permission list beforehand.
#[kani::proof]
#[kani::unwind(6)]
fn verify_unauthenticated_denies() {
    let mut session = signed_in(any_role(), any_candidate());
    session.logout();

    let auth = session.authorizer();
    let probe = any_candidate();

    assert!(!auth.has_permission(probe));
    assert!(!auth.has_role(any_role()));
    assert!(!AccessGuard::new().permission(probe).allows(&auth));
}

//=============================================================================
// Proof #2: Super-Admin Bypass
//=============================================================================

/// **Property**: `SUPER_ADMIN` passes any permission, listed or not; the
/// lowercase spelling is an ordinary role.
#[kani::proof]
#[kani::unwind(6)]
fn verify_super_admin_bypass() {
    let granted = any_candidate();
    let probe = any_candidate();

    let root = signed_in("SUPER_ADMIN", granted);
    assert!(root.authorizer().has_permission(probe));

    let lookalike = signed_in("super_admin", granted);
    assert_eq!(lookalike.authorizer().has_permission(probe), probe == granted);
}

//=============================================================================
// Proof #3: Logout Idempotence
//=============================================================================

#[kani::proof]
#[kani::unwind(6)]
fn verify_logout_idempotent() {
    let mut session = signed_in(any_role(), any_candidate());
    session.logout();
    let once = session.clone();
    session.logout();

    assert_eq!(session, once);
    assert!(!session.is_authenticated());
    assert!(session.identity().is_none());
}

//=============================================================================
// Proof #4: Empty Name Lists
//=============================================================================

#[kani::proof]
#[kani::unwind(6)]
fn verify_empty_name_lists() {
    let session = signed_in(any_role(), any_candidate());
    let auth = session.authorizer();
    let none: [&str; 0] = [];

    assert!(!auth.has_any_permission(&none));
    assert!(auth.has_all_permissions(&none));
    assert!(!auth.has_any_role(&none));
}
