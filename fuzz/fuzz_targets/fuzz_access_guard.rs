#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vellum_rbac::{AccessGuard, Decision, Session};
use vellum_types::{Identity, PermissionRecord, Role};

#[derive(Debug, Arbitrary)]
struct Scenario {
    authenticated: bool,
    role: Option<String>,
    granted: Vec<String>,
    permission: Option<String>,
    permissions: Vec<String>,
    require_all: bool,
    required_role: Option<String>,
    required_roles: Vec<String>,
}

fuzz_target!(|s: Scenario| {
    let mut session = Session::new();
    if s.authenticated {
        let records = s
            .granted
            .iter()
            .enumerate()
            .map(|(i, name)| PermissionRecord::named(i.to_string().as_str(), name.as_str()))
            .collect();
        session.login(
            Identity::new(
                "1",
                "Fuzz",
                "fuzz@example.com",
                s.role.as_deref().map(|r| Role::new(r, "")),
            ),
            records,
        );
    }
    let auth = session.authorizer();

    let mut guard = AccessGuard::new()
        .permissions(s.permissions.iter().map(String::as_str))
        .require_all(s.require_all)
        .roles(s.required_roles.iter().map(String::as_str));
    if let Some(name) = &s.permission {
        guard = guard.permission(name.as_str());
    }
    if let Some(role) = &s.required_role {
        guard = guard.role(role.as_str());
    }

    let decision = guard.check(&auth);

    // The guard is exactly the conjunction of its evaluator checks.
    let expected = s.permission.as_deref().is_none_or(|p| auth.has_permission(p))
        && (s.permissions.is_empty()
            || if s.require_all {
                auth.has_all_permissions(&s.permissions)
            } else {
                auth.has_any_permission(&s.permissions)
            })
        && s.required_role.as_deref().is_none_or(|r| auth.has_role(r))
        && (s.required_roles.is_empty() || auth.has_any_role(&s.required_roles));

    assert_eq!(decision.is_granted(), expected);
    assert_eq!(decision.denial().is_some(), !expected);
    assert_eq!(guard.allows(&auth), expected);

    if !s.authenticated && !guard.is_unrestricted() {
        assert!(matches!(decision, Decision::Denied(_)));
    }
});
