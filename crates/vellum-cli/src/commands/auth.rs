//! Sign-in, sign-out and session introspection commands.

use anyhow::{Context as _, Result, bail};
use dialoguer::{Input, Password};
use serde::Serialize;
use vellum_rbac::{AccessGuard, Decision, Session};
use vellum_types::Credentials;

use super::{Context, read_stdin_line};
use crate::style::{self, colors::SemanticStyle};

/// What `whoami --json` and `login --json` print.
#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    role: Option<&'a str>,
    super_admin: bool,
    permissions: Vec<&'a str>,
}

impl<'a> SessionReport<'a> {
    fn from_session(session: &'a Session) -> Option<Self> {
        let identity = session.identity()?;
        Some(Self {
            id: identity.id.as_str(),
            name: &identity.name,
            email: &identity.email,
            role: identity.role_name(),
            super_admin: identity.is_super_admin(),
            permissions: session.permissions().names().collect(),
        })
    }
}

/// Sign in and persist the session.
pub async fn login(ctx: &Context, email: Option<String>, password_stdin: bool) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = if password_stdin {
        read_stdin_line()?
    } else {
        Password::new().with_prompt("Password").interact()?
    };

    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        bail!("Email and password are both required");
    }

    let mut console = ctx.console()?;
    let spinner = style::create_spinner("Signing in...");
    let result = console.login(&Credentials::new(email, password)).await;
    style::finish_and_clear(&spinner);
    result.context("Login failed")?;

    let session = console.session();
    if ctx.json {
        return style::print_json(&SessionReport::from_session(session));
    }

    if let Some(identity) = session.identity() {
        style::print_success(&format!("Signed in as {}", identity.name.header()));
        style::print_labeled("Email", &identity.email);
        style::print_labeled("Role", identity.role_name().unwrap_or("none"));
        style::print_labeled("Permissions", &session.permissions().len().to_string());
    }
    Ok(())
}

/// Sign out. Succeeds even when the backend is unreachable.
pub async fn logout(ctx: &Context) -> Result<()> {
    let mut console = ctx.console()?;
    let spinner = style::create_spinner("Signing out...");
    console.logout().await;
    style::finish_and_clear(&spinner);

    style::print_success("Signed out");
    Ok(())
}

/// Show the signed-in identity.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let console = ctx.signed_in().await?;
    let session = console.session();
    let Some(report) = SessionReport::from_session(session) else {
        bail!("Not signed in. Run 'vellum login' first.");
    };

    if ctx.json {
        return style::print_json(&report);
    }

    let role = match (report.role, report.super_admin) {
        (Some(role), true) => format!("{role} (all permissions)"),
        (Some(role), false) => role.to_string(),
        (None, _) => "none".to_string(),
    };
    style::print_info_table(&[
        ("ID", report.id.to_string()),
        ("Name", report.name.to_string()),
        ("Email", report.email.to_string()),
        ("Role", role),
        ("Permissions", report.permissions.len().to_string()),
    ]);
    Ok(())
}

/// Check permission and role requirements against the current session.
///
/// Exits non-zero when the check is denied, so it can gate shell scripts.
pub async fn can(
    ctx: &Context,
    permissions: Vec<String>,
    require_all: bool,
    roles: Vec<String>,
) -> Result<()> {
    if permissions.is_empty() && roles.is_empty() {
        bail!("Nothing to check. Pass permission names and/or --role");
    }

    let (console, active) = ctx.restored().await?;
    if !active {
        bail!("Denied: not signed in");
    }

    let guard = build_guard(permissions, require_all, roles);
    match guard.check(&console.authorizer()) {
        Decision::Granted => {
            if ctx.json {
                return style::print_json(&serde_json::json!({ "granted": true }));
            }
            style::print_success("Granted");
            Ok(())
        }
        Decision::Denied(denial) => {
            if ctx.json {
                style::print_json(&serde_json::json!({
                    "granted": false,
                    "reason": denial.to_string(),
                }))?;
            }
            bail!("Denied: {denial}")
        }
    }
}

/// A single name becomes a plain permission check; several become a set.
fn build_guard(permissions: Vec<String>, require_all: bool, roles: Vec<String>) -> AccessGuard {
    let mut guard = AccessGuard::new();
    match permissions.len() {
        0 => {}
        1 => {
            guard = guard.permission(permissions.into_iter().next().unwrap_or_default());
        }
        _ => guard = guard.permissions(permissions).require_all(require_all),
    }
    if !roles.is_empty() {
        guard = guard.roles(roles);
    }
    guard
}
