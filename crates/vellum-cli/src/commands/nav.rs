//! Navigation: which console sections the session can reach.

use anyhow::Result;
use serde_json::json;
use vellum_rbac::navigation::{self, RouteOutcome, visible_sections};

use super::Context;
use crate::style::{self, colors::SemanticStyle};

/// Without a path, lists the visible sections. With one, shows how the
/// path resolves for the current session.
pub async fn run(ctx: &Context, path: Option<&str>) -> Result<()> {
    let (console, _) = ctx.restored().await?;
    let session = console.session();

    if let Some(path) = path {
        let first = navigation::resolve(path, session);
        let landed = navigation::resolve_final(path, session);

        if ctx.json {
            let redirected = matches!(first, RouteOutcome::Redirect(_));
            return style::print_json(&json!({
                "path": path,
                "route": landed.path(),
                "redirected": redirected,
            }));
        }

        match first {
            RouteOutcome::Render(route) => {
                println!("{} renders {}", path.code(), route.to_string().success());
            }
            RouteOutcome::Redirect(_) => {
                println!("{} redirects to {}", path.code(), landed.to_string().warning());
            }
        }
        return Ok(());
    }

    let sections = visible_sections(session);

    if ctx.json {
        let entries: Vec<_> = sections
            .iter()
            .map(|s| json!({ "label": s.label, "path": s.route.path() }))
            .collect();
        return style::print_json(&entries);
    }

    if sections.is_empty() {
        style::print_warn("Not signed in: only /login is reachable");
        style::print_hint("Run 'vellum login' to sign in");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = sections
        .iter()
        .map(|s| {
            vec![
                s.label.to_string(),
                s.route.path().to_string(),
                super::or_dash(s.permission),
            ]
        })
        .collect();
    style::print_record_table(&["Section", "Path", "Requires"], &rows, "section");
    Ok(())
}
