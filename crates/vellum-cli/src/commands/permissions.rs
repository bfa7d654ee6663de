//! Permission catalog commands.

use anyhow::Result;
use serde_json::json;
use vellum_rbac::AccessGuard;
use vellum_rbac::permissions::{self, names};
use vellum_types::PermissionRecord;

use super::{AppConsole, Context, authorize, settle};
use crate::style::{self, colors::SemanticStyle};

pub async fn list(ctx: &Context, search: Option<&str>, group: bool) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    let catalog = fetch_catalog(&mut console).await?;
    let matched = permissions::search(&catalog, search.unwrap_or_default());

    if ctx.json {
        return style::print_json(&matched);
    }

    if !group {
        let rows: Vec<Vec<String>> = matched.iter().map(|p| permission_row(p)).collect();
        style::print_record_table(
            &["ID", "Name", "Resource", "Action", "Description"],
            &rows,
            "permission",
        );
        return Ok(());
    }

    let groups = permissions::group_by_resource(matched.iter().copied());
    if groups.is_empty() {
        println!("{}", "No permissions found.".muted());
    }
    for (resource, members) in groups {
        println!("{} {}", resource.header(), format!("({})", members.len()).muted());
        for p in members {
            println!("  {:<24} {}", p.name.code(), p.description.muted());
        }
        style::print_spacer();
    }
    Ok(())
}

/// Shows the session's permissions, or with `catalog` every permission
/// marked granted or missing.
pub async fn mine(ctx: &Context, catalog: bool) -> Result<()> {
    let mut console = ctx.signed_in().await?;

    if !catalog {
        let granted: Vec<&PermissionRecord> = console.session().permissions().iter().collect();
        if ctx.json {
            return style::print_json(&granted);
        }
        if console.authorizer().is_super_admin() {
            style::print_hint("SUPER_ADMIN passes every permission check");
        }
        let rows: Vec<Vec<String>> = granted.iter().map(|p| permission_row(p)).collect();
        style::print_record_table(
            &["ID", "Name", "Resource", "Action", "Description"],
            &rows,
            "permission",
        );
        return Ok(());
    }

    let records = fetch_catalog(&mut console).await?;
    let auth = console.authorizer();
    let report = auth.effective_permissions(&records);

    if ctx.json {
        let entries: Vec<_> = report
            .iter()
            .map(|(p, granted)| json!({ "name": p.name, "granted": granted }))
            .collect();
        return style::print_json(&entries);
    }

    let rows: Vec<Vec<String>> = report
        .iter()
        .map(|(p, granted)| {
            let mark = if *granted { "✓".success() } else { "✗".error() };
            vec![mark, p.name.clone(), p.description.clone()]
        })
        .collect();
    style::print_record_table(&["", "Permission", "Description"], &rows, "permission");

    let granted = report.iter().filter(|(_, granted)| *granted).count();
    println!(
        "{}",
        format!("{granted} of {} granted", report.len()).muted()
    );
    Ok(())
}

async fn fetch_catalog(console: &mut AppConsole) -> Result<Vec<PermissionRecord>> {
    authorize(console, &AccessGuard::new().permission(names::PERMISSIONS_READ))?;

    let spinner = style::create_spinner("Loading permissions...");
    let fetched = console.client().permissions().list().await;
    style::finish_and_clear(&spinner);
    settle(console, fetched, "list permissions")
}

fn permission_row(p: &PermissionRecord) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.name.clone(),
        super::or_dash(Some(p.resource.as_str())),
        super::or_dash(Some(p.action.as_str())),
        p.description.clone(),
    ]
}
