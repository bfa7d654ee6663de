//! Role management commands.
//!
//! Built-in roles are checked locally before any destructive request.

use anyhow::{Result, bail};
use vellum_rbac::permissions::names;
use vellum_rbac::{AccessGuard, roles};
use vellum_types::{PermissionId, RoleDraft, RoleId, RoleRecord};

use super::{AppConsole, Context, authorize, confirm, settle};
use crate::style::{self, colors::SemanticStyle};

pub async fn list(ctx: &Context, assignable: bool) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_READ))?;

    let spinner = style::create_spinner("Loading roles...");
    let fetched = console.client().roles().list().await;
    style::finish_and_clear(&spinner);

    let catalog = settle(&mut console, fetched, "list roles")?;
    let shown: Vec<&RoleRecord> = if assignable {
        roles::assignable_roles(&catalog)
    } else {
        catalog.iter().collect()
    };
    print_roles(ctx, &shown)
}

pub async fn search(ctx: &Context, term: &str) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_READ))?;

    let fetched = console.client().roles().search(term).await;
    let found = settle(&mut console, fetched, "search roles")?;
    print_roles(ctx, &found.iter().collect::<Vec<_>>())
}

pub async fn show(ctx: &Context, id: &str) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_READ))?;

    let role = fetch_role(&mut console, id).await?;
    if ctx.json {
        return style::print_json(&role);
    }

    let mut entries = vec![
        ("ID", role.id.to_string()),
        ("Name", role.name.clone()),
        ("Description", super::or_dash(Some(role.description.as_str()))),
        ("Permissions", role.permissions.len().to_string()),
    ];
    if role.is_protected() {
        entries.push(("Built in", "yes".to_string()));
    }
    style::print_info_table(&entries);

    if !role.permissions.is_empty() {
        style::print_spacer();
        let rows: Vec<Vec<String>> = role
            .permissions
            .iter()
            .map(|p| vec![p.id.to_string(), p.name.clone(), p.description.clone()])
            .collect();
        style::print_record_table(&["ID", "Permission", "Description"], &rows, "permission");
    }
    Ok(())
}

pub async fn create(ctx: &Context, name: String, description: String) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_CREATE))?;

    if name.trim().is_empty() {
        bail!("A role name is required");
    }
    let draft = RoleDraft { name, description };

    let created = console.client().roles().create(&draft).await;
    let role = settle(&mut console, created, "create role")?;
    if ctx.json {
        return style::print_json(&role);
    }
    style::print_success(&format!("Created role {} ({})", role.name.header(), role.id));
    Ok(())
}

pub async fn update(
    ctx: &Context,
    id: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_UPDATE))?;

    if name.is_none() && description.is_none() {
        bail!("Nothing to update. Pass --name and/or --description");
    }

    // The endpoint replaces both fields, so start from the current values.
    let current = fetch_role(&mut console, id).await?;
    roles::ensure_editable(&current)?;
    let draft = RoleDraft {
        name: name.unwrap_or(current.name),
        description: description.unwrap_or(current.description),
    };

    let updated = console.client().roles().update(&current.id, &draft).await;
    let role = settle(&mut console, updated, "update role")?;
    if ctx.json {
        return style::print_json(&role);
    }
    style::print_success(&format!("Updated role {}", role.name.header()));
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_DELETE))?;

    let role = fetch_role(&mut console, id).await?;
    roles::ensure_deletable(&role)?;

    if !confirm(&format!("Delete role {}?", role.name), yes)? {
        style::print_hint("Cancelled");
        return Ok(());
    }

    let deleted = console.client().roles().delete(&role.id).await;
    settle(&mut console, deleted, "delete role")?;
    style::print_success(&format!("Deleted role {}", role.name.header()));
    Ok(())
}

pub async fn set_permissions(ctx: &Context, id: &str, permission_ids: Vec<String>) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::ROLES_UPDATE))?;

    let role = fetch_role(&mut console, id).await?;
    roles::ensure_permissions_editable(&role)?;

    let ids: Vec<PermissionId> = permission_ids.into_iter().map(PermissionId::new).collect();
    if ids.is_empty() {
        style::print_warn(&format!("Clearing every permission of {}", role.name));
    }

    let spinner = style::create_spinner("Saving permissions...");
    let saved = console.client().roles().set_permissions(&role.id, &ids).await;
    style::finish_and_clear(&spinner);
    settle(&mut console, saved, "update role permissions")?;

    style::print_success(&format!(
        "Role {} now has {} permission(s)",
        role.name.header(),
        ids.len()
    ));
    Ok(())
}

async fn fetch_role(console: &mut AppConsole, id: &str) -> Result<RoleRecord> {
    let fetched = console.client().roles().get(&RoleId::new(id)).await;
    settle(console, fetched, "load role")
}

fn print_roles(ctx: &Context, shown: &[&RoleRecord]) -> Result<()> {
    if ctx.json {
        return style::print_json(shown);
    }

    let rows: Vec<Vec<String>> = shown.iter().map(|r| role_row(r)).collect();
    style::print_record_table(&["ID", "Name", "Description", "Permissions"], &rows, "role");
    Ok(())
}

fn role_row(role: &RoleRecord) -> Vec<String> {
    let name = if role.is_protected() {
        format!("{} {}", role.name, "(built in)".muted())
    } else {
        role.name.clone()
    };
    vec![
        role.id.to_string(),
        name,
        super::or_dash(Some(role.description.as_str())),
        role.permissions.len().to_string(),
    ]
}
