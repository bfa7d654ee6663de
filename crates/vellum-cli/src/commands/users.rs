//! User account commands.

use anyhow::{Result, bail};
use dialoguer::Password;
use vellum_rbac::permissions::names;
use vellum_rbac::{AccessGuard, roles};
use vellum_types::{NewUser, Role, RoleId, UserId, UserPage, UserQuery, UserRecord, UserUpdate};

use super::{AppConsole, Context, authorize, confirm, or_dash, read_stdin_line, settle};
use crate::style::{self, colors::SemanticStyle};

/// Fields for a new account; the password is collected separately.
#[derive(Debug)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: Option<String>,
    pub image: Option<String>,
}

/// Requested changes; `password` asks for a prompt.
#[derive(Debug)]
pub struct Changes {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<String>,
    pub image: Option<String>,
    pub password: bool,
}

pub async fn list(ctx: &Context, page: u32, limit: u32, search: Option<String>) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::USERS_READ))?;

    let query = UserQuery {
        page,
        limit,
        search,
    };
    let spinner = style::create_spinner("Loading users...");
    let fetched = console.client().users().list(&query).await;
    style::finish_and_clear(&spinner);

    let page = settle(&mut console, fetched, "list users")?;
    print_page(ctx, &page)
}

pub async fn search(ctx: &Context, term: &str, page: u32, limit: u32) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::USERS_READ))?;

    let query = UserQuery {
        page,
        limit,
        search: None,
    };
    let spinner = style::create_spinner("Searching users...");
    let fetched = console.client().users().search(term, &query).await;
    style::finish_and_clear(&spinner);

    let page = settle(&mut console, fetched, "search users")?;
    print_page(ctx, &page)
}

pub async fn show(ctx: &Context, id: &str) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::USERS_READ))?;

    let fetched = console.client().users().get(&UserId::new(id)).await;
    let user = settle(&mut console, fetched, "load user")?;
    print_user(ctx, &user)
}

pub async fn create(ctx: &Context, draft: Draft, password_stdin: bool) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::USERS_CREATE))?;

    let role_id = match draft.role_id {
        Some(id) => Some(assignable_role(&mut console, id).await?),
        None => None,
    };

    let password = if password_stdin {
        read_stdin_line()?
    } else {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?
    };
    if password.is_empty() {
        bail!("A password is required");
    }

    let new_user = NewUser {
        name: draft.name,
        email: draft.email,
        phone: draft.phone,
        password,
        role_id,
        image: draft.image,
    };

    let spinner = style::create_spinner("Creating user...");
    let created = console.client().users().create(&new_user).await;
    style::finish_and_clear(&spinner);

    let user = settle(&mut console, created, "create user")?;
    if ctx.json {
        return style::print_json(&user);
    }
    style::print_success(&format!("Created user {} ({})", user.name.header(), user.id));
    Ok(())
}

pub async fn update(ctx: &Context, id: &str, changes: Changes) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(&console, &AccessGuard::new().permission(names::USERS_UPDATE))?;

    let role_id = match changes.role_id {
        Some(role) => Some(assignable_role(&mut console, role).await?),
        None => None,
    };
    let password = if changes.password {
        Some(
            Password::new()
                .with_prompt("New password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
        )
    } else {
        None
    };

    let update = UserUpdate {
        name: changes.name,
        email: changes.email,
        phone: changes.phone,
        role_id,
        image: changes.image,
        password: password.filter(|p| !p.is_empty()),
    };
    if update.is_empty() {
        bail!("Nothing to update. Pass at least one field");
    }

    let spinner = style::create_spinner("Updating user...");
    let updated = console.client().users().update(&UserId::new(id), &update).await;
    style::finish_and_clear(&spinner);

    let user = settle(&mut console, updated, "update user")?;
    if ctx.json {
        return style::print_json(&user);
    }
    style::print_success(&format!("Updated user {}", user.name.header()));
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    let mut console = ctx.signed_in().await?;
    authorize(
        &console,
        &AccessGuard::new()
            .permission(names::USERS_DELETE)
            .roles([Role::SUPER_ADMIN, Role::ADMIN]),
    )?;

    if !confirm(&format!("Delete user {id}?"), yes)? {
        style::print_hint("Cancelled");
        return Ok(());
    }

    let deleted = console.client().users().delete(&UserId::new(id)).await;
    settle(&mut console, deleted, "delete user")?;
    style::print_success(&format!("Deleted user {id}"));
    Ok(())
}

/// Resolves `id` against the role catalog, refusing roles that cannot be
/// assigned to users.
async fn assignable_role(console: &mut AppConsole, id: String) -> Result<RoleId> {
    let fetched = console.client().roles().list().await;
    let catalog = settle(console, fetched, "load roles")?;

    let Some(role) = catalog.iter().find(|r| r.id.as_str() == id) else {
        bail!("Role {id} does not exist");
    };
    if !roles::assignable_roles(&catalog)
        .iter()
        .any(|r| r.id == role.id)
    {
        bail!("Role '{}' cannot be assigned to users", role.name);
    }
    Ok(role.id.clone())
}

fn print_page(ctx: &Context, page: &UserPage) -> Result<()> {
    if ctx.json {
        return style::print_json(page);
    }

    let rows: Vec<Vec<String>> = page.users.iter().map(user_row).collect();
    style::print_record_table(&["ID", "Name", "Email", "Role", "Status"], &rows, "user");

    let p = &page.pagination;
    if p.total_pages > 1 {
        println!(
            "{}",
            format!(
                "Page {} of {} ({} users total)",
                p.current_page, p.total_pages, p.total_users
            )
            .muted()
        );
        if p.has_next {
            style::print_hint(&format!("Next page: --page {}", p.current_page + 1));
        }
    }
    Ok(())
}

fn user_row(user: &UserRecord) -> Vec<String> {
    vec![
        user.id.to_string(),
        user.name.clone(),
        user.email.clone(),
        or_dash(user.role.as_ref().map(|r| r.name.as_str())),
        status(user),
    ]
}

fn status(user: &UserRecord) -> String {
    let mut status = if user.is_active { "active" } else { "inactive" }.to_string();
    if user.email_verified {
        status.push_str(", verified");
    }
    status
}

fn print_user(ctx: &Context, user: &UserRecord) -> Result<()> {
    if ctx.json {
        return style::print_json(user);
    }

    style::print_info_table(&[
        ("ID", user.id.to_string()),
        ("Name", user.name.clone()),
        ("Email", user.email.clone()),
        ("Phone", or_dash(user.phone.as_deref())),
        ("Role", or_dash(user.role.as_ref().map(|r| r.name.as_str()))),
        ("Status", status(user)),
        (
            "Created",
            user.created_at
                .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string()),
        ),
    ]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(active: bool, verified: bool) -> UserRecord {
        UserRecord {
            id: UserId::new("u-1"),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            image: None,
            role: Some(Role::new("EDITOR", "")),
            is_active: active,
            email_verified: verified,
            created_at: None,
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status(&user(true, true)), "active, verified");
        assert_eq!(status(&user(false, false)), "inactive");
    }

    #[test]
    fn test_user_row() {
        assert_eq!(
            user_row(&user(true, false)),
            vec!["u-1", "Ada", "ada@example.com", "EDITOR", "active"]
        );
    }
}
