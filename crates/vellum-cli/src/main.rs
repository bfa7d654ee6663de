//! Vellum admin console CLI.
//!
//! Operator surface for the document-management backend: sign in, inspect
//! what the session may do, and manage users, roles and permissions.
//!
//! # Quick Start
//!
//! ```bash
//! # Sign in (prompts for the password)
//! vellum login --email admin@example.com
//!
//! # What can I reach?
//! vellum nav
//! vellum can users:delete --role ADMIN
//!
//! # Manage the catalog
//! vellum users list --search ada
//! vellum roles set-permissions <role-id> <permission-id>...
//! ```

mod commands;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Context;

/// Vellum - admin console for the document-management backend.
#[derive(Parser)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Backend base URL (overrides `api.base_url`).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides `api.timeout_secs`).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Credentials file (overrides `session.credentials_file`).
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Directory holding vellum.toml and vellum.local.toml.
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Log request and session activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Sign in and persist the session.
    Login {
        /// Account email. Prompted for when omitted.
        #[arg(short, long)]
        email: Option<String>,

        /// Read the password from the first line of stdin.
        #[arg(long)]
        password_stdin: bool,
    },

    /// Sign out and forget persisted credentials.
    Logout,

    /// Show the signed-in identity.
    Whoami,

    /// Check permissions and roles against the current session.
    Can {
        /// Permission names, e.g. `users:delete`.
        permissions: Vec<String>,

        /// Require every listed permission instead of any one.
        #[arg(long)]
        all: bool,

        /// Also require one of these roles (repeatable).
        #[arg(long = "role")]
        roles: Vec<String>,
    },

    /// Show the console sections visible to the session, or resolve a path.
    Nav {
        /// Route path to resolve, e.g. `/users`.
        path: Option<String>,
    },

    /// User account management.
    #[command(subcommand)]
    Users(UserCommands),

    /// Role management.
    #[command(subcommand)]
    Roles(RoleCommands),

    /// Permission catalog.
    #[command(subcommand)]
    Permissions(PermissionCommands),

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// List user accounts.
    List {
        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Filter by name or email.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one user account.
    Show {
        id: String,
    },

    /// Search user accounts.
    Search {
        term: String,

        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Create a user account. The password is prompted for.
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        /// Role to assign. `SUPER_ADMIN` cannot be assigned.
        #[arg(long)]
        role_id: Option<String>,

        /// Avatar image URL.
        #[arg(long)]
        image: Option<String>,

        /// Read the password from the first line of stdin.
        #[arg(long)]
        password_stdin: bool,
    },

    /// Update a user account. Only the given fields change.
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        role_id: Option<String>,

        #[arg(long)]
        image: Option<String>,

        /// Prompt for a new password.
        #[arg(long)]
        password: bool,
    },

    /// Delete a user account.
    Delete {
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List roles.
    List {
        /// Only roles that can be assigned to users.
        #[arg(long)]
        assignable: bool,
    },

    /// Show one role and its permissions.
    Show {
        id: String,
    },

    /// Search roles by name.
    Search {
        term: String,
    },

    /// Create a role.
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Update a role's name or description.
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a role. Built-in roles cannot be deleted.
    Delete {
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Replace a role's permission set.
    SetPermissions {
        id: String,

        /// Permission IDs. Omit all of them to clear the set.
        permission_ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PermissionCommands {
    /// List the permission catalog.
    List {
        /// Filter by name, description or resource.
        #[arg(short, long)]
        search: Option<String>,

        /// Group by resource.
        #[arg(long)]
        group: bool,
    },

    /// Show the signed-in user's permissions.
    Mine {
        /// Compare against the full catalog (granted and missing).
        #[arg(long)]
        catalog: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration.
    Show {
        /// Output format (toml, json).
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            style::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        style::set_no_color(cli.global.no_color);
        commands::version::run();
        return Ok(());
    }

    let global = cli.global;
    let ctx = Context::load(commands::Overrides {
        api_url: global.api_url,
        timeout_secs: global.timeout,
        credentials_file: global.credentials,
        project_dir: global.project_dir,
        json: global.json,
        no_color: global.no_color,
    })?;

    match cli.command {
        Commands::Version => Ok(()),
        Commands::Login {
            email,
            password_stdin,
        } => commands::auth::login(&ctx, email, password_stdin).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Can {
            permissions,
            all,
            roles,
        } => commands::auth::can(&ctx, permissions, all, roles).await,
        Commands::Nav { path } => commands::nav::run(&ctx, path.as_deref()).await,
        Commands::Users(cmd) => match cmd {
            UserCommands::List {
                page,
                limit,
                search,
            } => commands::users::list(&ctx, page, limit, search).await,
            UserCommands::Show { id } => commands::users::show(&ctx, &id).await,
            UserCommands::Search { term, page, limit } => {
                commands::users::search(&ctx, &term, page, limit).await
            }
            UserCommands::Create {
                name,
                email,
                phone,
                role_id,
                image,
                password_stdin,
            } => {
                let draft = commands::users::Draft {
                    name,
                    email,
                    phone,
                    role_id,
                    image,
                };
                commands::users::create(&ctx, draft, password_stdin).await
            }
            UserCommands::Update {
                id,
                name,
                email,
                phone,
                role_id,
                image,
                password,
            } => {
                let changes = commands::users::Changes {
                    name,
                    email,
                    phone,
                    role_id,
                    image,
                    password,
                };
                commands::users::update(&ctx, &id, changes).await
            }
            UserCommands::Delete { id, yes } => commands::users::delete(&ctx, &id, yes).await,
        },
        Commands::Roles(cmd) => match cmd {
            RoleCommands::List { assignable } => commands::roles::list(&ctx, assignable).await,
            RoleCommands::Show { id } => commands::roles::show(&ctx, &id).await,
            RoleCommands::Search { term } => commands::roles::search(&ctx, &term).await,
            RoleCommands::Create { name, description } => {
                commands::roles::create(&ctx, name, description).await
            }
            RoleCommands::Update {
                id,
                name,
                description,
            } => commands::roles::update(&ctx, &id, name, description).await,
            RoleCommands::Delete { id, yes } => commands::roles::delete(&ctx, &id, yes).await,
            RoleCommands::SetPermissions { id, permission_ids } => {
                commands::roles::set_permissions(&ctx, &id, permission_ids).await
            }
        },
        Commands::Permissions(cmd) => match cmd {
            PermissionCommands::List { search, group } => {
                commands::permissions::list(&ctx, search.as_deref(), group).await
            }
            PermissionCommands::Mine { catalog } => {
                commands::permissions::mine(&ctx, catalog).await
            }
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { format } => commands::config::show(&ctx, &format),
        },
    }
}
