//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod nav;
pub mod permissions;
pub mod roles;
pub mod users;
pub mod version;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow, bail};
use vellum_client::{ApiClient, ClientError, Console};
use vellum_config::{ConfigLoader, OutputFormat, VellumConfig};
use vellum_rbac::{AccessGuard, Decision, FileCredentialStore};

use crate::style;

/// The console type every command works with.
pub type AppConsole = Console<FileCredentialStore>;

/// Values given on the command line. They win over every config source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub credentials_file: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub json: bool,
    pub no_color: bool,
}

/// Effective configuration for one invocation.
#[derive(Debug)]
pub struct Context {
    pub config: VellumConfig,
    pub json: bool,
}

impl Context {
    /// Loads the layered configuration and applies command-line overrides.
    pub fn load(overrides: Overrides) -> Result<Self> {
        Self::load_with(ConfigLoader::new(), overrides)
    }

    /// Like [`Context::load`], reading the config sources through `loader`.
    pub fn load_with(mut loader: ConfigLoader, overrides: Overrides) -> Result<Self> {
        if let Some(dir) = &overrides.project_dir {
            loader = loader.with_project_dir(dir);
        }
        let mut config = loader.load().context("Failed to load configuration")?;

        if let Some(url) = overrides.api_url {
            config.api.base_url = url;
        }
        if let Some(timeout) = overrides.timeout_secs {
            config.api.timeout_secs = timeout;
        }
        if let Some(file) = overrides.credentials_file {
            config.session.credentials_file = Some(file);
        }
        config.validate().context("Invalid configuration")?;

        style::apply_color_mode(config.output.color, overrides.no_color);

        let json = overrides.json || config.output.format == OutputFormat::Json;
        Ok(Self { config, json })
    }

    /// Builds a console over the persisted credentials. Nothing is restored yet.
    pub fn console(&self) -> Result<AppConsole> {
        let path = self
            .config
            .credentials_path()
            .context("Could not determine the credentials file")?;
        let client = ApiClient::new(
            self.config.api.base_url.as_str(),
            self.config.api.timeout(),
            FileCredentialStore::new(path),
        )
        .context("Failed to build HTTP client")?;
        Ok(Console::new(client))
    }

    /// Builds a console and restores the persisted session, if there is one.
    pub async fn restored(&self) -> Result<(AppConsole, bool)> {
        let mut console = self.console()?;
        let spinner = style::create_spinner("Restoring session...");
        let active = console.check_auth().await;
        style::finish_and_clear(&spinner);
        Ok((console, active))
    }

    /// Like [`Context::restored`], but fails when nobody is signed in.
    pub async fn signed_in(&self) -> Result<AppConsole> {
        let (console, active) = self.restored().await?;
        if !active {
            bail!("Not signed in. Run 'vellum login' first.");
        }
        Ok(console)
    }
}

/// Fails with the denial reason unless `guard` admits the session.
///
/// Runs before any request, so a denied command never reaches the backend.
pub fn authorize(console: &AppConsole, guard: &AccessGuard) -> Result<()> {
    match guard.check(&console.authorizer()) {
        Decision::Granted => Ok(()),
        Decision::Denied(denial) => bail!("Access denied: {denial}"),
    }
}

/// Clears the session on expiry and turns client errors into CLI errors.
pub fn settle<T>(
    console: &mut AppConsole,
    result: vellum_client::Result<T>,
    action: &str,
) -> Result<T> {
    console.settle(result).map_err(|e| match e {
        ClientError::SessionExpired => {
            anyhow!("Session expired. Run 'vellum login' to sign in again.")
        }
        other => anyhow::Error::new(other).context(format!("Failed to {action}")),
    })
}

/// Reads one line from stdin without its line ending.
pub fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks for confirmation unless `yes` was given.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Formats an optional field for table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or("-")
        .to_string()
}
