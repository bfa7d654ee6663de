//! Configuration commands.

use anyhow::{Context as _, Result, bail};

use super::Context;
use crate::style::{self, colors::SemanticStyle};

/// Show the effective configuration, command-line overrides included.
pub fn show(ctx: &Context, format: &str) -> Result<()> {
    match format {
        "json" => style::print_json(&ctx.config),
        "toml" => {
            let rendered = ctx
                .config
                .to_toml_string()
                .context("Failed to render configuration")?;
            print!("{rendered}");

            let credentials = ctx.config.credentials_path()?;
            println!(
                "{}",
                format!("# credentials: {}", credentials.display()).muted()
            );
            Ok(())
        }
        other => bail!("Unknown format '{other}'. Use toml or json"),
    }
}
