//! Path utilities and XDG directory discovery

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// XDG-compliant paths for Vellum
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    /// Create a new Paths instance with XDG discovery
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("com", "Vellum", "vellum"),
        }
    }

    /// Get user config directory (~/.config/vellum/)
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().to_path_buf())
            .ok_or_else(|| {
                ConfigError::XdgError("Failed to determine user config directory".to_string())
            })
    }

    /// Get user data directory (~/.local/share/vellum/)
    pub fn user_data_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .ok_or_else(|| {
                ConfigError::XdgError("Failed to determine user data directory".to_string())
            })
    }

    /// Get user config file path (~/.config/vellum/config.toml)
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join("config.toml"))
    }

    /// Get the default persisted-credentials file (~/.local/share/vellum/credentials.json)
    pub fn credentials_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_data_dir()?.join("credentials.json"))
    }

    /// Get project config file path (vellum.toml)
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("vellum.toml")
    }

    /// Get local config file path (vellum.local.toml, gitignored)
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("vellum.local.toml")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
