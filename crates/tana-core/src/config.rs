use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::TanaError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub media: MediaConfig,
    #[serde(default)]
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Explicit library database path. Unset means the platform data dir.
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the library REST API, including the `/api` segment.
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory served under `/media`.
    pub root: PathBuf,
    /// Prefix that marks a stored cover path as living under `root`.
    pub path_prefix: String,
    /// Public URL the served media directory is reachable at.
    pub base_url: String,
}

/// Deep-link templates for external services. No API calls are made to
/// either service; absent values simply omit the link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksConfig {
    pub plex_web_base: Option<String>,
    pub sonarr_base: Option<String>,
}

impl AppConfig {
    /// Load config: user file (if exists), otherwise built-in defaults.
    pub fn load() -> Result<Self, TanaError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)
                .map_err(|e| TanaError::Config(e.to_string()))?;
            toml::from_str(&user_str).map_err(|e| TanaError::Config(e.to_string()))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| TanaError::Config(e.to_string()))
        }
    }

    /// Load config from an explicit file, bypassing the platform lookup.
    pub fn load_from(path: &Path) -> Result<Self, TanaError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| TanaError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| TanaError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), TanaError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TanaError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Resolve the database path: explicit setting wins, then data dir.
    pub fn db_path(&self) -> PathBuf {
        self.server.database.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|d| d.data_dir().join("tana.db"))
                .unwrap_or_else(|| PathBuf::from("tana.db"))
        })
    }

    /// Ensure the parent directory for the DB exists and return its path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, TanaError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "tana")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
