/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load and validate Syn-Pak-Core configuration from TOML,
    providing defaults for every operational constant.

  Security / Safety Notes:
    Configuration is read from operator-controlled paths;
    values are validated before any network or filesystem
    activity.

  Dependencies:
    serde + toml for parsing, dirs for default locations.

  Operational Scope:
    Consumed by the binary entry point and by hosts embedding
    the library. Size limit, retry budget, and timeouts are
    configured here, never negotiated with the remote.

  Revision History:
    2025-11-12 COD  Authored configuration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit defaults for every tunable
    - Validation at load time, not at point of use
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SynpakError};
use crate::version::GameVersionConstraint;

/// Root configuration document for Syn-Pak-Core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SynpakConfig {
    pub remote: RemoteConfig,
    pub download: DownloadConfig,
    pub paths: PathsConfig,
}

/// Settings for the remote hosting API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    pub project_id: Option<String>,
    /// Legacy key; honoured when `project_id` is absent.
    pub modrinth_project_id: Option<String>,
    /// `"no_specify"`, `"current"`, or an exact version string.
    pub game_version: String,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.modrinth.com/v2".into(),
            project_id: None,
            modrinth_project_id: None,
            game_version: "no_specify".into(),
            timeout: 30,
        }
    }
}

impl RemoteConfig {
    /// Return the configured project id, honouring the legacy key.
    pub fn project_id(&self) -> Result<&str> {
        self.project_id
            .as_deref()
            .or(self.modrinth_project_id.as_deref())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                SynpakError::Config(
                    "remote.project_id (or remote.modrinth_project_id) is required".into(),
                )
            })
    }

    /// Parse the configured game-version rule.
    pub fn constraint(&self) -> GameVersionConstraint {
        GameVersionConstraint::parse(&self.game_version)
    }
}

/// Settings for artifact transfer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Hash-check cycles before the sync is declared failed.
    pub max_attempts: usize,
    /// Byte ceiling for the artifact stream.
    pub size_limit_bytes: u64,
    /// Byte ceiling for the version-list response body.
    pub api_limit_bytes: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            size_limit_bytes: 500 * 1024 * 1024,
            api_limit_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Local filesystem layout for the managed pack.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Destination of the applied content.
    pub pack_path: Option<PathBuf>,
    /// True when the pack is a single packaged file rather than a
    /// directory tree.
    pub packed_as_file: bool,
    /// Directory holding the host-side pack manifest.
    pub state_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pack_path: None,
            packed_as_file: true,
            state_dir: None,
            log_dir: None,
        }
    }
}

impl SynpakConfig {
    /// Load configuration from `path` when given, from the default
    /// location when present, or fall back to built-in defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load_file(explicit),
            None => {
                let fallback = default_config_path();
                match fallback {
                    Some(candidate) if candidate.exists() => Self::load_file(&candidate),
                    _ => Ok(Self::default()),
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SynpakError::Config(format!("Failed to read config {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            SynpakError::Config(format!("Failed to parse config {}: {err}", path.display()))
        })
    }

    /// Destination path of the managed pack; required for syncing.
    pub fn pack_path(&self) -> Result<PathBuf> {
        self.paths
            .pack_path
            .clone()
            .ok_or_else(|| SynpakError::Config("paths.pack_path is required".into()))
    }

    /// Host-side manifest location (`synpak.json` in the state dir).
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join("synpak.json")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.paths.state_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("synpak")
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.paths.log_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::cache_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("synpak")
                .join("logs")
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("synpak").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::GameVersionConstraint;

    #[test]
    fn defaults_are_complete() {
        let config = SynpakConfig::default();
        assert_eq!(config.remote.base_url, "https://api.modrinth.com/v2");
        assert_eq!(config.download.max_attempts, 3);
        assert!(config.paths.packed_as_file);
        assert!(config.remote.project_id().is_err());
    }

    #[test]
    fn legacy_project_id_key_is_honoured() {
        let config: SynpakConfig = toml::from_str(
            r#"
            [remote]
            modrinth_project_id = "abc123XY"
            game_version = "1.20"
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.project_id().unwrap(), "abc123XY");
        assert_eq!(
            config.remote.constraint(),
            GameVersionConstraint::Exact("1.20".into())
        );
    }

    #[test]
    fn primary_project_id_key_wins_over_legacy() {
        let config: SynpakConfig = toml::from_str(
            r#"
            [remote]
            project_id = "primary"
            modrinth_project_id = "legacy"
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.project_id().unwrap(), "primary");
    }

    #[test]
    fn pack_path_is_required_for_sync() {
        let config = SynpakConfig::default();
        assert!(matches!(
            config.pack_path(),
            Err(SynpakError::Config(_))
        ));
    }
}
