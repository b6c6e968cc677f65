/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing the resolved remote version
    descriptor and the game-version constraint that selects
    it.

  Security / Safety Notes:
    Pure data containers; no I/O performed in this module.

  Dependencies:
    serde for descriptor serialization.

  Operational Scope:
    Used across the remote client, the sync builder, and the
    applier to pass version identity, artifact location, and
    integrity metadata.

  Revision History:
    2025-11-12 COD  Introduced shared version descriptor types.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Constraints resolved once, before any network query
============================================================*/

use serde::Serialize;

use crate::error::{Result, SynpakError};

/// Immutable descriptor of the newest compatible remote version.
///
/// Built once per `init()` from the version record plus its primary
/// artifact; `id` and `url` are non-empty once resolution succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedVersion {
    pub id: String,
    pub version_number: String,
    pub url: String,
    pub sha1: String,
    pub size: u64,
}

impl ResolvedVersion {
    /// Derive the artifact file name from the last URL path segment.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(self.url.as_str())
    }
}

/// Rule used to pick a compatible remote version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameVersionConstraint {
    /// Match a specific game version string.
    Exact(String),
    /// Match whatever game version the host runtime reports.
    CurrentRuntime,
    /// Do not filter; take the newest published version.
    Unspecified,
}

impl GameVersionConstraint {
    /// Parse the configured `game_version` value.
    ///
    /// `"no_specify"` disables filtering, `"current"` defers to the
    /// host runtime; anything else is an exact version string.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("no_specify") {
            GameVersionConstraint::Unspecified
        } else if raw.eq_ignore_ascii_case("current") {
            GameVersionConstraint::CurrentRuntime
        } else {
            GameVersionConstraint::Exact(raw.to_string())
        }
    }

    /// Resolve to a concrete comparison value before querying.
    ///
    /// The host's runtime version is passed explicitly; there is no
    /// process-wide singleton to consult.
    pub fn resolve(&self, runtime_version: Option<&str>) -> Result<ResolvedConstraint> {
        match self {
            GameVersionConstraint::Unspecified => Ok(ResolvedConstraint::Any),
            GameVersionConstraint::Exact(value) => {
                Ok(ResolvedConstraint::GameVersion(value.clone()))
            }
            GameVersionConstraint::CurrentRuntime => match runtime_version {
                Some(value) => Ok(ResolvedConstraint::GameVersion(value.to_string())),
                None => Err(SynpakError::Config(
                    "game_version = \"current\" requires the host runtime version".into(),
                )),
            },
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, GameVersionConstraint::Unspecified)
    }
}

/// Constraint after runtime resolution; what the resolver matches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedConstraint {
    Any,
    GameVersion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_reserved_words() {
        assert_eq!(
            GameVersionConstraint::parse("no_specify"),
            GameVersionConstraint::Unspecified
        );
        assert_eq!(
            GameVersionConstraint::parse("CURRENT"),
            GameVersionConstraint::CurrentRuntime
        );
        assert_eq!(
            GameVersionConstraint::parse("1.20.4"),
            GameVersionConstraint::Exact("1.20.4".into())
        );
    }

    #[test]
    fn resolve_uses_explicit_runtime_version() {
        let resolved = GameVersionConstraint::CurrentRuntime
            .resolve(Some("1.21"))
            .unwrap();
        assert_eq!(resolved, ResolvedConstraint::GameVersion("1.21".into()));
    }

    #[test]
    fn resolve_current_without_runtime_is_config_error() {
        let err = GameVersionConstraint::CurrentRuntime
            .resolve(None)
            .unwrap_err();
        assert!(matches!(err, SynpakError::Config(_)));
    }

    #[test]
    fn file_name_is_last_url_segment() {
        let version = ResolvedVersion {
            id: "v2".into(),
            version_number: "1.1".into(),
            url: "https://cdn.example/data/pack.zip".into(),
            sha1: "abc123".into(),
            size: 100,
        };
        assert_eq!(version.file_name(), "pack.zip");
    }
}
