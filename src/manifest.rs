/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::manifest
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Persist the record of the currently-applied pack version,
    held both host-side and embedded in the applied content.

  Security / Safety Notes:
    Manifest data is written to operator-controlled paths; no
    privileged operations are performed.

  Dependencies:
    serde for JSON serialization, chrono for timestamps.

  Operational Scope:
    `version` is the authoritative identity compared against
    the remote descriptor; it is mutated only by the applier
    after a verified download. Readers elsewhere must
    tolerate eventual consistency during an in-flight sync.

  Revision History:
    2025-11-12 COD  Authored pack manifest persistence.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single-writer mutation, post-verification only
    - Deterministic serialization for reproducible state
============================================================*/

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynpakError};

/// Embedded manifest entry name inside a packaged artifact.
pub const EMBEDDED_MANIFEST_NAME: &str = "synpak.json";

/// Persisted record of the currently-applied pack version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    /// Authoritative version identity (remote version id).
    #[serde(default)]
    pub version: String,
    /// Display version; cleared when the constraint mode does not
    /// pin a game version.
    #[serde(default)]
    pub version_number: String,
    /// Unix seconds of the last successful apply.
    #[serde(default)]
    pub last_update_timestamp: i64,
}

impl PackManifest {
    /// Load the manifest from `path`; a missing file yields the
    /// default (never-synced) state.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to read manifest {}: {err}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            SynpakError::Serialization(format!(
                "Failed to parse manifest {}: {err}",
                path.display()
            ))
        })
    }

    /// Persist the manifest to the given path.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                SynpakError::Filesystem(format!(
                    "Failed to create manifest directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let file = File::create(path).map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to create manifest file {}: {err}",
                path.display()
            ))
        })?;
        serde_json::to_writer_pretty(file, self).map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to write manifest {}: {err}",
                path.display()
            ))
        })?;
        Ok(())
    }

    /// Stamp the manifest with the current time.
    pub fn touch(&mut self) {
        self.last_update_timestamp = Utc::now().timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_manifest_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = PackManifest::load_or_default(&dir.path().join("synpak.json")).unwrap();
        assert_eq!(manifest, PackManifest::default());
        assert!(manifest.version.is_empty());
    }

    #[test]
    fn manifest_survives_a_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("synpak.json");

        let mut manifest = PackManifest {
            version: "v2".into(),
            version_number: "1.1".into(),
            last_update_timestamp: 0,
        };
        manifest.touch();
        manifest.write(&path).unwrap();

        let reloaded = PackManifest::load_or_default(&path).unwrap();
        assert_eq!(reloaded, manifest);
        assert!(reloaded.last_update_timestamp > 0);
    }

    #[test]
    fn corrupt_manifest_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synpak.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PackManifest::load_or_default(&path),
            Err(SynpakError::Serialization(_))
        ));
    }
}
