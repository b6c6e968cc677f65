/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::modrinth
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Query the Modrinth hosting API for the version list of a
    project and select the newest version compatible with the
    active game-version constraint.

  Security / Safety Notes:
    Performs read-only HTTPS requests to the public Modrinth
    API. No credentials are transmitted.

  Dependencies:
    reqwest for HTTP, serde for response parsing.

  Operational Scope:
    Supplies the sync builder with a resolved version
    descriptor. Never mutates local state; network and
    contract failures propagate as typed errors rather than
    being read as "no update".

  Revision History:
    2025-11-12 COD  Implemented asynchronous Modrinth client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Structured response parsing with explicit error paths
    - Configurable timeouts and response-size ceilings
    - Selection logic kept pure and separately testable
============================================================*/

use std::time::Duration;

use serde::Deserialize;

use crate::config::RemoteConfig;
use crate::error::{Result, SynpakError};
use crate::version::{ResolvedConstraint, ResolvedVersion};

/// Client for the Modrinth project-version API.
#[derive(Clone)]
pub struct ModrinthClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    api_limit_bytes: u64,
}

impl ModrinthClient {
    /// Construct a new client from configuration.
    pub fn new(config: &RemoteConfig, api_limit_bytes: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent("Syn-Pak-Core/0.3 (linux)")
            .build()
            .map_err(|err| SynpakError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id()?.to_string(),
            api_limit_bytes,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Version-list endpoint for the configured project.
    pub fn versions_url(&self) -> String {
        format!("{}/project/{}/version", self.base_url, self.project_id)
    }

    /// Fetch the project's version list, newest-first per the API
    /// contract.
    pub async fn fetch_versions(&self) -> Result<Vec<ModrinthVersion>> {
        let url = self.versions_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| SynpakError::Network(format!("Request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynpakError::Network(format!(
                "Request to {url} failed with status {status}"
            )));
        }

        if let Some(announced) = response.content_length() {
            if announced > self.api_limit_bytes {
                return Err(SynpakError::MalformedRemoteData(format!(
                    "Version list at {url} announces {announced} bytes, over the {} byte cap",
                    self.api_limit_bytes
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| SynpakError::Network(format!("Reading body of {url} failed: {err}")))?;
        if body.len() as u64 > self.api_limit_bytes {
            return Err(SynpakError::MalformedRemoteData(format!(
                "Version list at {url} is {} bytes, over the {} byte cap",
                body.len(),
                self.api_limit_bytes
            )));
        }

        serde_json::from_slice(&body).map_err(|err| {
            SynpakError::MalformedRemoteData(format!("Failed to decode version list: {err}"))
        })
    }

    /// Resolve the newest version satisfying `constraint`.
    pub async fn resolve_latest(&self, constraint: &ResolvedConstraint) -> Result<ResolvedVersion> {
        let versions = self.fetch_versions().await?;
        let selected = select_version(&versions, constraint)?;
        ResolvedVersion::from_version(selected)
    }
}

/// Pick the first (newest) version satisfying the constraint.
///
/// The list order is the API's; no re-sorting happens here.
pub fn select_version<'a>(
    versions: &'a [ModrinthVersion],
    constraint: &ResolvedConstraint,
) -> Result<&'a ModrinthVersion> {
    for version in versions {
        match constraint {
            ResolvedConstraint::Any => return Ok(version),
            ResolvedConstraint::GameVersion(wanted) => {
                if version.game_versions.iter().any(|gv| gv == wanted) {
                    return Ok(version);
                }
            }
        }
    }
    Err(SynpakError::ResolutionNotFound(
        "No published version satisfies the game-version constraint".into(),
    ))
}

/// Version record as served by `GET /project/{id}/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModrinthVersion {
    pub id: String,
    pub version_number: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub files: Vec<ModrinthFile>,
}

impl ModrinthVersion {
    /// Return the file flagged as the canonical distributable.
    ///
    /// A version without one violates the API contract; that is a
    /// remote-data error, not a "no update" condition.
    pub fn primary_artifact(&self) -> Result<&ModrinthFile> {
        self.files.iter().find(|file| file.primary).ok_or_else(|| {
            SynpakError::MalformedRemoteData(format!(
                "Version {} has no file flagged primary",
                self.id
            ))
        })
    }
}

/// Downloadable file entry within a version record.
#[derive(Debug, Clone, Deserialize)]
pub struct ModrinthFile {
    #[serde(default)]
    pub primary: bool,
    pub url: String,
    pub size: u64,
    pub hashes: FileHashes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileHashes {
    pub sha1: String,
}

impl ResolvedVersion {
    /// Combine a version record and its primary artifact into the
    /// immutable descriptor cached by the sync builder.
    pub fn from_version(version: &ModrinthVersion) -> Result<Self> {
        let artifact = version.primary_artifact()?;
        Ok(Self {
            id: version.id.clone(),
            version_number: version.version_number.clone(),
            url: artifact.url.clone(),
            sha1: artifact.hashes.sha1.clone(),
            size: artifact.size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<ModrinthVersion> {
        serde_json::from_str(
            r#"[
                {
                    "id": "v3",
                    "version_number": "1.2",
                    "game_versions": ["1.21"],
                    "files": [
                        {"primary": false, "url": "https://x/src.zip", "size": 10,
                         "hashes": {"sha1": "aaa"}},
                        {"primary": true, "url": "https://x/p3.zip", "size": 300,
                         "hashes": {"sha1": "h3"}}
                    ]
                },
                {
                    "id": "v2",
                    "version_number": "1.1",
                    "game_versions": ["1.20"],
                    "files": [
                        {"primary": true, "url": "https://x/p.zip", "size": 100,
                         "hashes": {"sha1": "abc123"}}
                    ]
                }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn unspecified_constraint_takes_the_list_head() {
        let versions = fixture();
        let selected = select_version(&versions, &ResolvedConstraint::Any).unwrap();
        assert_eq!(selected.id, "v3");
    }

    #[test]
    fn exact_constraint_takes_the_first_match() {
        let versions = fixture();
        let constraint = ResolvedConstraint::GameVersion("1.20".into());
        let selected = select_version(&versions, &constraint).unwrap();
        assert_eq!(selected.id, "v2");
    }

    #[test]
    fn exhausted_list_is_resolution_not_found() {
        let versions = fixture();
        let constraint = ResolvedConstraint::GameVersion("1.19".into());
        assert!(matches!(
            select_version(&versions, &constraint),
            Err(SynpakError::ResolutionNotFound(_))
        ));
        assert!(matches!(
            select_version(&[], &ResolvedConstraint::Any),
            Err(SynpakError::ResolutionNotFound(_))
        ));
    }

    #[test]
    fn primary_artifact_skips_secondary_files() {
        let versions = fixture();
        let artifact = versions[0].primary_artifact().unwrap();
        assert_eq!(artifact.url, "https://x/p3.zip");
        assert_eq!(artifact.size, 300);
    }

    #[test]
    fn missing_primary_flag_is_a_contract_violation() {
        let version: ModrinthVersion = serde_json::from_str(
            r#"{"id": "v9", "version_number": "2.0", "game_versions": [],
                "files": [{"primary": false, "url": "https://x/a.zip", "size": 5,
                           "hashes": {"sha1": "zzz"}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            version.primary_artifact(),
            Err(SynpakError::MalformedRemoteData(_))
        ));
    }

    #[test]
    fn resolved_descriptor_carries_artifact_fields() {
        let versions = fixture();
        let resolved = ResolvedVersion::from_version(&versions[1]).unwrap();
        assert_eq!(resolved.id, "v2");
        assert_eq!(resolved.version_number, "1.1");
        assert_eq!(resolved.url, "https://x/p.zip");
        assert_eq!(resolved.sha1, "abc123");
        assert_eq!(resolved.size, 100);
    }
}
