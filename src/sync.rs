/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::sync
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Orchestrate one check-and-apply cycle: the Remote
    abstraction over hosting backends, the SyncBuilder
    lifecycle protocol, and the update decision rules.

  Security / Safety Notes:
    The manifest is written exactly once per cycle, after the
    artifact hash has been verified. Interruption is advisory
    and has no effect once the apply phase begins.

  Dependencies:
    async-trait for the backend seams, tokio runtime for the
    download stage.

  Operational Scope:
    One sync operation per pack runs to completion
    sequentially; callers must not invoke do_update
    concurrently for the same pack.

  Revision History:
    2025-11-12 COD  Authored sync builder orchestration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit state in a declared struct, no hidden captures
    - Failures before the swap leave local state untouched
    - Interruption is an outcome, never an error
============================================================*/

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::apply;
use crate::config::SynpakConfig;
use crate::download::{Downloader, FetchOutcome};
use crate::error::{Result, SynpakError};
use crate::logger::Logger;
use crate::manifest::PackManifest;
use crate::modrinth::ModrinthClient;
use crate::progress::{SyncProgress, TransferControl};
use crate::version::{GameVersionConstraint, ResolvedVersion};

/// Host-supplied context for one sync cycle.
///
/// The runtime version is passed explicitly; constraint resolution
/// never consults process-wide state.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    pub runtime_version: Option<String>,
}

/// Terminal state of one check-and-apply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Succeeded,
    NoUpdate,
    Interrupted,
}

/// Abstraction over a hosting API that can report the latest pack
/// version and produce a sync operation. One concrete backend today;
/// the seam admits more.
#[async_trait]
pub trait Remote: Send + Sync {
    /// One-shot availability query, without building a sync cycle.
    async fn check_update_available(&self, ctx: &SyncContext) -> Result<bool>;

    /// Produce a fresh builder for one check-and-apply cycle.
    fn sync_builder(&self) -> Box<dyn SyncBuilder>;
}

/// Stateful orchestration protocol for one sync cycle:
/// init → availability queries → do_update.
#[async_trait]
pub trait SyncBuilder: Send {
    /// Resolve the remote descriptor and load local state. Must
    /// precede any query; its failures mean "cannot determine
    /// status", which is distinct from "no update available".
    async fn init(&mut self, ctx: &SyncContext) -> Result<()>;

    /// Whether the resolved remote version differs from the applied
    /// one. Pure over the cached descriptor; memoized.
    fn is_update_available(&mut self) -> bool;

    /// Artifact size in bytes, or 0 when no update is available.
    fn update_size(&mut self) -> u64;

    /// Cumulative bytes received by the current download attempt.
    fn downloaded_size(&self) -> u64;

    /// Register a handle the host holds on the destination; it is
    /// released before the move during apply.
    fn hold_pack_lock(&mut self, _handle: File) {}

    /// Drive download and apply, reporting phases to `progress`.
    async fn do_update(&mut self, progress: &mut dyn SyncProgress) -> Result<SyncOutcome>;

    /// Request a cooperative stop of an in-flight download. No
    /// defined effect once the apply phase has begun.
    fn interrupt(&self);

    /// Shared handle for interrupting from another task.
    fn transfer_control(&self) -> TransferControl;
}

/// Decide availability from local identity vs. the remote descriptor.
///
/// Version-number equality is definitive: two distinct releases
/// sharing a version-number string read as "already applied". That
/// is deliberate and load-bearing; do not reorder the checks.
pub fn update_available(
    local: &PackManifest,
    remote: Option<&ResolvedVersion>,
    logger: &Logger,
) -> bool {
    let Some(remote) = remote else {
        logger.debug(
            "DECIDE",
            "No remote version resolved for the active constraint",
        );
        return false;
    };
    if remote.version_number == local.version_number {
        logger.debug("DECIDE", "Version number equal; update not available");
        return false;
    }
    logger.debug(
        "DECIDE",
        format!("remote.id={} local={}", remote.id, local.version),
    );
    remote.id != local.version
}

/// Update size under the decision: 0 when not available.
pub fn update_size(available: bool, remote: Option<&ResolvedVersion>) -> u64 {
    if available {
        remote.map(|version| version.size).unwrap_or(0)
    } else {
        0
    }
}

/// Remote for packs hosted on Modrinth.
pub struct ModrinthRemote {
    client: ModrinthClient,
    downloader: Downloader,
    constraint: GameVersionConstraint,
    pack_path: PathBuf,
    packed_as_file: bool,
    state_path: PathBuf,
    logger: Arc<Logger>,
}

impl ModrinthRemote {
    /// Build the remote and its downloader from configuration.
    pub fn from_config(config: &SynpakConfig, logger: Arc<Logger>) -> Result<Self> {
        let client = ModrinthClient::new(&config.remote, config.download.api_limit_bytes)?;
        let pack_path = config.pack_path()?;
        // Partial files land next to the destination so the final
        // move is a same-filesystem rename.
        let work_dir = pack_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.state_dir());
        let downloader = Downloader::new(&config.download, config.remote.timeout, work_dir)?;

        Ok(Self {
            client,
            downloader,
            constraint: config.remote.constraint(),
            pack_path,
            packed_as_file: config.paths.packed_as_file,
            state_path: config.state_path(),
            logger,
        })
    }
}

#[async_trait]
impl Remote for ModrinthRemote {
    async fn check_update_available(&self, ctx: &SyncContext) -> Result<bool> {
        let constraint = self.constraint.resolve(ctx.runtime_version.as_deref())?;
        let remote = match self.client.resolve_latest(&constraint).await {
            Ok(remote) => remote,
            Err(SynpakError::ResolutionNotFound(message)) => {
                // A non-event, not a failure: the project simply has
                // no build for this constraint.
                self.logger.info("CHECK", message);
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        let local = PackManifest::load_or_default(&self.state_path)?;
        Ok(update_available(&local, Some(&remote), &self.logger))
    }

    fn sync_builder(&self) -> Box<dyn SyncBuilder> {
        Box::new(ModrinthSyncBuilder {
            client: self.client.clone(),
            downloader: self.downloader.clone(),
            constraint: self.constraint.clone(),
            pack_path: self.pack_path.clone(),
            packed_as_file: self.packed_as_file,
            state_path: self.state_path.clone(),
            logger: Arc::clone(&self.logger),
            local: PackManifest::default(),
            resolved: None,
            availability: None,
            control: TransferControl::new(),
            pack_lock: None,
        })
    }
}

/// One check-and-apply cycle against Modrinth.
///
/// All cycle state is declared here: the cached descriptor, the
/// memoized decision, and the transfer handle.
pub struct ModrinthSyncBuilder {
    client: ModrinthClient,
    downloader: Downloader,
    constraint: GameVersionConstraint,
    pack_path: PathBuf,
    packed_as_file: bool,
    state_path: PathBuf,
    logger: Arc<Logger>,
    local: PackManifest,
    resolved: Option<ResolvedVersion>,
    availability: Option<bool>,
    control: TransferControl,
    pack_lock: Option<File>,
}

#[async_trait]
impl SyncBuilder for ModrinthSyncBuilder {
    async fn init(&mut self, ctx: &SyncContext) -> Result<()> {
        let constraint = self.constraint.resolve(ctx.runtime_version.as_deref())?;
        self.local = PackManifest::load_or_default(&self.state_path)?;
        let resolved = self.client.resolve_latest(&constraint).await?;
        self.logger.debug(
            "SYNC",
            format!(
                "Resolved remote version {} ({})",
                resolved.id, resolved.version_number
            ),
        );
        self.resolved = Some(resolved);
        self.availability = None;
        Ok(())
    }

    fn is_update_available(&mut self) -> bool {
        if let Some(cached) = self.availability {
            return cached;
        }
        let available = update_available(&self.local, self.resolved.as_ref(), &self.logger);
        self.availability = Some(available);
        available
    }

    fn update_size(&mut self) -> u64 {
        let available = self.is_update_available();
        update_size(available, self.resolved.as_ref())
    }

    fn downloaded_size(&self) -> u64 {
        self.control.downloaded()
    }

    fn hold_pack_lock(&mut self, handle: File) {
        self.pack_lock = Some(handle);
    }

    async fn do_update(&mut self, progress: &mut dyn SyncProgress) -> Result<SyncOutcome> {
        if !self.is_update_available() {
            self.logger
                .warn("SYNC", "do_update called while no update is available");
            return Ok(SyncOutcome::NoUpdate);
        }
        let remote = match &self.resolved {
            Some(remote) => remote.clone(),
            None => {
                return Err(SynpakError::Runtime(
                    "do_update called before init".into(),
                ))
            }
        };

        progress.set_phase("Downloading pack from modrinth");
        let fetched = self
            .downloader
            .fetch(
                &remote.url,
                &remote.sha1,
                remote.size,
                progress,
                &self.control,
                &self.logger,
            )
            .await?;
        let artifact = match fetched {
            FetchOutcome::Complete(artifact) => artifact,
            FetchOutcome::Interrupted => {
                self.logger.info(
                    "SYNC",
                    "Sync interrupted during download; local state unchanged",
                );
                return Ok(SyncOutcome::Interrupted);
            }
        };

        progress.set_phase("Updating metadata...");
        let mut manifest = self.local.clone();
        manifest.version = remote.id.clone();
        if self.constraint.is_unspecified() {
            manifest.version_number.clear();
        } else {
            manifest.version_number = remote.version_number.clone();
        }
        manifest.touch();
        apply::embed_manifest(&artifact, &manifest)?;

        if self.packed_as_file {
            progress.set_phase("Unlocking file.");
            if let Some(lock) = self.pack_lock.take() {
                drop(lock);
            }
            progress.set_phase("Move files...");
            apply::replace_file(artifact, &self.pack_path)?;
        } else {
            progress.set_phase("Extracting files...");
            apply::replace_tree(artifact, &self.pack_path)?;
        }

        progress.set_phase("Saving synpak.json");
        manifest.write(&self.state_path)?;
        self.local = manifest;
        self.logger
            .info("SYNC", format!("Pack updated to version {}", remote.id));

        progress.set_phase("Success");
        Ok(SyncOutcome::Succeeded)
    }

    fn interrupt(&self) {
        self.control.interrupt();
    }

    fn transfer_control(&self) -> TransferControl {
        self.control.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_logger() -> Logger {
        Logger::new(None, false).unwrap()
    }

    fn remote(id: &str, version_number: &str) -> ResolvedVersion {
        ResolvedVersion {
            id: id.into(),
            version_number: version_number.into(),
            url: "https://x/p.zip".into(),
            sha1: "abc123".into(),
            size: 100,
        }
    }

    fn local(version: &str, version_number: &str) -> PackManifest {
        PackManifest {
            version: version.into(),
            version_number: version_number.into(),
            last_update_timestamp: 0,
        }
    }

    #[test]
    fn absent_remote_means_no_update() {
        let logger = quiet_logger();
        assert!(!update_available(&local("v1", "1.0"), None, &logger));
    }

    #[test]
    fn equal_version_number_is_definitive_even_with_differing_ids() {
        let logger = quiet_logger();
        let remote = remote("v2", "1.0");
        assert!(!update_available(&local("v1", "1.0"), Some(&remote), &logger));
    }

    #[test]
    fn differing_ids_mean_update_available() {
        let logger = quiet_logger();
        let remote = remote("v2", "1.1");
        assert!(update_available(&local("v1", "1.0"), Some(&remote), &logger));
    }

    #[test]
    fn equal_ids_mean_already_applied() {
        let logger = quiet_logger();
        let remote = remote("v2", "1.1");
        assert!(!update_available(&local("v2", ""), Some(&remote), &logger));
    }

    #[test]
    fn never_synced_pack_sees_any_remote_as_update() {
        let logger = quiet_logger();
        let remote = remote("v1", "1.0");
        assert!(update_available(&PackManifest::default(), Some(&remote), &logger));
    }

    #[test]
    fn update_size_is_zero_when_not_available() {
        let version = remote("v2", "1.1");
        assert_eq!(update_size(false, Some(&version)), 0);
        assert_eq!(update_size(true, Some(&version)), 100);
        assert_eq!(update_size(true, None), 0);
    }
}
