/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-Pak-Core error types so every sync stage
    reports failures with consistent diagnostics and exit
    semantics.

  Security / Safety Notes:
    Error contexts carry URLs and local paths only; no remote
    credentials exist in this system to leak.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate failures of one sync
    cycle and consolidate exit codes for the binary entry
    point. An interrupted sync is an outcome, not an error,
    and never passes through this type.

  Revision History:
    2025-11-12 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-Pak-Core operations.
pub type Result<T> = std::result::Result<T, SynpakError>;

/// Enumerates high-level error domains surfaced by Syn-Pak-Core.
#[derive(Debug, Error)]
pub enum SynpakError {
    /// Transient transport failure (timeout, connection reset,
    /// non-2xx status). Retryable within the download attempt
    /// budget; fatal everywhere else.
    #[error("Network: {0}")]
    Network(String),
    /// A completed transfer whose SHA-1 does not match the
    /// descriptor. Consumed by the attempt budget inside the
    /// downloader; surfaces only when diagnostics demand it.
    #[error("Integrity mismatch: expected sha1 {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    /// No published version satisfies the active game-version
    /// constraint. Fatal to this sync cycle.
    #[error("Resolution: {0}")]
    ResolutionNotFound(String),
    /// The remote API violated its own contract (malformed body,
    /// missing primary artifact). Fatal; never read as "no update".
    #[error("Remote data: {0}")]
    MalformedRemoteData(String),
    /// Streamed transfer exceeded the configured byte ceiling.
    /// Fatal and never retried.
    #[error("Size limit of {limit} bytes exceeded during download")]
    SizeLimitExceeded { limit: u64 },
    /// The attempt budget ran out without a verified artifact.
    /// Local state is untouched when this surfaces.
    #[error("Download failed after {attempts} attempts")]
    DownloadFailed { attempts: usize },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SynpakError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SynpakError::Config(_) => ExitCode::from(20),
            SynpakError::Network(_) => ExitCode::from(30),
            SynpakError::Serialization(_) => ExitCode::from(31),
            SynpakError::MalformedRemoteData(_) => ExitCode::from(32),
            SynpakError::ResolutionNotFound(_) => ExitCode::from(33),
            SynpakError::IntegrityMismatch { .. } => ExitCode::from(34),
            SynpakError::SizeLimitExceeded { .. } => ExitCode::from(35),
            SynpakError::DownloadFailed { .. } => ExitCode::from(36),
            SynpakError::Filesystem(_) => ExitCode::from(40),
            SynpakError::Io(_) => ExitCode::from(41),
            SynpakError::Runtime(_) => ExitCode::from(50),
        }
    }
}
