/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Library surface of Syn-Pak Core: version resolution,
    integrity-verified download, and atomic apply for remotely
    hosted content packs.

  Security / Safety Notes:
    Read-only HTTPS requests and operator-controlled paths
    only; no credentials are handled anywhere in the crate.

  Dependencies:
    See Cargo.toml; module headers name their own.

  Operational Scope:
    Embedded by hosts that manage a content pack, and by the
    synpak_core binary for standalone operation.

  Revision History:
    2025-11-12 COD  Established library surface.
  ------------------------------------------------------------
  SSE Principles Observed:
    - One module per concern, declared once
    - Re-exports limited to the host-facing contract
============================================================*/

pub mod apply;
pub mod config;
pub mod download;
pub mod error;
pub mod future;
pub mod logger;
pub mod manifest;
pub mod modrinth;
pub mod progress;
pub mod sync;
pub mod version;

pub use config::SynpakConfig;
pub use error::{Result, SynpakError};
pub use logger::Logger;
pub use manifest::PackManifest;
pub use progress::{NullProgress, Percentage, SyncProgress, TransferControl};
pub use sync::{ModrinthRemote, Remote, SyncBuilder, SyncContext, SyncOutcome};
pub use version::GameVersionConstraint;
