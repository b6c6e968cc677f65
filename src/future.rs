/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::future
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide scaffolding for Syn-Pak-Core roadmap features
    such as additional hosting backends, delta patching, and
    mirror selection.

  Security / Safety Notes:
    No operational code is executed; this module documents
    planned extension points to guide safe implementations.

  Dependencies:
    None at runtime; placeholder traits only.

  Operational Scope:
    Referenced by developers when implementing Syn-Pak v2+.

  Revision History:
    2025-11-12 COD  Added future expansion scaffolding.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit documentation of deferred capabilities
    - Clearly fenced placeholders to avoid accidental use
============================================================*/

#![allow(dead_code)]

/// Planned hook for backends that publish delta patches rather than
/// whole artifacts.
pub trait DeltaFeed {
    /// List patch steps from the applied version to the target.
    fn patch_chain(&self, from_version: &str, to_version: &str) -> Vec<String>;
}

/// Planned hook for download mirror selection.
pub trait MirrorSelector {
    /// Order candidate URLs by preference for this host.
    fn rank(&self, candidates: &[String]) -> Vec<String>;
}

/// Planned hook for release-channel filtering (alpha/beta/release).
pub trait ChannelPolicy {
    /// Whether a published channel is acceptable for this pack.
    fn admits(&self, channel: &str) -> bool;
}

/// Backend registration entry point. Currently a stub.
pub fn register_backend<T>(_backend: T)
where
    T: DeltaFeed + MirrorSelector + ChannelPolicy + Send + Sync + 'static,
{
    // Placeholder: the dynamic backend registry lands in Syn-Pak v2.
}
