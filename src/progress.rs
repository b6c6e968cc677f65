/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::progress
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Progress accounting for streamed downloads and the sink
    contract through which the host observes a sync cycle.

  Security / Safety Notes:
    Pure bookkeeping; no I/O performed in this module.

  Dependencies:
    std::sync atomics for the shared transfer handle.

  Operational Scope:
    The downloader feeds per-chunk byte counts through
    ProgressCounter and publishes them on TransferControl;
    the sync builder forwards phase labels and percentages to
    the host-provided SyncProgress sink.

  Revision History:
    2025-11-12 COD  Authored progress model.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Sentinel states expressed as types, not magic values
    - Advisory, polled cancellation — never a forced abort
============================================================*/

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Derived completion ratio of a transfer.
///
/// The two sentinels are deliberately distinct from the numeric
/// range: `Undefined` when the expected total is zero, `Overflow`
/// when the server sent more bytes than it announced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    Undefined,
    Overflow,
    Value(f32),
}

/// Cumulative byte counter for one streamed transfer.
#[derive(Debug, Clone, Copy)]
pub struct ProgressCounter {
    observed: u64,
    expected: u64,
}

impl ProgressCounter {
    pub fn new(expected: u64) -> Self {
        Self {
            observed: 0,
            expected,
        }
    }

    /// Record another chunk of `bytes` received.
    pub fn advance(&mut self, bytes: u64) {
        self.observed = self.observed.saturating_add(bytes);
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Derive the percentage; never stored, always computed.
    pub fn percentage(&self) -> Percentage {
        if self.expected == 0 {
            return Percentage::Undefined;
        }
        if self.observed > self.expected {
            return Percentage::Overflow;
        }
        if self.observed == self.expected {
            return Percentage::Value(100.0);
        }
        Percentage::Value(self.observed as f32 * 100.0 / self.expected as f32)
    }
}

/// Sink through which the host observes one check-and-apply cycle.
///
/// Invoked from the download task; implementations must either be
/// safe to call there or marshal to their own thread.
pub trait SyncProgress: Send {
    /// A new phase of the cycle has begun.
    fn set_phase(&mut self, phase: &str);

    /// A chunk of `file_name` arrived; `percentage` may carry the
    /// undefined/overflow sentinels.
    fn downloading(&mut self, file_name: &str, percentage: Percentage);
}

/// Sink for callers that do not observe progress.
#[derive(Debug, Default)]
pub struct NullProgress;

impl SyncProgress for NullProgress {
    fn set_phase(&mut self, _phase: &str) {}
    fn downloading(&mut self, _file_name: &str, _percentage: Percentage) {}
}

/// Shared handle over an in-flight transfer: advisory interruption
/// plus the cumulative byte count, both observable across tasks.
#[derive(Debug, Clone, Default)]
pub struct TransferControl {
    inner: Arc<TransferState>,
}

#[derive(Debug, Default)]
struct TransferState {
    interrupted: AtomicBool,
    downloaded: AtomicU64,
}

impl TransferControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop; polled at chunk granularity.
    pub fn interrupt(&self) {
        self.inner.interrupted.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.inner.interrupted.load(Ordering::Relaxed)
    }

    /// Publish the cumulative byte count of the current attempt.
    pub fn record(&self, total_bytes: u64) {
        self.inner.downloaded.store(total_bytes, Ordering::Relaxed);
    }

    pub fn downloaded(&self) -> u64 {
        self.inner.downloaded.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_undefined_when_expected_is_zero() {
        let counter = ProgressCounter::new(0);
        assert_eq!(counter.percentage(), Percentage::Undefined);
    }

    #[test]
    fn percentage_overflows_when_observed_exceeds_expected() {
        let mut counter = ProgressCounter::new(10);
        counter.advance(11);
        assert_eq!(counter.percentage(), Percentage::Overflow);
    }

    #[test]
    fn percentage_is_exactly_hundred_at_completion() {
        let mut counter = ProgressCounter::new(64);
        counter.advance(64);
        assert_eq!(counter.percentage(), Percentage::Value(100.0));
    }

    #[test]
    fn percentage_is_proportional_mid_transfer() {
        let mut counter = ProgressCounter::new(200);
        counter.advance(50);
        assert_eq!(counter.percentage(), Percentage::Value(25.0));
    }

    #[test]
    fn transfer_control_is_shared_across_clones() {
        let control = TransferControl::new();
        let observer = control.clone();
        control.record(42);
        control.interrupt();
        assert!(observer.is_interrupted());
        assert_eq!(observer.downloaded(), 42);
    }
}
