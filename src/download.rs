/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::download
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Stream a remote artifact into temporary storage with
    integrity verification, bounded retries, per-chunk
    progress, and cooperative cancellation.

  Security / Safety Notes:
    Transfers are size-capped while streaming; artifacts are
    never handed onward before their SHA-1 matches the
    descriptor from the version record.

  Dependencies:
    reqwest + futures-util for streaming, sha1/hex for
    verification, tempfile for unreferenced partial cleanup.

  Operational Scope:
    The only long-blocking stage of a sync; runs on the async
    runtime, off any interactive thread. Local state is never
    touched here.

  Revision History:
    2025-11-12 COD  Authored retrying hash-verified downloader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Retries stay within an explicit attempt budget
    - Fatal conditions (size cap) never retried
    - Cancellation polled at chunk granularity, never forced
============================================================*/

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use sha1::{Digest, Sha1};
use tempfile::NamedTempFile;

use crate::config::DownloadConfig;
use crate::error::{Result, SynpakError};
use crate::logger::Logger;
use crate::progress::{ProgressCounter, SyncProgress, TransferControl};

/// Result of a bounded-retry fetch: a verified artifact, or a
/// cooperative stop. Interruption is an outcome, not an error.
pub enum FetchOutcome {
    Complete(NamedTempFile),
    Interrupted,
}

enum Attempt {
    Complete(NamedTempFile),
    Interrupted,
}

/// Retrying, hash-verified, progress-reporting artifact fetcher.
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
    max_attempts: usize,
    size_limit_bytes: u64,
    work_dir: PathBuf,
}

impl Downloader {
    /// Construct a downloader writing partial files into `work_dir`.
    ///
    /// `work_dir` should share a filesystem with the destination so
    /// the final apply can rename instead of copy.
    pub fn new(config: &DownloadConfig, timeout_secs: u64, work_dir: PathBuf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Syn-Pak-Core/0.3 (linux)")
            .build()
            .map_err(|err| SynpakError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
            size_limit_bytes: config.size_limit_bytes,
            work_dir,
        })
    }

    /// Fetch `url` into a temporary file, verifying its SHA-1.
    ///
    /// Performs at most `max_attempts` hash-check cycles; transient
    /// network failures and integrity mismatches consume the same
    /// budget. Exceeding the size cap aborts without retry. An
    /// interrupt request stops the transfer promptly and leaves no
    /// partial file referenced.
    pub async fn fetch(
        &self,
        url: &str,
        expected_sha1: &str,
        expected_size: u64,
        progress: &mut dyn SyncProgress,
        control: &TransferControl,
        logger: &Logger,
    ) -> Result<FetchOutcome> {
        let file_name = url.rsplit('/').next().unwrap_or(url);

        let mut attempt = 0;
        while attempt < self.max_attempts {
            attempt += 1;
            match self
                .fetch_once(url, file_name, expected_size, progress, control)
                .await
            {
                Ok(Attempt::Interrupted) => {
                    logger.info(
                        "FETCH",
                        format!("Transfer of {file_name} stopped by interrupt request"),
                    );
                    return Ok(FetchOutcome::Interrupted);
                }
                Ok(Attempt::Complete(tmp)) => {
                    let actual = sha1_file(tmp.path())?;
                    if actual.eq_ignore_ascii_case(expected_sha1) {
                        logger.debug(
                            "FETCH",
                            format!("{file_name} verified on attempt {attempt}"),
                        );
                        return Ok(FetchOutcome::Complete(tmp));
                    }
                    let mismatch = SynpakError::IntegrityMismatch {
                        expected: expected_sha1.to_string(),
                        actual,
                    };
                    logger.warn(
                        "FETCH",
                        format!(
                            "Attempt {attempt}/{} for {file_name}: {mismatch}",
                            self.max_attempts
                        ),
                    );
                    progress.set_phase("Failed. Downloading again...");
                }
                Err(SynpakError::Network(message)) => {
                    logger.warn(
                        "FETCH",
                        format!("Attempt {attempt}/{}: {message}", self.max_attempts),
                    );
                    progress.set_phase("Failed. Downloading again...");
                }
                Err(fatal) => return Err(fatal),
            }
        }

        progress.set_phase("Fatal error.");
        Err(SynpakError::DownloadFailed {
            attempts: self.max_attempts,
        })
    }

    async fn fetch_once(
        &self,
        url: &str,
        file_name: &str,
        expected_size: u64,
        progress: &mut dyn SyncProgress,
        control: &TransferControl,
    ) -> Result<Attempt> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SynpakError::Network(format!("Request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynpakError::Network(format!(
                "Request to {url} failed with status {status}"
            )));
        }

        let expected = response.content_length().unwrap_or(expected_size);
        let mut counter = ProgressCounter::new(expected);

        std::fs::create_dir_all(&self.work_dir).map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to create work directory {}: {err}",
                self.work_dir.display()
            ))
        })?;
        let mut tmp = tempfile::Builder::new()
            .prefix("synpak-")
            .suffix(".part")
            .tempfile_in(&self.work_dir)
            .map_err(|err| {
                SynpakError::Filesystem(format!(
                    "Failed to create temp file in {}: {err}",
                    self.work_dir.display()
                ))
            })?;

        let mut stream = response.bytes_stream();
        loop {
            if control.is_interrupted() {
                return Ok(Attempt::Interrupted);
            }
            let Some(chunk) = stream.next().await else {
                break;
            };
            let chunk = chunk
                .map_err(|err| SynpakError::Network(format!("Stream from {url} failed: {err}")))?;

            counter.advance(chunk.len() as u64);
            if counter.observed() > self.size_limit_bytes {
                return Err(SynpakError::SizeLimitExceeded {
                    limit: self.size_limit_bytes,
                });
            }

            tmp.as_file_mut().write_all(&chunk).map_err(|err| {
                SynpakError::Filesystem(format!(
                    "Failed to write temp file {}: {err}",
                    tmp.path().display()
                ))
            })?;

            control.record(counter.observed());
            progress.downloading(file_name, counter.percentage());
        }

        tmp.as_file_mut().flush().map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to flush temp file {}: {err}",
                tmp.path().display()
            ))
        })?;
        Ok(Attempt::Complete(tmp))
    }
}

/// Compute the lowercase hex SHA-1 of a file's contents.
pub fn sha1_file(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|err| {
        SynpakError::Filesystem(format!(
            "Failed to open {} for hashing: {err}",
            path.display()
        ))
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut buffer).map_err(|err| {
            SynpakError::Filesystem(format!("Failed to read {} for hashing: {err}", path.display()))
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_file_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vector.bin");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha1_file(&path).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn sha1_of_missing_file_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha1_file(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, SynpakError::Filesystem(_)));
    }
}
