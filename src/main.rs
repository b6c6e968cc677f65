/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-Pak Core. Resolves the newest
    compatible remote pack version, reports availability, and
    optionally downloads and applies it.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTPS GET
    requests and writes to operator-configured paths only.

  Dependencies:
    clap for CLI parsing, chrono for session timestamps.

  Operational Scope:
    Invoked by operators or host tooling via `synpak_core`
    for standalone check or sync runs; hosts embedding the
    library drive the same builder directly.

  Revision History:
    2025-11-12 COD  Authored Syn-Pak Core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{ArgAction, Parser};

use synpak_core::error::Result;
use synpak_core::progress::{Percentage, SyncProgress};
use synpak_core::sync::{Remote, SyncBuilder};
use synpak_core::{Logger, ModrinthRemote, SyncContext, SyncOutcome, SynpakConfig};

/// Command-line arguments for Syn-Pak-Core.
#[derive(Debug, Parser)]
#[command(
    name = "Syn-Pak-Core",
    version,
    author = "Synavera Systems",
    about = "Conscious pack synchroniser for Syn-Pak"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Override the destination pack path.
    #[arg(long, value_name = "PATH")]
    pack: Option<PathBuf>,
    /// Override the Modrinth project id.
    #[arg(long, value_name = "ID")]
    project: Option<String>,
    /// Override the game-version constraint.
    #[arg(long = "game-version", value_name = "VER")]
    game_version: Option<String>,
    /// Host runtime version, consumed when the constraint is "current".
    #[arg(long = "runtime-version", value_name = "VER")]
    runtime_version: Option<String>,
    /// Report availability only; do not download or apply.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Syn-Pak-Core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = SynpakConfig::load_from_optional_path(cli.config.as_deref())?;
    if let Some(pack) = cli.pack.clone() {
        config.paths.pack_path = Some(pack);
    }
    if let Some(project) = cli.project.clone() {
        config.remote.project_id = Some(project);
    }
    if let Some(game_version) = cli.game_version.clone() {
        config.remote.game_version = game_version;
    }

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .or_else(|| Some(config.log_dir().join(format!("core_{session_stamp}.log"))));
    let logger = Arc::new(Logger::new(log_path, cli.verbose)?);
    logger.info("INIT", "Syn-Pak Core awakening.");

    let remote = ModrinthRemote::from_config(&config, Arc::clone(&logger))?;
    let ctx = SyncContext {
        runtime_version: cli.runtime_version.clone(),
    };

    let mut builder = remote.sync_builder();
    builder.init(&ctx).await?;

    let available = builder.is_update_available();
    let size = builder.update_size();
    logger.info(
        "STATUS",
        format!("update_available={available} update_size={size}"),
    );

    if cli.check || !available {
        println!(
            "→ {} (size={size} bytes)",
            if available {
                "Update available"
            } else {
                "Pack is up to date"
            }
        );
        logger.info("COMPLETE", "Consciousness synchronised.");
        logger.finalize()?;
        return Ok(ExitCode::SUCCESS);
    }

    // Ctrl-C requests a cooperative stop of the transfer.
    let control = builder.transfer_control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            control.interrupt();
        }
    });

    let mut progress = LoggerProgress::new(Arc::clone(&logger));
    let outcome = builder.do_update(&mut progress).await?;

    let code = match outcome {
        SyncOutcome::Succeeded => {
            println!("→ Pack synchronised ({} bytes)", builder.downloaded_size());
            ExitCode::SUCCESS
        }
        SyncOutcome::NoUpdate => ExitCode::SUCCESS,
        SyncOutcome::Interrupted => {
            // Not an error: a distinct "did not complete" outcome.
            println!("→ Sync interrupted; local pack unchanged");
            ExitCode::from(3)
        }
    };

    logger.info("COMPLETE", "Consciousness synchronised.");
    logger.finalize()?;
    Ok(code)
}

/// Progress sink that narrates the cycle into the session log,
/// throttling download lines to whole-decile steps.
struct LoggerProgress {
    logger: Arc<Logger>,
    last_decile: i8,
}

impl LoggerProgress {
    fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            last_decile: -1,
        }
    }
}

impl SyncProgress for LoggerProgress {
    fn set_phase(&mut self, phase: &str) {
        self.logger.info("PHASE", phase);
        self.last_decile = -1;
    }

    fn downloading(&mut self, file_name: &str, percentage: Percentage) {
        match percentage {
            Percentage::Undefined => {}
            Percentage::Overflow => {
                if self.last_decile != i8::MAX {
                    self.last_decile = i8::MAX;
                    self.logger
                        .warn("DOWNLOAD", format!("{file_name}: exceeded announced size"));
                }
            }
            Percentage::Value(value) => {
                let decile = (value / 10.0) as i8;
                if decile != self.last_decile {
                    self.last_decile = decile;
                    self.logger
                        .debug("DOWNLOAD", format!("{file_name}: {value:.0}%"));
                }
            }
        }
    }
}
