//! Console binary for the Tamagotchi pet simulation.
//!
//! Wires the session loop to the persistence worker, the credential
//! refresh task, and a line-based console, then runs until stopped.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tamagotchi-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Read stored tokens and build the credential cell
//! 4. Build the persistence backend and token refresher
//! 5. Spawn the persistence worker and the refresh task
//! 6. Start console input and the ctrl-c handler
//! 7. Run the session loop
//! 8. Drain the worker and log the result

mod console;
mod error;
mod sink;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tamagotchi_core::config::PetConfig;
use tamagotchi_core::runner::{self, SessionChannels, SessionControl};
use tamagotchi_core::session::Session;
use tamagotchi_remote::auth::AuthProvider;
use tamagotchi_remote::credentials::CredentialCell;
use tamagotchi_remote::refresh::spawn_refresh;
use tamagotchi_remote::store::PetStore;
use tamagotchi_remote::token_store::TokenStore;
use tamagotchi_remote::worker::{PetWorker, spawn_worker};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::sink::LogSink;

const CONFIG_FILE: &str = "tamagotchi-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the session itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    the file was found and report it afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("tamagotchi-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        tick_period_ms = config.clock.tick_period_ms,
        simulation_speed = config.clock.simulation_speed,
        backend = ?config.remote.backend,
        "Configuration loaded"
    );

    // 3. Stored credentials.
    let token_store = TokenStore::new(&config.remote.token_file);
    let tokens = match token_store.load().await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(
                path = %token_store.path().display(),
                error = %e,
                "Ignoring unreadable token file"
            );
            None
        }
    };
    let credentials = CredentialCell::new(tokens);
    info!(signed_in = credentials.is_signed_in(), "Credentials initialized");

    // 4. Remote clients.
    let store = PetStore::from_config(&config.remote).map_err(EngineError::from)?;
    let auth = AuthProvider::from_config(&config.remote).map_err(EngineError::from)?;

    // 5. Background tasks.
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let (job_tx, job_rx) = mpsc::unbounded_channel();

    let worker = PetWorker::new(store, auth.clone(), credentials.clone())
        .with_token_store(token_store.clone());
    let worker_handle = spawn_worker(worker, job_rx, outcome_tx);
    let refresh_handle = spawn_refresh(
        auth,
        credentials.clone(),
        Some(token_store),
        Duration::from_millis(config.remote.refresh_interval_ms),
    );

    // 6. Input.
    let control = Arc::new(SessionControl::new(config.clock.max_ticks));
    let stopper = Arc::clone(&control);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
            stopper.request_stop();
        }
    });
    // The console thread is detached; it may sit in a stdin read until
    // the process exits.
    if let Err(e) = console::spawn_console(command_tx.clone(), Arc::clone(&control)) {
        warn!(error = %e, "Console input unavailable");
    }

    // 7. Run the session.
    let mut session = Session::new(&config, credentials.is_signed_in()).map_err(EngineError::from)?;
    let mut channels = SessionChannels {
        commands: command_rx,
        outcomes: outcome_rx,
        jobs: job_tx,
    };
    let mut sink = LogSink::new();
    let result = runner::run_session(&mut session, &mut channels, &control, &mut sink)
        .await
        .map_err(EngineError::from)?;

    // 8. Let the worker finish queued saves, then shut down.
    refresh_handle.abort();
    drop(channels);
    drop(command_tx);
    if let Err(e) = worker_handle.await {
        warn!(error = %e, "Persistence worker ended abnormally");
    }

    runner::log_session_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "tamagotchi-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `tamagotchi-config.yaml` in the working
/// directory. Returns whether the file existed.
fn load_config() -> Result<(PetConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((PetConfig::from_file(config_path)?, true))
    } else {
        let mut config = PetConfig::default();
        config.remote.apply_env_overrides();
        Ok((config, false))
    }
}
