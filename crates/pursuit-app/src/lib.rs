//! Headless pursuit controller host.
//!
//! Wires the crates together: reads configuration, starts the telemetry
//! ingestor in live mode, and runs the control loop thread that publishes
//! the latest aim command into shared state.

pub mod config;
pub mod control_loop;
pub mod state;
pub mod telemetry;

use std::fmt;

use tracing::{info, warn};

use pursuit_core::enums::{FeedMode, FeedTransport};
use pursuit_core::error::ConfigError;
use pursuit_feed::{IngestError, IngestStats, TcpFeed, TelemetryIngestor, ZmqFeed};
use pursuit_sim::presets::Preset;
use pursuit_sim::synthetic::SyntheticFeed;
use pursuit_sim::PursuitEngine;

use crate::config::AppConfig;
use crate::control_loop::{spawn_control_loop, LoopSettings, LoopSummary, SnapshotSource};
use crate::state::AppState;

pub use pursuit_core as core;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Ingest(IngestError),
    Spawn(std::io::Error),
    /// The control loop thread panicked.
    LoopPanicked,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "invalid configuration: {e}"),
            AppError::Ingest(e) => write!(f, "telemetry ingestor: {e}"),
            AppError::Spawn(e) => write!(f, "failed to spawn control loop: {e}"),
            AppError::LoopPanicked => f.write_str("control loop panicked"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Ingest(e) => Some(e),
            AppError::Spawn(e) => Some(e),
            AppError::LoopPanicked => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        AppError::Ingest(e)
    }
}

/// What a finished run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: LoopSummary,
    /// Ingestor counters, live mode only.
    pub ingest: Option<IngestStats>,
}

/// Run the controller until the control loop stops: `max_ticks` reached,
/// `ControlCommand::Shutdown` sent through `state`, or the sender dropped.
pub fn run(config: &AppConfig, state: &AppState) -> Result<RunReport, AppError> {
    let preset = Preset::build(config.preset)?;
    let engine = PursuitEngine::from_preset(&preset, config.policy);

    let mut ingestor = None;
    let source = match config.mode {
        FeedMode::Offline => {
            info!(preset = ?config.preset, scenario = preset.scenario.name(), "offline run");
            SnapshotSource::Offline(SyntheticFeed::new(preset.scenario))
        }
        FeedMode::Live => {
            let addr = config.feed_addr.as_str();
            let mut live = match config.transport {
                FeedTransport::Zmq => TelemetryIngestor::new(ZmqFeed::new(addr), config.ingestor.clone()),
                FeedTransport::Tcp => TelemetryIngestor::new(TcpFeed::new(addr), config.ingestor.clone()),
            };
            live.start()?;
            let reader = live.handle();
            ingestor = Some(live);
            SnapshotSource::Live(reader)
        }
    };

    let settings = LoopSettings {
        tick_interval: config.tick_interval,
        max_ticks: config.max_ticks,
    };
    let (cmd_tx, handle) =
        spawn_control_loop(engine, source, settings, state.latest_command.clone())
            .map_err(AppError::Spawn)?;
    if let Ok(mut lock) = state.command_tx.lock() {
        *lock = Some(cmd_tx);
    }

    let summary = handle.join().map_err(|_| AppError::LoopPanicked);
    if let Ok(mut lock) = state.command_tx.lock() {
        *lock = None;
    }

    let ingest = ingestor.map(|mut live| {
        if let Err(e) = live.stop() {
            // Non-fatal: the thread was told to stop and will exit on its own.
            warn!(error = %e, "ingestor did not shut down cleanly");
        }
        live.stats()
    });
    if let Some(stats) = &ingest {
        info!(
            received = stats.received,
            published = stats.published,
            malformed = stats.malformed,
            transport_errors = stats.transport_errors,
            "ingest totals"
        );
    }

    Ok(RunReport {
        summary: summary?,
        ingest,
    })
}
