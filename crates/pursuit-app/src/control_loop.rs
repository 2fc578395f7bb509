//! Control loop thread: ticks the pursuit engine at a fixed cadence.
//!
//! The engine is created inside this thread and never shared. Commands
//! arrive on an `mpsc` channel; each tick's aim command is stored in the
//! shared slot for the host to poll. The loop never touches the network:
//! live snapshots are read from the ingestor's slot.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use pursuit_core::snapshot::TelemetrySnapshot;
use pursuit_feed::SnapshotReader;
use pursuit_sim::engine::{AimCommand, PursuitEngine};
use pursuit_sim::synthetic::SyntheticFeed;

use crate::state::ControlCommand;

/// Log a tracking summary every this many ticks.
const SUMMARY_EVERY: u64 = 100;

/// Where each tick's snapshot comes from.
pub enum SnapshotSource {
    /// Latest snapshot published by a running ingestor.
    Live(SnapshotReader),
    /// Synthesized from a scenario, advanced by one tick each time.
    Offline(SyntheticFeed),
}

impl SnapshotSource {
    fn next(&mut self, dt: f64) -> Option<Arc<TelemetrySnapshot>> {
        match self {
            SnapshotSource::Live(reader) => reader.latest(),
            SnapshotSource::Offline(feed) => Some(feed.advance(dt)),
        }
    }
}

/// Settings for one control loop run.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub tick_interval: Duration,
    pub max_ticks: Option<u64>,
}

/// How a control loop run ended.
#[derive(Debug, Clone, Default)]
pub struct LoopSummary {
    pub ticks: u64,
    /// Ticks on which a target was being tracked.
    pub ticks_on_target: u64,
    pub last: Option<AimCommand>,
}

/// Spawns the control loop in a new thread.
///
/// Returns the command sender and the handle yielding the run summary.
pub fn spawn_control_loop(
    engine: PursuitEngine,
    source: SnapshotSource,
    settings: LoopSettings,
    latest_command: Arc<Mutex<Option<AimCommand>>>,
) -> io::Result<(mpsc::Sender<ControlCommand>, JoinHandle<LoopSummary>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ControlCommand>();

    let handle = std::thread::Builder::new()
        .name("pursuit-control-loop".into())
        .spawn(move || run_control_loop(engine, source, settings, cmd_rx, &latest_command))?;

    Ok((cmd_tx, handle))
}

/// The control loop. Runs until Shutdown, channel disconnect or `max_ticks`.
fn run_control_loop(
    mut engine: PursuitEngine,
    mut source: SnapshotSource,
    settings: LoopSettings,
    cmd_rx: mpsc::Receiver<ControlCommand>,
    latest_command: &Mutex<Option<AimCommand>>,
) -> LoopSummary {
    let dt = settings.tick_interval.as_secs_f64();
    let mut summary = LoopSummary::default();
    let mut next_tick_time = Instant::now();

    info!(
        tick_ms = settings.tick_interval.as_millis() as u64,
        policy = ?engine.policy(),
        "control loop started"
    );

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(ControlCommand::SetPolicy(policy)) => {
                    info!(?policy, "target policy changed");
                    engine.set_policy(policy);
                }
                Ok(ControlCommand::ResetControllers) => engine.reset(),
                Ok(ControlCommand::Shutdown) => return finish(summary),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return finish(summary),
            }
        }

        // 2. Advance one tick against whatever snapshot is current
        let snapshot = source.next(dt);
        let command = engine.tick(snapshot.as_deref(), dt);
        summary.ticks += 1;
        if command.target.is_some() {
            summary.ticks_on_target += 1;
        }
        if summary.ticks % SUMMARY_EVERY == 0 {
            debug!(
                tick = command.tick,
                yaw = command.yaw,
                pitch = command.pitch,
                on_target = summary.ticks_on_target,
                "tracking"
            );
        }

        // 3. Store latest command for polling
        if let Ok(mut lock) = latest_command.lock() {
            *lock = Some(command.clone());
        }
        summary.last = Some(command);

        if settings.max_ticks.is_some_and(|max| summary.ticks >= max) {
            return finish(summary);
        }

        // 4. Sleep until next tick
        next_tick_time += settings.tick_interval;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > settings.tick_interval * 2 {
            // Too far behind; reset to avoid a catch-up burst
            next_tick_time = now;
        }
    }
}

fn finish(summary: LoopSummary) -> LoopSummary {
    info!(
        ticks = summary.ticks,
        on_target = summary.ticks_on_target,
        "control loop stopped"
    );
    summary
}
