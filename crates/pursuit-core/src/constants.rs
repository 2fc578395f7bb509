//! Control-loop constants and tuning parameters.

use std::f64::consts::PI;
use std::time::Duration;

// --- Control loop ---

/// Nominal control tick (aligned to the capture agent's packet cadence).
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Seconds per tick.
pub const DT: f64 = 0.05;

// --- Angles ---

/// Pitch pole limit (89°) in radians. Same value as `89f64.to_radians()`.
pub const MAX_PITCH_RAD: f64 = 89.0 * (PI / 180.0);

// --- Controllers ---

/// Default maximum angular rate for yaw (rad/s).
pub const MAX_YAW_RATE: f64 = PI;

/// Default maximum angular rate for pitch (rad/s).
pub const MAX_PITCH_RATE: f64 = PI / 2.0;

/// Default proportional gain for the rate-limited controller.
pub const DEFAULT_KP: f64 = 1.0;

/// Default natural frequency for the critically-damped controller (rad/s).
pub const DEFAULT_NATURAL_FREQ: f64 = 8.0;

/// Damping ratio giving a critically-damped response.
pub const CRITICAL_DAMPING: f64 = 1.0;

// --- Targeting ---

/// Health ratio at or below which a hostile is ranked in the low-health tier.
pub const DEFAULT_LOW_HEALTH_THRESHOLD: f64 = 0.3;

// --- Scenarios ---

/// Default orbit radius.
pub const ORBIT_RADIUS: f64 = 10.0;

/// Default orbit angular speed (rad/s).
pub const ORBIT_ANGULAR_SPEED: f64 = 0.5;

/// Default helix radius.
pub const HELIX_RADIUS: f64 = 8.0;

/// Default helix angular speed (rad/s).
pub const HELIX_ANGULAR_SPEED: f64 = 0.6;

/// Default helix climb rate (units/s).
pub const HELIX_VERTICAL_SPEED: f64 = 1.0;

// --- Telemetry feed ---

/// Default capture agent endpoint (ZeroMQ PUB socket).
pub const DEFAULT_FEED_ADDR: &str = "tcp://127.0.0.1:3000";

/// Largest accepted feed message. Bigger ones are dropped with the connection.
pub const MAX_FEED_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Receive timeout per ingestion iteration. Bounds stop() latency.
pub const FEED_RECV_TIMEOUT: Duration = Duration::from_millis(250);

/// Pause after an unexpected transport error.
pub const FEED_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// How long stop() waits for the ingestion thread.
pub const FEED_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Feed distance units per meter (capture agent scale, display only).
pub const UNITS_PER_METER: f64 = 16.49;
