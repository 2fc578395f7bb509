//! Angle normalization and aim geometry helpers.
//!
//! Every angle is in radians. Wrapped angles live in the half-open
//! interval (-π, π]; a difference of exactly π resolves to +π.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::constants::MAX_PITCH_RAD;

/// Map any finite angle into (-π, π]. Non-finite input is returned as-is.
pub fn normalize(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid lands in [0, TAU), so the only value outside the interval is -π.
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Smallest signed delta such that `current + delta` equals `target` modulo 2π.
pub fn angle_diff(current: f64, target: f64) -> f64 {
    normalize(target - current)
}

/// Length of the horizontal component of an offset.
pub fn horizontal_distance(dx: f64, dz: f64) -> f64 {
    dx.hypot(dz)
}

/// Clamp pitch to ±89° to keep away from the poles.
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD)
}

/// Unit view direction for a yaw/pitch pair (yaw about +Y, pitch up from the x/z plane).
pub fn forward_vector(yaw: f64, pitch: f64) -> DVec3 {
    let cp = pitch.cos();
    DVec3::new(yaw.cos() * cp, pitch.sin(), yaw.sin() * cp)
}
