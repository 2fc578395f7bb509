//! Fundamental geometric types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// 3D position in world space (shared feed units, Cartesian).
/// y = Up, x/z span the horizontal plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A yaw/pitch pair in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AimAngles {
    pub yaw: f64,
    pub pitch: f64,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector from `self` to `other`.
    pub fn offset_to(&self, other: &Position) -> DVec3 {
        DVec3::from(*other) - DVec3::from(*self)
    }

    /// Range to another position (3D distance).
    pub fn range_to(&self, other: &Position) -> f64 {
        self.offset_to(other).length()
    }

    /// Squared range. Same ordering as `range_to` without the root.
    pub fn range_squared_to(&self, other: &Position) -> f64 {
        self.offset_to(other).length_squared()
    }

    /// Horizontal range (ignoring height).
    pub fn horizontal_range_to(&self, other: &Position) -> f64 {
        let d = self.offset_to(other);
        crate::angles::horizontal_distance(d.x, d.z)
    }

    /// Linear interpolation; `u = 0` is `self`, `u = 1` is `other`.
    pub fn lerp(&self, other: &Position, u: f64) -> Position {
        DVec3::from(*self).lerp(DVec3::from(*other), u).into()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Position> for DVec3 {
    fn from(p: Position) -> Self {
        DVec3::new(p.x, p.y, p.z)
    }
}

impl From<DVec3> for Position {
    fn from(v: DVec3) -> Self {
        Position::new(v.x, v.y, v.z)
    }
}

impl AimAngles {
    pub const fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    /// Both angles normalized into (-π, π], pitch clamped to the pole limit.
    pub fn sanitized(self) -> Self {
        Self {
            yaw: crate::angles::normalize(self.yaw),
            pitch: crate::angles::clamp_pitch(crate::angles::normalize(self.pitch)),
        }
    }
}
