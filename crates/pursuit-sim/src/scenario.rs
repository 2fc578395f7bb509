//! Synthetic target motion for offline runs and tests.
//!
//! A scenario maps elapsed time (seconds) to a target position. Every
//! variant is pure: the same `t` always yields bit-identical output.

use pursuit_core::constants::*;
use pursuit_core::error::{ensure_finite, ConfigError};
use pursuit_core::types::Position;

/// A timed point on a keyframed path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub time: f64,
    pub position: Position,
}

impl Waypoint {
    pub const fn new(time: f64, position: Position) -> Self {
        Self { time, position }
    }
}

/// Circle of `radius` in the horizontal plane at y = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f64,
    pub angular_speed: f64,
}

impl Orbit {
    pub fn new(radius: f64, angular_speed: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            radius: ensure_finite("radius", radius)?,
            angular_speed: ensure_finite("angular_speed", angular_speed)?,
        })
    }

    pub fn position_at(&self, t: f64) -> Position {
        let theta = self.angular_speed * t;
        Position::new(self.radius * theta.cos(), 0.0, self.radius * theta.sin())
    }
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius: ORBIT_RADIUS,
            angular_speed: ORBIT_ANGULAR_SPEED,
        }
    }
}

/// Orbit that climbs at `vertical_speed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helix {
    pub radius: f64,
    pub angular_speed: f64,
    pub vertical_speed: f64,
}

impl Helix {
    pub fn new(radius: f64, angular_speed: f64, vertical_speed: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            radius: ensure_finite("radius", radius)?,
            angular_speed: ensure_finite("angular_speed", angular_speed)?,
            vertical_speed: ensure_finite("vertical_speed", vertical_speed)?,
        })
    }

    pub fn position_at(&self, t: f64) -> Position {
        let theta = self.angular_speed * t;
        Position::new(
            self.radius * theta.cos(),
            self.vertical_speed * t,
            self.radius * theta.sin(),
        )
    }
}

impl Default for Helix {
    fn default() -> Self {
        Self {
            radius: HELIX_RADIUS,
            angular_speed: HELIX_ANGULAR_SPEED,
            vertical_speed: HELIX_VERTICAL_SPEED,
        }
    }
}

/// Piecewise-linear path through time-ordered waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframed {
    waypoints: Vec<Waypoint>,
    looped: bool,
}

impl Keyframed {
    /// Needs at least two waypoints with finite, non-decreasing times.
    pub fn new(waypoints: Vec<Waypoint>, looped: bool) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        for (i, w) in waypoints.iter().enumerate() {
            ensure_finite("waypoint time", w.time)?;
            if !w.position.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: "waypoint position",
                });
            }
            if i > 0 && w.time < waypoints[i - 1].time {
                return Err(ConfigError::NonMonotonicWaypoints { index: i });
            }
        }
        Ok(Self { waypoints, looped })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Time of the last waypoint; one loop period when looped.
    pub fn duration(&self) -> f64 {
        self.waypoints.last().map_or(0.0, |w| w.time)
    }

    pub fn position_at(&self, t: f64) -> Position {
        let (first, last) = match (self.waypoints.first(), self.waypoints.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Position::ORIGIN,
        };

        let period = last.time;
        let t = if self.looped && period > 0.0 {
            t.rem_euclid(period)
        } else {
            t
        };

        if t <= first.time {
            return first.position;
        }
        if t >= last.time {
            return last.position;
        }

        // First segment whose end is past t; t is strictly inside (first, last).
        let end = self.waypoints.partition_point(|w| w.time <= t);
        let (a, b) = (&self.waypoints[end - 1], &self.waypoints[end]);
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.position;
        }
        a.position.lerp(&b.position, (t - a.time) / span)
    }
}

/// Closed set of synthetic target motions.
#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    Orbit(Orbit),
    Keyframed(Keyframed),
    Helix(Helix),
}

impl Scenario {
    /// Target position after `t` seconds.
    pub fn position_at(&self, t: f64) -> Position {
        match self {
            Scenario::Orbit(s) => s.position_at(t),
            Scenario::Keyframed(s) => s.position_at(t),
            Scenario::Helix(s) => s.position_at(t),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Orbit(_) => "orbit",
            Scenario::Keyframed(_) => "keyframed",
            Scenario::Helix(_) => "helix",
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::Orbit(Orbit::default())
    }
}

impl From<Orbit> for Scenario {
    fn from(s: Orbit) -> Self {
        Scenario::Orbit(s)
    }
}

impl From<Keyframed> for Scenario {
    fn from(s: Keyframed) -> Self {
        Scenario::Keyframed(s)
    }
}

impl From<Helix> for Scenario {
    fn from(s: Helix) -> Self {
        Scenario::Helix(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn square() -> Vec<Waypoint> {
        vec![
            Waypoint::new(0.0, Position::new(0.0, 0.0, 0.0)),
            Waypoint::new(2.0, Position::new(10.0, 0.0, 0.0)),
            Waypoint::new(4.0, Position::new(10.0, 0.0, 10.0)),
        ]
    }

    #[test]
    fn test_orbit_positions() {
        let o = Orbit::default();
        assert_eq!(o.position_at(0.0), Position::new(10.0, 0.0, 0.0));
        let q = o.position_at(PI); // theta = π/2
        assert!(q.x.abs() < 1e-12 && (q.z - 10.0).abs() < 1e-12, "got {q:?}");
        for t in [0.0, 1.3, 7.7, -4.0] {
            let p = o.position_at(t);
            assert!((Position::ORIGIN.range_to(&p) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_helix_climbs() {
        let h = Helix::default();
        assert_eq!(h.position_at(0.0), Position::new(8.0, 0.0, 0.0));
        assert_eq!(h.position_at(3.0).y, 3.0);
        assert!((h.position_at(3.0).horizontal_range_to(&Position::ORIGIN) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyframed_interpolates() {
        let k = Keyframed::new(square(), false).unwrap();
        assert_eq!(k.position_at(1.0), Position::new(5.0, 0.0, 0.0));
        assert_eq!(k.position_at(2.0), Position::new(10.0, 0.0, 0.0));
        assert_eq!(k.position_at(3.0), Position::new(10.0, 0.0, 5.0));
    }

    #[test]
    fn test_keyframed_clamps_outside_range() {
        let k = Keyframed::new(square(), false).unwrap();
        assert_eq!(k.position_at(-5.0), Position::new(0.0, 0.0, 0.0));
        assert_eq!(k.position_at(100.0), Position::new(10.0, 0.0, 10.0));
    }

    #[test]
    fn test_keyframed_loop_wraps() {
        let k = Keyframed::new(square(), true).unwrap();
        assert_eq!(k.position_at(5.0), k.position_at(1.0));
        assert_eq!(k.position_at(-3.0), k.position_at(1.0));
        assert_eq!(k.position_at(9.0), k.position_at(1.0));
    }

    #[test]
    fn test_keyframed_zero_length_segment() {
        let k = Keyframed::new(
            vec![
                Waypoint::new(0.0, Position::new(0.0, 0.0, 0.0)),
                Waypoint::new(1.0, Position::new(1.0, 0.0, 0.0)),
                Waypoint::new(1.0, Position::new(5.0, 0.0, 0.0)),
                Waypoint::new(2.0, Position::new(5.0, 2.0, 0.0)),
            ],
            false,
        )
        .unwrap();
        let p = k.position_at(1.0);
        assert!(p.is_finite());
        assert_eq!(k.position_at(1.5), Position::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn test_keyframed_all_at_zero_time() {
        let k = Keyframed::new(
            vec![
                Waypoint::new(0.0, Position::new(1.0, 0.0, 0.0)),
                Waypoint::new(0.0, Position::new(2.0, 0.0, 0.0)),
            ],
            true,
        )
        .unwrap();
        assert_eq!(k.position_at(0.0), Position::new(1.0, 0.0, 0.0));
        assert_eq!(k.position_at(3.0), Position::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_keyframed_rejects_bad_waypoints() {
        assert_eq!(
            Keyframed::new(vec![Waypoint::new(0.0, Position::ORIGIN)], false),
            Err(ConfigError::TooFewWaypoints { count: 1 })
        );
        assert_eq!(
            Keyframed::new(
                vec![
                    Waypoint::new(1.0, Position::ORIGIN),
                    Waypoint::new(0.5, Position::ORIGIN),
                ],
                false
            ),
            Err(ConfigError::NonMonotonicWaypoints { index: 1 })
        );
        assert!(Keyframed::new(
            vec![
                Waypoint::new(0.0, Position::ORIGIN),
                Waypoint::new(f64::NAN, Position::ORIGIN),
            ],
            false
        )
        .is_err());
    }

    #[test]
    fn test_scenarios_are_pure() {
        let scenarios: Vec<Scenario> = vec![
            Orbit::default().into(),
            Helix::default().into(),
            Keyframed::new(square(), true).unwrap().into(),
        ];
        for s in &scenarios {
            for i in 0..200 {
                let t = i as f64 * 0.173 - 5.0;
                let a = s.position_at(t);
                let b = s.position_at(t);
                assert_eq!(a.x.to_bits(), b.x.to_bits(), "{} at {t}", s.name());
                assert_eq!(a.y.to_bits(), b.y.to_bits(), "{} at {t}", s.name());
                assert_eq!(a.z.to_bits(), b.z.to_bits(), "{} at {t}", s.name());
            }
        }
    }
}
