//! Angle controllers: per-tick filters that move a current angle toward a
//! desired angle without exceeding an angular rate bound.
//!
//! Both variants measure the error the short way round the circle
//! (`angle_diff`), so a target just across the ±π seam is approached
//! directly rather than through a full turn.

use pursuit_core::angles::{angle_diff, clamp_pitch, normalize};
use pursuit_core::constants::*;
use pursuit_core::error::{ensure_non_negative, ensure_positive, ConfigError};
use pursuit_core::types::AimAngles;

/// Proportional controller with a hard step clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimited {
    kp: f64,
    max_rate: f64,
}

impl RateLimited {
    pub fn new(kp: f64, max_rate: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            kp: ensure_non_negative("kp", kp)?,
            max_rate: ensure_non_negative("max_rate", max_rate)?,
        })
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// `current + clamp(kp * err, ±max_rate * dt)`.
    pub fn update(&self, current: f64, desired: f64, dt: f64) -> f64 {
        if !(dt > 0.0 && dt.is_finite()) {
            return current;
        }
        let err = angle_diff(current, desired);
        if !err.is_finite() {
            return current;
        }
        let max_step = self.max_rate * dt;
        current + (self.kp * err).clamp(-max_step, max_step)
    }
}

impl Default for RateLimited {
    fn default() -> Self {
        Self {
            kp: DEFAULT_KP,
            max_rate: MAX_YAW_RATE,
        }
    }
}

/// Second-order tracking filter.
///
/// Integrates `r_dot = wn² * err - 2 * zeta * wn * r` into an angular rate `r`
/// that is clamped to `±max_rate` and carried across ticks. With `zeta = 1`
/// the response is critically damped: fastest approach without overshoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticallyDamped {
    natural_freq: f64,
    damping_ratio: f64,
    max_rate: f64,
    rate: f64,
}

impl CriticallyDamped {
    pub fn new(natural_freq: f64, damping_ratio: f64, max_rate: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            natural_freq: ensure_positive("natural_freq", natural_freq)?,
            damping_ratio: ensure_non_negative("damping_ratio", damping_ratio)?,
            max_rate: ensure_non_negative("max_rate", max_rate)?,
            rate: 0.0,
        })
    }

    pub fn natural_freq(&self) -> f64 {
        self.natural_freq
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    /// Current angular rate (rad/s).
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Bring the filter to rest.
    pub fn reset(&mut self) {
        self.rate = 0.0;
    }

    pub fn update(&mut self, current: f64, desired: f64, dt: f64) -> f64 {
        if !(dt > 0.0 && dt.is_finite()) {
            return current;
        }
        let err = angle_diff(current, desired);
        if !err.is_finite() {
            return current;
        }
        let wn = self.natural_freq;
        let r_dot = wn * wn * err - 2.0 * self.damping_ratio * wn * self.rate;
        self.rate = (self.rate + r_dot * dt).clamp(-self.max_rate, self.max_rate);
        current + self.rate * dt
    }
}

impl Default for CriticallyDamped {
    fn default() -> Self {
        Self {
            natural_freq: DEFAULT_NATURAL_FREQ,
            damping_ratio: CRITICAL_DAMPING,
            max_rate: MAX_YAW_RATE,
            rate: 0.0,
        }
    }
}

/// Closed set of controller variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleController {
    RateLimited(RateLimited),
    CriticallyDamped(CriticallyDamped),
}

impl AngleController {
    /// Advance one tick. A non-positive or non-finite `dt` returns `current`
    /// and leaves controller state untouched.
    pub fn update(&mut self, current: f64, desired: f64, dt: f64) -> f64 {
        match self {
            AngleController::RateLimited(c) => c.update(current, desired, dt),
            AngleController::CriticallyDamped(c) => c.update(current, desired, dt),
        }
    }

    pub fn reset(&mut self) {
        if let AngleController::CriticallyDamped(c) = self {
            c.reset();
        }
    }

    pub fn max_rate(&self) -> f64 {
        match self {
            AngleController::RateLimited(c) => c.max_rate(),
            AngleController::CriticallyDamped(c) => c.max_rate(),
        }
    }
}

impl From<RateLimited> for AngleController {
    fn from(c: RateLimited) -> Self {
        AngleController::RateLimited(c)
    }
}

impl From<CriticallyDamped> for AngleController {
    fn from(c: CriticallyDamped) -> Self {
        AngleController::CriticallyDamped(c)
    }
}

impl Default for AngleController {
    fn default() -> Self {
        AngleController::RateLimited(RateLimited::default())
    }
}

/// Paired yaw and pitch controllers.
///
/// Keeps the output invariants: both angles normalized after every update,
/// pitch additionally clamped to the pole limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimController {
    pub yaw: AngleController,
    pub pitch: AngleController,
}

impl AimController {
    pub fn new(yaw: impl Into<AngleController>, pitch: impl Into<AngleController>) -> Self {
        Self {
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    pub fn step(&mut self, current: AimAngles, desired: AimAngles, dt: f64) -> AimAngles {
        let yaw = normalize(self.yaw.update(current.yaw, desired.yaw, dt));
        let pitch = clamp_pitch(normalize(self.pitch.update(current.pitch, desired.pitch, dt)));
        AimAngles::new(yaw, pitch)
    }

    pub fn reset(&mut self) {
        self.yaw.reset();
        self.pitch.reset();
    }
}

impl Default for AimController {
    fn default() -> Self {
        Self {
            yaw: RateLimited::default().into(),
            pitch: RateLimited {
                kp: DEFAULT_KP,
                max_rate: MAX_PITCH_RATE,
            }
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::PI;

    #[test]
    fn test_rate_limited_step_never_exceeds_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10_000 {
            let kp = rng.gen_range(0.0..20.0);
            let max_rate = rng.gen_range(0.0..10.0);
            let dt = rng.gen_range(0.0..0.5);
            let current = rng.gen_range(-PI..PI);
            let desired = rng.gen_range(-10.0..10.0);
            let c = RateLimited::new(kp, max_rate).unwrap();
            let next = c.update(current, desired, dt);
            assert!(
                (next - current).abs() <= max_rate * dt + 1e-12,
                "step {} exceeds bound {} (kp={kp}, dt={dt})",
                (next - current).abs(),
                max_rate * dt
            );
        }
    }

    #[test]
    fn test_rate_limited_level_target_stays_put() {
        let c = RateLimited::default();
        assert_eq!(c.update(0.0, 0.0, 0.05), 0.0);
    }

    #[test]
    fn test_rate_limited_crosses_seam_short_way() {
        let c = RateLimited::new(1.0, PI).unwrap();
        let current = 3.0;
        let next = c.update(current, -3.0, 0.05);
        assert!(next > current, "should move up through π, got {next}");
    }

    #[test]
    fn test_critically_damped_converges_without_overshoot() {
        for target in [1.0, 3.0, -2.5] {
            let mut c = CriticallyDamped::default();
            let mut current = 0.0;
            let mut settled_at = None;
            for tick in 1..=60 {
                current = c.update(current, target, 0.05);
                assert!(
                    current.abs() <= f64::abs(target) + 1e-6,
                    "overshoot at tick {tick}: {current} past {target}"
                );
                if settled_at.is_none() && (current - target).abs() < 1e-3 {
                    settled_at = Some(tick);
                }
            }
            assert!(settled_at.is_some(), "target {target} not reached, at {current}");
        }
    }

    #[test]
    fn test_critically_damped_respects_rate_bound() {
        let mut c = CriticallyDamped::new(20.0, 1.0, 1.0).unwrap();
        let mut current = 0.0;
        for _ in 0..20 {
            let next = c.update(current, 3.0, 0.05);
            assert!((next - current).abs() <= 1.0 * 0.05 + 1e-12);
            assert!(c.rate().abs() <= 1.0);
            current = next;
        }
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut c = CriticallyDamped::default();
        c.update(0.0, 1.0, 0.05);
        let rate = c.rate();
        assert_eq!(c.update(0.3, 1.0, 0.0), 0.3);
        assert_eq!(c.update(0.3, 1.0, -0.1), 0.3);
        assert_eq!(c.update(0.3, 1.0, f64::NAN), 0.3);
        assert_eq!(c.rate(), rate);
        assert_eq!(RateLimited::default().update(0.3, 1.0, 0.0), 0.3);
    }

    #[test]
    fn test_reset_clears_rate() {
        let mut c = AngleController::from(CriticallyDamped::default());
        c.update(0.0, 1.0, 0.05);
        c.reset();
        match c {
            AngleController::CriticallyDamped(inner) => assert_eq!(inner.rate(), 0.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(RateLimited::new(-1.0, PI).is_err());
        assert!(RateLimited::new(1.0, f64::NAN).is_err());
        assert!(CriticallyDamped::new(0.0, 1.0, PI).is_err());
        assert!(CriticallyDamped::new(8.0, -0.5, PI).is_err());
        assert!(CriticallyDamped::new(8.0, 1.0, f64::INFINITY).is_err());
        assert_eq!(
            RateLimited::new(1.0, -2.0),
            Err(ConfigError::OutOfRange { field: "max_rate", value: -2.0 })
        );
    }

    #[test]
    fn test_aim_controller_keeps_invariants() {
        let mut ctl = AimController::new(
            RateLimited::new(1.0, 100.0).unwrap(),
            RateLimited::new(1.0, 100.0).unwrap(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut aim = AimAngles::default();
        for _ in 0..1_000 {
            let desired = AimAngles::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            aim = ctl.step(aim, desired, 0.05);
            assert!(aim.yaw > -PI && aim.yaw <= PI);
            assert!(aim.pitch.abs() <= MAX_PITCH_RAD);
        }
    }
}
