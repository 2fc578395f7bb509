//! Named scenario and controller pairings for offline runs.

use pursuit_core::constants::{CRITICAL_DAMPING, DEFAULT_KP, MAX_PITCH_RATE, MAX_YAW_RATE};
use pursuit_core::enums::PresetId;
use pursuit_core::error::ConfigError;
use pursuit_core::types::Position;

use crate::controller::{AimController, CriticallyDamped, RateLimited};
use crate::scenario::{Helix, Keyframed, Orbit, Scenario, Waypoint};

/// A scenario together with the controllers tuned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub id: PresetId,
    pub scenario: Scenario,
    pub controller: AimController,
}

impl Preset {
    pub fn build(id: PresetId) -> Result<Self, ConfigError> {
        let (scenario, controller): (Scenario, AimController) = match id {
            PresetId::CircleP => (
                Orbit::new(12.0, 0.5)?.into(),
                AimController::new(
                    RateLimited::new(DEFAULT_KP, MAX_YAW_RATE)?,
                    RateLimited::new(DEFAULT_KP, MAX_PITCH_RATE)?,
                ),
            ),
            PresetId::KeyframeSmooth => (
                Keyframed::new(
                    vec![
                        Waypoint::new(0.0, Position::new(8.0, 0.0, -6.0)),
                        Waypoint::new(2.0, Position::new(6.0, 0.0, 6.0)),
                        Waypoint::new(5.0, Position::new(-10.0, 0.0, 0.0)),
                        Waypoint::new(8.0, Position::new(8.0, 0.0, -6.0)),
                    ],
                    true,
                )?
                .into(),
                AimController::new(
                    CriticallyDamped::new(9.0, CRITICAL_DAMPING, MAX_YAW_RATE)?,
                    CriticallyDamped::new(6.0, CRITICAL_DAMPING, MAX_PITCH_RATE)?,
                ),
            ),
            PresetId::HelixSmooth => (
                Helix::new(8.0, 0.6, 1.0)?.into(),
                AimController::new(
                    CriticallyDamped::new(9.0, CRITICAL_DAMPING, MAX_YAW_RATE)?,
                    CriticallyDamped::new(7.0, CRITICAL_DAMPING, MAX_PITCH_RATE)?,
                ),
            ),
        };
        Ok(Self {
            id,
            scenario,
            controller,
        })
    }
}
