//! Pursuit engine: the per-tick pipeline.
//!
//! `PursuitEngine` takes whatever snapshot is current, picks a target, solves
//! for the desired view angles and advances the controllers one tick toward
//! them. It owns no threads and does no I/O, so runs are reproducible in tests.

use serde::Serialize;
use tracing::debug;

use pursuit_core::constants::{DT, UNITS_PER_METER};
use pursuit_core::enums::{EntityKind, PresetId, TargetPolicy};
use pursuit_core::error::ConfigError;
use pursuit_core::snapshot::TelemetrySnapshot;
use pursuit_core::types::AimAngles;

use crate::aim::desired_angles;
use crate::controller::AimController;
use crate::presets::Preset;
use crate::targeting::select_target;

/// Configuration for a pursuit engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub policy: TargetPolicy,
    pub controller: AimController,
    /// Starting view angles.
    pub initial_aim: AimAngles,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: TargetPolicy::default(),
            controller: AimController::default(),
            initial_aim: AimAngles::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_preset(preset: &Preset, policy: TargetPolicy) -> Self {
        Self {
            policy,
            controller: preset.controller,
            initial_aim: AimAngles::default(),
        }
    }
}

/// Identity of the entity being aimed at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRef {
    pub game_id: Option<u64>,
    pub name: String,
    pub kind: EntityKind,
    /// Distance from the player in feed units.
    pub distance: f64,
}

impl TargetRef {
    pub fn same_entity(&self, other: &TargetRef) -> bool {
        self.game_id == other.game_id && self.name == other.name
    }
}

/// Output of one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AimCommand {
    pub tick: u64,
    pub yaw: f64,
    pub pitch: f64,
    pub target: Option<TargetRef>,
    /// Angles the controllers are steering toward, when there is a target.
    pub desired: Option<AimAngles>,
}

impl AimCommand {
    pub fn angles(&self) -> AimAngles {
        AimAngles::new(self.yaw, self.pitch)
    }
}

/// The pursuit engine. Owns controller state and the current aim.
pub struct PursuitEngine {
    policy: TargetPolicy,
    controller: AimController,
    aim: AimAngles,
    tick: u64,
    target: Option<TargetRef>,
}

impl PursuitEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            policy: config.policy,
            controller: config.controller,
            aim: config.initial_aim.sanitized(),
            tick: 0,
            target: None,
        }
    }

    /// Engine configured from a named preset.
    pub fn from_preset(preset: &Preset, policy: TargetPolicy) -> Self {
        Self::new(EngineConfig::from_preset(preset, policy))
    }

    pub fn policy(&self) -> TargetPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: TargetPolicy) {
        self.policy = policy;
    }

    /// Current view angles.
    pub fn aim(&self) -> AimAngles {
        self.aim
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Bring both controllers to rest. Angles are kept.
    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Advance one tick of `dt` seconds against `snapshot`.
    pub fn tick(&mut self, snapshot: Option<&TelemetrySnapshot>, dt: f64) -> AimCommand {
        self.tick += 1;

        if let Some(snap) = snapshot {
            let reported = AimAngles::new(
                snap.player.yaw.unwrap_or(self.aim.yaw),
                snap.player.pitch.unwrap_or(self.aim.pitch),
            );
            if reported.yaw.is_finite() && reported.pitch.is_finite() {
                self.aim = reported.sanitized();
            }
        }

        let player = snapshot.and_then(|s| s.player.aim_origin());
        let solved = select_target(snapshot, self.policy).and_then(|entity| {
            let desired = desired_angles(player, entity.position, self.aim)?;
            let distance = player.map_or(0.0, |p| p.range_to(&entity.position));
            Some((entity, desired, distance))
        });

        let (target, desired) = match solved {
            Some((entity, desired, distance)) => {
                self.aim = self.controller.step(self.aim, desired, dt);
                let target = TargetRef {
                    game_id: entity.game_id,
                    name: entity.name.clone(),
                    kind: entity.kind.clone(),
                    distance,
                };
                (Some(target), Some(desired))
            }
            None => (None, None),
        };

        self.note_target_change(target.as_ref());
        self.target = target.clone();

        AimCommand {
            tick: self.tick,
            yaw: self.aim.yaw,
            pitch: self.aim.pitch,
            target,
            desired,
        }
    }

    /// One tick at the nominal interval.
    pub fn step(&mut self, snapshot: Option<&TelemetrySnapshot>) -> AimCommand {
        self.tick(snapshot, DT)
    }

    fn note_target_change(&self, next: Option<&TargetRef>) {
        match (&self.target, next) {
            (None, Some(t)) => debug!(
                tick = self.tick,
                target = %t.name,
                kind = %t.kind,
                range_m = t.distance / UNITS_PER_METER,
                "target acquired"
            ),
            (Some(prev), Some(t)) if !prev.same_entity(t) => debug!(
                tick = self.tick,
                from = %prev.name,
                to = %t.name,
                range_m = t.distance / UNITS_PER_METER,
                "target switched"
            ),
            (Some(prev), None) => debug!(tick = self.tick, target = %prev.name, "target lost"),
            _ => {}
        }
    }
}

impl Default for PursuitEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Engine for a named preset with the given policy.
pub fn engine_for(id: PresetId, policy: TargetPolicy) -> Result<PursuitEngine, ConfigError> {
    Ok(PursuitEngine::from_preset(&Preset::build(id)?, policy))
}
