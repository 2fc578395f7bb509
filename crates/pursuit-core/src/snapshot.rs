//! Telemetry snapshot: the complete picture of the world as of one feed message.
//!
//! Snapshots are immutable once built. The ingestor shares them as
//! `Arc<TelemetrySnapshot>` and replaces the whole value on every publish.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::enums::EntityKind;
use crate::types::Position;

/// The local player as reported by the capture agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// `None` when the agent has not located the player.
    pub position: Option<Position>,
    /// Reported view yaw (radians), if any.
    pub yaw: Option<f64>,
    /// Reported view pitch (radians), if any.
    pub pitch: Option<f64>,
    pub is_active: bool,
}

impl PlayerState {
    /// Position usable for targeting: the player must be active and located.
    pub fn aim_origin(&self) -> Option<Position> {
        if self.is_active {
            self.position
        } else {
            None
        }
    }
}

/// A nearby entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub game_id: Option<u64>,
    pub name: String,
    pub kind: EntityKind,
    pub position: Position,
    pub is_friendly: bool,
    pub hp: Option<i64>,
    pub max_hp: Option<i64>,
    pub level: Option<u32>,
    pub class_name: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind, position: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            ..Default::default()
        }
    }

    /// hp / max_hp, or `None` when either is missing or max_hp is not positive.
    pub fn health_ratio(&self) -> Option<f64> {
        match (self.hp, self.max_hp) {
            (Some(hp), Some(max)) if max > 0 => Some(hp as f64 / max as f64),
            _ => None,
        }
    }

    /// Non-friendly player or monster.
    pub fn is_hostile(&self) -> bool {
        !self.is_friendly && self.kind.is_hostile_eligible()
    }

    /// Total order on identity, used to break distance ties deterministically.
    /// Entities with a game id sort before those without.
    pub fn cmp_identity(&self, other: &Entity) -> Ordering {
        let id = |e: &Entity| (e.game_id.is_none(), e.game_id.unwrap_or(0));
        id(self)
            .cmp(&id(other))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// One feed message, decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub timestamp: String,
    pub player: PlayerState,
    pub entities: Vec<Entity>,
    /// Opaque agent metadata, passed through untouched.
    pub metadata: serde_json::Value,
}

impl TelemetrySnapshot {
    /// Distance from the player to `entity`, if the player can aim.
    pub fn distance_to(&self, entity: &Entity) -> Option<f64> {
        self.player
            .aim_origin()
            .map(|origin| origin.range_to(&entity.position))
    }
}
