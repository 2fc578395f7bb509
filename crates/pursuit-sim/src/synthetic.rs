//! Offline snapshot source driven by a scenario.

use std::sync::Arc;

use serde_json::json;

use pursuit_core::enums::EntityKind;
use pursuit_core::snapshot::{Entity, PlayerState, TelemetrySnapshot};
use pursuit_core::types::Position;

use crate::scenario::Scenario;

/// Synthesizes snapshots with an active player at the origin and one hostile
/// monster named `enemy` following the scenario.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    scenario: Scenario,
    elapsed: f64,
}

impl SyntheticFeed {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            elapsed: 0.0,
        }
    }

    /// Seconds of scenario time consumed so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Move scenario time forward by `dt` and return the new snapshot.
    /// A non-positive or non-finite `dt` leaves time where it is.
    pub fn advance(&mut self, dt: f64) -> Arc<TelemetrySnapshot> {
        if dt > 0.0 && dt.is_finite() {
            self.elapsed += dt;
        }
        Arc::new(self.snapshot_at(self.elapsed))
    }

    /// Snapshot for scenario time `t`. Pure.
    pub fn snapshot_at(&self, t: f64) -> TelemetrySnapshot {
        let enemy = Entity {
            game_id: Some(1),
            is_friendly: false,
            ..Entity::new("enemy", EntityKind::Monster, self.scenario.position_at(t))
        };
        TelemetrySnapshot {
            timestamp: format!("{t:.3}"),
            player: PlayerState {
                position: Some(Position::ORIGIN),
                yaw: None,
                pitch: None,
                is_active: true,
            },
            entities: vec![enemy],
            metadata: json!({
                "source": "synthetic",
                "scenario": self.scenario.name(),
            }),
        }
    }
}
