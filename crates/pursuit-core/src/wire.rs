//! JSON wire format of the capture agent feed.
//!
//! The agent is loose about which fields it sends. Missing fields fall back to
//! defaults instead of failing the whole message; only invalid JSON, or JSON of
//! the wrong shape, is rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::enums::EntityKind;
use crate::error::WireError;
use crate::snapshot::{Entity, PlayerState, TelemetrySnapshot};
use crate::types::Position;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePosition {
    x: f64,
    y: f64,
    z: f64,
}

impl From<WirePosition> for Position {
    fn from(p: WirePosition) -> Self {
        Position::new(p.x, p.y, p.z)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WirePlayer {
    position: Option<WirePosition>,
    yaw: Option<f64>,
    rotation: Option<f64>,
    direction: Option<f64>,
    pitch: Option<f64>,
    is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireEntity {
    /// Numeric, or a numeric string; anything else is treated as absent.
    game_id: Option<Value>,
    name: String,
    #[serde(rename = "type")]
    kind: EntityKind,
    position: WirePosition,
    is_friendly: bool,
    /// Vitals are numbers, numeric strings, or junk; junk reads as unknown.
    hp: Option<Value>,
    max_hp: Option<Value>,
    level: Option<Value>,
    #[serde(rename = "class")]
    class_name: Option<String>,
}

impl Default for WireEntity {
    fn default() -> Self {
        Self {
            game_id: None,
            name: "Unknown".into(),
            kind: EntityKind::default(),
            position: WirePosition::default(),
            is_friendly: false,
            hp: None,
            max_hp: None,
            level: None,
            class_name: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireSnapshot {
    timestamp: String,
    player: WirePlayer,
    entities: Vec<WireEntity>,
    metadata: serde_json::Value,
}

impl From<WirePlayer> for PlayerState {
    fn from(p: WirePlayer) -> Self {
        Self {
            position: p.position.map(Position::from),
            yaw: p.yaw.or(p.rotation).or(p.direction),
            pitch: p.pitch,
            is_active: p.is_active,
        }
    }
}

impl From<WireEntity> for Entity {
    fn from(e: WireEntity) -> Self {
        Self {
            game_id: e.game_id.as_ref().and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            }),
            name: e.name,
            kind: e.kind,
            position: e.position.into(),
            is_friendly: e.is_friendly,
            hp: lenient_int(e.hp.as_ref()),
            max_hp: lenient_int(e.max_hp.as_ref()),
            level: lenient_int(e.level.as_ref()).and_then(|l| u32::try_from(l).ok()),
            class_name: e.class_name,
        }
    }
}

/// Whole number from a JSON number or numeric string. Fractions round to nearest.
fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(round_to_int)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse().ok().and_then(round_to_int))
        }
        _ => None,
    }
}

fn round_to_int(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < i64::MAX as f64).then(|| f.round() as i64)
}

/// Decode one feed message.
pub fn parse_snapshot(raw: &str) -> Result<TelemetrySnapshot, WireError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WireError::Empty);
    }
    let wire: WireSnapshot = serde_json::from_str(raw)?;
    Ok(TelemetrySnapshot {
        timestamp: wire.timestamp,
        player: wire.player.into(),
        entities: wire.entities.into_iter().map(Entity::from).collect(),
        metadata: wire.metadata,
    })
}
