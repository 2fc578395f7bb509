//! Enumeration types used throughout the controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Entity classification reported by the capture agent.
///
/// The feed's set of types is open; anything unrecognized is kept verbatim
/// in `Other` so it round-trips and can still be filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Player,
    Monster,
    Npc,
    Other(String),
}

impl EntityKind {
    /// Kinds that may be selected as a hostile target.
    pub fn is_hostile_eligible(&self) -> bool {
        matches!(self, EntityKind::Player | EntityKind::Monster)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::Monster => "Monster",
            EntityKind::Npc => "NPC",
            EntityKind::Other(raw) => raw,
        }
    }
}

impl Default for EntityKind {
    fn default() -> Self {
        EntityKind::Other("Unknown".into())
    }
}

impl From<String> for EntityKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Player" => EntityKind::Player,
            "Monster" => EntityKind::Monster,
            "NPC" | "Npc" => EntityKind::Npc,
            _ => EntityKind::Other(raw),
        }
    }
}

impl From<&str> for EntityKind {
    fn from(raw: &str) -> Self {
        EntityKind::from(raw.to_string())
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Other(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule picks the single entity to aim at each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Closest non-friendly player or monster.
    #[default]
    NearestHostile,
    /// Head of the tiered priority list.
    Priority,
}

impl FromStr for TargetPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearest_hostile" => Ok(TargetPolicy::NearestHostile),
            "priority" => Ok(TargetPolicy::Priority),
            _ => Err(ConfigError::UnknownValue {
                field: "target_policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Tier a ranked entity was admitted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    /// Known health at or below the low-health threshold.
    LowHealth,
    /// Non-friendly player.
    HostilePlayer,
    /// Non-friendly monster.
    Monster,
}

/// Scripted scenario/controller pairings for offline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetId {
    /// Orbiting target, proportional rate-limited controllers.
    #[default]
    CircleP,
    /// Looping keyframed path, critically-damped controllers.
    KeyframeSmooth,
    /// Climbing helix, critically-damped controllers.
    HelixSmooth,
}

impl FromStr for PresetId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle_p" => Ok(PresetId::CircleP),
            "keyframe_smooth" => Ok(PresetId::KeyframeSmooth),
            "helix_smooth" => Ok(PresetId::HelixSmooth),
            _ => Err(ConfigError::UnknownValue {
                field: "preset",
                value: s.to_string(),
            }),
        }
    }
}

/// Where snapshots come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMode {
    /// Synthesized from a scenario; no network.
    #[default]
    Offline,
    /// Capture agent push feed.
    Live,
}

impl FromStr for FeedMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(FeedMode::Offline),
            "live" => Ok(FeedMode::Live),
            _ => Err(ConfigError::UnknownValue {
                field: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Wire transport of the live feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedTransport {
    /// ZeroMQ SUB socket, one JSON message per frame.
    #[default]
    Zmq,
    /// Raw TCP stream, one JSON message per line.
    Tcp,
}

impl FromStr for FeedTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zmq" | "zeromq" => Ok(FeedTransport::Zmq),
            "tcp" | "ndjson" => Ok(FeedTransport::Tcp),
            _ => Err(ConfigError::UnknownValue {
                field: "transport",
                value: s.to_string(),
            }),
        }
    }
}
