//! Target selection over a telemetry snapshot.
//!
//! Every query yields nothing (never an error) when there is no snapshot, the
//! player is inactive, or the player has not been located. Distances are
//! derived from positions on every call; the feed's own distance is not used.
//! Sorts are stable and break distance ties by entity identity, so the same
//! snapshot always ranks the same way.

use std::cmp::Ordering;

use serde::Serialize;

use pursuit_core::constants::DEFAULT_LOW_HEALTH_THRESHOLD;
use pursuit_core::enums::{EntityKind, PriorityTier, TargetPolicy};
use pursuit_core::snapshot::{Entity, TelemetrySnapshot};
use pursuit_core::types::Position;

/// One ranked aim candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriorityEntry<'a> {
    pub tier: PriorityTier,
    /// Distance from the player at the time of ranking.
    pub distance: f64,
    pub entity: &'a Entity,
}

fn aim_origin(snapshot: Option<&TelemetrySnapshot>) -> Option<(Position, &TelemetrySnapshot)> {
    let snapshot = snapshot?;
    Some((snapshot.player.aim_origin()?, snapshot))
}

fn by_distance_then_identity(a: &(f64, &Entity), b: &(f64, &Entity)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.cmp_identity(b.1))
}

/// Entities matching `keep`, paired with their distance and sorted nearest first.
fn ranked_by_distance<'a>(
    origin: Position,
    snapshot: &'a TelemetrySnapshot,
    keep: impl Fn(&Entity) -> bool,
) -> Vec<(f64, &'a Entity)> {
    let mut out: Vec<(f64, &Entity)> = snapshot
        .entities
        .iter()
        .filter(|&e| keep(e))
        .map(|e| (origin.range_to(&e.position), e))
        .collect();
    out.sort_by(by_distance_then_identity);
    out
}

/// Closest non-friendly player or monster.
pub fn nearest_hostile(snapshot: Option<&TelemetrySnapshot>) -> Option<&Entity> {
    let (origin, snapshot) = aim_origin(snapshot)?;
    snapshot
        .entities
        .iter()
        .filter(|e| e.is_hostile())
        .map(|e| (origin.range_squared_to(&e.position), e))
        .min_by(by_distance_then_identity)
        .map(|(_, e)| e)
}

/// All entities of `kind`, in snapshot order.
pub fn entities_of_type<'a>(
    snapshot: Option<&'a TelemetrySnapshot>,
    kind: &EntityKind,
) -> Vec<&'a Entity> {
    let Some((_, snapshot)) = aim_origin(snapshot) else {
        return Vec::new();
    };
    snapshot.entities.iter().filter(|e| &e.kind == kind).collect()
}

/// Non-friendly entities with known health at or below `threshold`, nearest first.
pub fn low_health_hostiles(snapshot: Option<&TelemetrySnapshot>, threshold: f64) -> Vec<&Entity> {
    let Some((origin, snapshot)) = aim_origin(snapshot) else {
        return Vec::new();
    };
    ranked_by_distance(origin, snapshot, |e| is_low_health(e, threshold))
        .into_iter()
        .map(|(_, e)| e)
        .collect()
}

fn is_low_health(e: &Entity, threshold: f64) -> bool {
    !e.is_friendly && e.health_ratio().is_some_and(|r| r <= threshold)
}

/// Ranked aim list: low-health hostiles, then hostile players, then hostile
/// monsters, each tier nearest first.
///
/// An entity may appear in more than one tier; the list is not deduplicated.
pub fn priority_list(snapshot: Option<&TelemetrySnapshot>) -> Vec<PriorityEntry<'_>> {
    let Some((origin, snapshot)) = aim_origin(snapshot) else {
        return Vec::new();
    };
    let tiers: [(PriorityTier, fn(&Entity) -> bool); 3] = [
        (PriorityTier::LowHealth, |e: &Entity| {
            is_low_health(e, DEFAULT_LOW_HEALTH_THRESHOLD)
        }),
        (PriorityTier::HostilePlayer, |e: &Entity| {
            !e.is_friendly && e.kind == EntityKind::Player
        }),
        (PriorityTier::Monster, |e: &Entity| {
            !e.is_friendly && e.kind == EntityKind::Monster
        }),
    ];

    tiers
        .iter()
        .flat_map(|(tier, keep)| {
            ranked_by_distance(origin, snapshot, *keep)
                .into_iter()
                .map(move |(distance, entity)| PriorityEntry {
                    tier: *tier,
                    distance,
                    entity,
                })
        })
        .collect()
}

/// The single entity to aim at under `policy`.
pub fn select_target(snapshot: Option<&TelemetrySnapshot>, policy: TargetPolicy) -> Option<&Entity> {
    match policy {
        TargetPolicy::NearestHostile => nearest_hostile(snapshot),
        TargetPolicy::Priority => priority_list(snapshot).first().map(|p| p.entity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pursuit_core::snapshot::PlayerState;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn player_at(p: Position) -> PlayerState {
        PlayerState {
            position: Some(p),
            is_active: true,
            ..Default::default()
        }
    }

    fn entity(name: &str, kind: EntityKind, x: f64, hp: Option<(i64, i64)>) -> Entity {
        let mut e = Entity::new(name, kind, Position::new(x, 0.0, 0.0));
        if let Some((hp, max)) = hp {
            e.hp = Some(hp);
            e.max_hp = Some(max);
        }
        e
    }

    fn snapshot(entities: Vec<Entity>) -> TelemetrySnapshot {
        TelemetrySnapshot {
            player: player_at(Position::ORIGIN),
            entities,
            ..Default::default()
        }
    }

    fn abc() -> TelemetrySnapshot {
        snapshot(vec![
            entity("A", EntityKind::Monster, 8.0, Some((10, 100))),
            entity("B", EntityKind::Monster, 3.0, Some((90, 100))),
            entity("C", EntityKind::Player, 5.0, Some((50, 100))),
        ])
    }

    #[test]
    fn test_priority_list_tiers() {
        let snap = abc();
        let list = priority_list(Some(&snap));
        let ranked: Vec<_> = list.iter().map(|p| (p.tier, p.entity.name.as_str())).collect();
        assert_eq!(
            ranked,
            vec![
                (PriorityTier::LowHealth, "A"),
                (PriorityTier::HostilePlayer, "C"),
                (PriorityTier::Monster, "B"),
                (PriorityTier::Monster, "A"),
            ]
        );
        assert_eq!(list[0].distance, 8.0);
        assert_eq!(select_target(Some(&snap), TargetPolicy::Priority).unwrap().name, "A");
        assert_eq!(select_target(Some(&snap), TargetPolicy::NearestHostile).unwrap().name, "B");
    }

    #[test]
    fn test_tiers_are_sorted_by_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let entities = (0..40)
            .map(|i| {
                let kind = if rng.gen_bool(0.5) { EntityKind::Player } else { EntityKind::Monster };
                let mut e = entity(&format!("e{i}"), kind, rng.gen_range(-50.0..50.0), Some((rng.gen_range(0..=100), 100)));
                e.is_friendly = rng.gen_bool(0.2);
                e
            })
            .collect();
        let snap = snapshot(entities);
        let list = priority_list(Some(&snap));
        for pair in list.windows(2) {
            assert!(pair[0].tier <= pair[1].tier, "tiers out of order");
            if pair[0].tier == pair[1].tier {
                assert!(pair[0].distance <= pair[1].distance, "tier {:?} not sorted", pair[0].tier);
            }
        }
        assert!(list.iter().all(|p| !p.entity.is_friendly));
    }

    #[test]
    fn test_nearest_hostile_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(0..12);
            let entities: Vec<Entity> = (0..n)
                .map(|i| {
                    let kind = match rng.gen_range(0..3) {
                        0 => EntityKind::Player,
                        1 => EntityKind::Monster,
                        _ => EntityKind::Npc,
                    };
                    let mut e = Entity::new(
                        format!("e{i}"),
                        kind,
                        Position::new(rng.gen_range(-20.0..20.0), rng.gen_range(-5.0..5.0), rng.gen_range(-20.0..20.0)),
                    );
                    e.is_friendly = rng.gen_bool(0.3);
                    e
                })
                .collect();
            let snap = snapshot(entities);
            let brute = snap
                .entities
                .iter()
                .filter(|e| e.is_hostile())
                .map(|e| Position::ORIGIN.range_to(&e.position))
                .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))));
            let found = nearest_hostile(Some(&snap)).map(|e| Position::ORIGIN.range_to(&e.position));
            assert_eq!(found, brute);
        }
    }

    #[test]
    fn test_distance_ties_break_by_identity() {
        let mut a = entity("zeta", EntityKind::Monster, 5.0, None);
        let mut b = entity("alpha", EntityKind::Monster, -5.0, None);
        a.game_id = Some(1);
        b.game_id = Some(2);
        let snap = snapshot(vec![b.clone(), a.clone()]);
        assert_eq!(nearest_hostile(Some(&snap)).unwrap().name, "zeta");
        let snap = snapshot(vec![a, b]);
        assert_eq!(nearest_hostile(Some(&snap)).unwrap().name, "zeta");
    }

    #[test]
    fn test_inactive_or_unlocated_player_yields_nothing() {
        let mut snap = abc();
        snap.player.is_active = false;
        assert!(nearest_hostile(Some(&snap)).is_none());
        assert!(priority_list(Some(&snap)).is_empty());
        assert!(low_health_hostiles(Some(&snap), 1.0).is_empty());
        assert!(entities_of_type(Some(&snap), &EntityKind::Monster).is_empty());

        let mut snap = abc();
        snap.player.position = None;
        assert!(nearest_hostile(Some(&snap)).is_none());
        assert!(priority_list(Some(&snap)).is_empty());

        assert!(nearest_hostile(None).is_none());
        assert!(priority_list(None).is_empty());
        assert!(select_target(None, TargetPolicy::Priority).is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = snapshot(Vec::new());
        assert!(nearest_hostile(Some(&snap)).is_none());
        assert!(priority_list(Some(&snap)).is_empty());
    }

    #[test]
    fn test_friendlies_and_npcs_are_never_hostile() {
        let mut friend = entity("friend", EntityKind::Player, 1.0, Some((1, 100)));
        friend.is_friendly = true;
        let npc = entity("npc", EntityKind::Npc, 2.0, None);
        let snap = snapshot(vec![friend, npc]);
        assert!(nearest_hostile(Some(&snap)).is_none());
        assert!(priority_list(Some(&snap)).is_empty());
    }

    #[test]
    fn test_entities_of_type_keeps_snapshot_order() {
        let snap = snapshot(vec![
            entity("m1", EntityKind::Monster, 9.0, None),
            entity("p1", EntityKind::Player, 1.0, None),
            entity("m2", EntityKind::Monster, 2.0, None),
        ]);
        let names: Vec<_> = entities_of_type(Some(&snap), &EntityKind::Monster)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["m1", "m2"]);
    }

    #[test]
    fn test_low_health_hostiles_threshold_and_unknown_health() {
        let snap = snapshot(vec![
            entity("half", EntityKind::Monster, 4.0, Some((50, 100))),
            entity("low", EntityKind::Monster, 6.0, Some((20, 100))),
            entity("unknown", EntityKind::Monster, 1.0, None),
            entity("zero_max", EntityKind::Monster, 1.0, Some((0, 0))),
            entity("npc_low", EntityKind::Npc, 2.0, Some((1, 100))),
        ]);
        let names: Vec<_> = low_health_hostiles(Some(&snap), 0.5)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        // health filtering admits any non-friendly kind
        assert_eq!(names, vec!["npc_low", "half", "low"]);
    }
}
