//! Aim solver: yaw/pitch that point from the player at a target.

use pursuit_core::angles::horizontal_distance;
use pursuit_core::types::{AimAngles, Position};

/// Desired view angles from `player` to `target`.
///
/// Returns `None` only when the player position is unknown. A target sitting
/// exactly on the player has no defined direction, so `previous` is kept.
pub fn desired_angles(
    player: Option<Position>,
    target: Position,
    previous: AimAngles,
) -> Option<AimAngles> {
    let player = player?;
    let d = player.offset_to(&target);
    if d.x == 0.0 && d.y == 0.0 && d.z == 0.0 {
        return Some(previous);
    }
    let yaw = d.z.atan2(d.x);
    let pitch = d.y.atan2(horizontal_distance(d.x, d.z));
    Some(AimAngles::new(yaw, pitch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pursuit_core::angles::forward_vector;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_level_target_on_x_axis() {
        let a = desired_angles(Some(Position::ORIGIN), Position::new(10.0, 0.0, 0.0), AimAngles::default()).unwrap();
        assert_eq!(a, AimAngles::new(0.0, 0.0));
    }

    #[test]
    fn test_target_on_z_axis_is_quarter_turn() {
        let a = desired_angles(Some(Position::ORIGIN), Position::new(0.0, 0.0, 5.0), AimAngles::default()).unwrap();
        assert!((a.yaw - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(a.pitch, 0.0);
    }

    #[test]
    fn test_elevated_target_pitch() {
        let a = desired_angles(
            Some(Position::new(1.0, 1.0, 1.0)),
            Position::new(4.0, 6.0, 5.0),
            AimAngles::default(),
        )
        .unwrap();
        // horizontal offset (3, 4) has length 5, vertical offset 5
        assert!((a.pitch - FRAC_PI_4).abs() < 1e-12, "pitch {}", a.pitch);
        assert!((a.yaw - 4f64.atan2(3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_directly_overhead() {
        let a = desired_angles(Some(Position::ORIGIN), Position::new(0.0, 3.0, 0.0), AimAngles::default()).unwrap();
        assert!((a.pitch - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_player_yields_none() {
        assert!(desired_angles(None, Position::new(1.0, 0.0, 0.0), AimAngles::default()).is_none());
    }

    #[test]
    fn test_coincident_target_keeps_previous() {
        let prev = AimAngles::new(0.7, -0.2);
        let p = Position::new(3.0, 4.0, 5.0);
        assert_eq!(desired_angles(Some(p), p, prev), Some(prev));
    }

    #[test]
    fn test_forward_vector_inverts_solver() {
        let player = Position::new(-2.0, 1.0, 3.0);
        let target = Position::new(5.0, -4.0, -7.0);
        let a = desired_angles(Some(player), target, AimAngles::default()).unwrap();
        let dir = player.offset_to(&target).normalize();
        assert!((forward_vector(a.yaw, a.pitch) - dir).length() < 1e-12);
    }
}
