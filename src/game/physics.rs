//! Player movement and wall collision

use std::f32::consts::{FRAC_PI_8, TAU};

use super::map::GridMap;

/// Movement tuning for the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementStats {
    /// Distance covered by one forward step, in tiles
    pub step: f32,
    /// Fraction of `step` used when backing up
    pub reverse_factor: f32,
    /// Rotation per turn action in radians
    pub turn_step: f32,
}

impl Default for MovementStats {
    fn default() -> Self {
        Self {
            step: 0.5,
            reverse_factor: 0.5,
            turn_step: FRAC_PI_8,
        }
    }
}

/// Wrap an angle into `[0, 2π)`
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Signed difference `to - from`, wrapped into `[-π, π]`
pub fn angle_between(from: f32, to: f32) -> f32 {
    let diff = normalize_angle(to - from);
    if diff > std::f32::consts::PI {
        diff - TAU
    } else {
        diff
    }
}

/// Physics system for turning and sliding along walls
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Rotate by one turn step. Negative `steer` turns left, positive right.
    pub fn turn(angle: f32, steer: f32, stats: &MovementStats) -> f32 {
        normalize_angle(angle + steer.signum() * stats.turn_step)
    }

    /// Move along the facing direction, resolving collisions per axis.
    /// Positive throttle walks forward, negative backs up at reduced speed.
    pub fn advance(
        map: &GridMap,
        x: f32,
        y: f32,
        angle: f32,
        throttle: f32,
        stats: &MovementStats,
    ) -> (f32, f32) {
        let distance = if throttle >= 0.0 {
            stats.step
        } else {
            -stats.step * stats.reverse_factor
        };

        let dx = angle.cos() * distance;
        let dy = angle.sin() * distance;

        Self::slide(map, x, y, dx, dy)
    }

    /// Apply a displacement one axis at a time so diagonal contact with a
    /// wall still lets the mover slide along it.
    pub fn slide(map: &GridMap, x: f32, y: f32, dx: f32, dy: f32) -> (f32, f32) {
        let mut new_x = x;
        let mut new_y = y;

        if !map.is_blocked(x + dx, new_y) {
            new_x = x + dx;
        }
        if !map.is_blocked(new_x, y + dy) {
            new_y = y + dy;
        }

        (new_x, new_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn corridor() -> GridMap {
        GridMap::parse(&[
            "#######", //
            "#P....#", //
            "#.....#", //
            "#....E#", //
            "#######",
        ])
        .unwrap()
    }

    #[test]
    fn turning_wraps_into_range() {
        let stats = MovementStats::default();
        let left = PhysicsSystem::turn(0.0, -1.0, &stats);
        assert!((left - (TAU - FRAC_PI_8)).abs() < 1e-5);
        let right = PhysicsSystem::turn(TAU - FRAC_PI_8 / 2.0, 1.0, &stats);
        assert!((0.0..TAU).contains(&right));
        assert!((right - FRAC_PI_8 / 2.0).abs() < 1e-4);
        assert_eq!(normalize_angle(-1e-9), 0.0);
    }

    #[test]
    fn angle_between_takes_the_short_way() {
        assert!((angle_between(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((angle_between(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
        assert!((angle_between(0.0, PI).abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn forward_and_reverse_distances() {
        let map = corridor();
        let stats = MovementStats::default();
        let (x, y) = PhysicsSystem::advance(&map, 2.5, 2.5, 0.0, 1.0, &stats);
        assert!((x - 3.0).abs() < 1e-5 && (y - 2.5).abs() < 1e-5);
        let (x, y) = PhysicsSystem::advance(&map, 2.5, 2.5, 0.0, -1.0, &stats);
        assert!((x - 2.25).abs() < 1e-5 && (y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn blocked_axis_slides_along_the_wall() {
        let map = corridor();
        // Moving diagonally into the north wall keeps the x component
        let (x, y) = PhysicsSystem::slide(&map, 2.5, 1.2, 0.4, -0.4);
        assert!((x - 2.9).abs() < 1e-5);
        assert!((y - 1.2).abs() < 1e-5);
    }

    #[test]
    fn head_on_wall_contact_stops() {
        let map = corridor();
        let (x, y) = PhysicsSystem::advance(&map, 1.5, 1.2, 3.0 * FRAC_PI_2, 1.0, &MovementStats::default());
        assert!((x - 1.5).abs() < 1e-5);
        assert_eq!(y, 1.2);
    }

    proptest! {
        #[test]
        fn slide_never_enters_a_wall(
            x in 1.0f32..6.0,
            y in 1.0f32..4.0,
            dx in -1.5f32..1.5,
            dy in -1.5f32..1.5,
        ) {
            let map = corridor();
            prop_assume!(!map.is_blocked(x, y));
            let (nx, ny) = PhysicsSystem::slide(&map, x, y, dx, dy);
            prop_assert!(!map.is_blocked(nx, ny));
        }
    }
}
