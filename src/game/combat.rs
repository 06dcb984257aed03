//! Combat system - shooting, contact damage and enemy pursuit

use super::map::{GridMap, Tile};
use super::physics::angle_between;
use super::raycast::cast_ray_until;
use super::state::{Enemy, Player, ENEMY_SLOTS};

/// Combat tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatStats {
    /// Player health at the start of a game
    pub player_health: u16,
    /// Health of a freshly spawned enemy
    pub enemy_health: u16,
    /// Damage per shot
    pub shot_damage: u16,
    /// Maximum shot distance in tiles
    pub shot_range: f32,
    /// Largest aim error (radians) that still hits
    pub shot_tolerance: f32,
    /// Enemies this close strike the player
    pub contact_range: f32,
    /// Damage per enemy strike
    pub contact_damage: u16,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            player_health: 100,
            enemy_health: 30,
            shot_damage: 15,
            shot_range: 8.0,
            shot_tolerance: 0.15,
            contact_range: 1.0,
            contact_damage: 10,
        }
    }
}

/// What a shot did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    Miss,
    Hit { slot: usize, remaining: u16 },
    Eliminated { slot: usize },
}

/// Combat system for shots, strikes and enemy movement
pub struct CombatSystem;

impl CombatSystem {
    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_health: u16, damage: u16) -> (u16, bool) {
        let new_health = current_health.saturating_sub(damage);
        (new_health, new_health == 0)
    }

    /// Nearest active enemy within range and aim tolerance that has no
    /// wall between it and the player
    pub fn find_target(map: &GridMap, player: &Player, enemies: &[Enemy], stats: &CombatStats) -> Option<usize> {
        enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.active)
            .filter_map(|(slot, enemy)| {
                let distance = enemy.distance_to(player.x, player.y);
                if distance > stats.shot_range {
                    return None;
                }

                let bearing = (enemy.y - player.y).atan2(enemy.x - player.x);
                if angle_between(player.angle, bearing).abs() > stats.shot_tolerance {
                    return None;
                }

                // Only walls block a shot; exits are open ground
                if cast_ray_until(map, player.x, player.y, bearing, distance, |tile| tile == Tile::Wall).is_some() {
                    return None;
                }

                Some((slot, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(slot, _)| slot)
    }

    /// Fire one shot along the player's facing
    pub fn resolve_shot(
        map: &GridMap,
        player: &Player,
        mut enemies: [Enemy; ENEMY_SLOTS],
        stats: &CombatStats,
    ) -> ([Enemy; ENEMY_SLOTS], ShotOutcome) {
        let Some(slot) = Self::find_target(map, player, &enemies, stats) else {
            return (enemies, ShotOutcome::Miss);
        };

        let target = &mut enemies[slot];
        let (new_health, killed) = Self::apply_damage(target.health, stats.shot_damage);
        target.health = new_health;

        let outcome = if killed {
            target.active = false;
            ShotOutcome::Eliminated { slot }
        } else {
            ShotOutcome::Hit {
                slot,
                remaining: new_health,
            }
        };

        (enemies, outcome)
    }

    /// Whether an enemy is close enough to strike
    pub fn in_contact(enemy: &Enemy, x: f32, y: f32, stats: &CombatStats) -> bool {
        enemy.active && enemy.distance_to(x, y) <= stats.contact_range
    }

    /// Step one tile towards the target along the dominant axis, falling
    /// back to the other axis when blocked. An axis is only used while at
    /// least a full tile of distance remains on it, so the step never
    /// overshoots the target. Enemies stay on floor tiles and never enter
    /// the exit.
    pub fn step_toward(
        map: &GridMap,
        enemy: Enemy,
        target_x: f32,
        target_y: f32,
        occupied: impl Fn(f32, f32) -> bool,
    ) -> Enemy {
        let dx = target_x - enemy.x;
        let dy = target_y - enemy.y;

        let along_x = (dx.abs() >= 1.0).then(|| (dx.signum(), 0.0));
        let along_y = (dy.abs() >= 1.0).then(|| (0.0, dy.signum()));

        let (primary, secondary) = if dx.abs() >= dy.abs() {
            (along_x, along_y)
        } else {
            (along_y, along_x)
        };

        for (sx, sy) in [primary, secondary].into_iter().flatten() {
            let x = enemy.x + sx;
            let y = enemy.y + sy;
            if map.tile_at(x, y) == Tile::Floor && !occupied(x, y) {
                return Enemy { x, y, ..enemy };
            }
        }

        enemy
    }
}
