//! Game state aggregate carried inside the session token

use serde::{Deserialize, Serialize};

/// Number of enemy slots in every game. The token grammar depends on it.
pub const ENEMY_SLOTS: usize = 3;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Game in progress
    Active,
    /// Player reached the exit or cleared the dungeon
    Won,
    /// Player health ran out
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::Active)
    }

    /// Single-character wire code
    pub fn code(self) -> char {
        match self {
            Phase::Active => '0',
            Phase::Won => '1',
            Phase::Lost => '2',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Phase::Active),
            "1" => Some(Phase::Won),
            "2" => Some(Phase::Lost),
            _ => None,
        }
    }
}

/// Held movement buttons. They persist across requests so a held button
/// keeps acting on every turn until toggled off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intents {
    pub forward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// The player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    /// Facing in radians, always within `[0, 2π)`
    pub angle: f32,
    pub health: u16,
    pub intents: Intents,
}

/// One enemy slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub health: u16,
    pub active: bool,
}

impl Enemy {
    /// Placeholder for a slot that never held an enemy
    pub const VACANT: Enemy = Enemy {
        x: 0.0,
        y: 0.0,
        health: 0,
        active: false,
    };

    pub fn spawn(x: f32, y: f32, health: u16) -> Self {
        Self {
            x,
            y,
            health,
            active: true,
        }
    }

    /// True for placeholder slots. Defeated enemies keep their position
    /// and are not vacant.
    pub fn is_vacant(&self) -> bool {
        !self.active && self.x == 0.0 && self.y == 0.0
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (self.x - x).hypot(self.y - y)
    }

    /// Whether this enemy stands on the same tile as the given point
    pub fn occupies_tile(&self, x: f32, y: f32) -> bool {
        self.x.floor() == x.floor() && self.y.floor() == y.floor()
    }
}

/// Complete state of one game
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub player: Player,
    pub enemies: [Enemy; ENEMY_SLOTS],
    /// Status line for the current turn. Not part of the token.
    pub message: String,
    pub phase: Phase,
    /// Unix seconds of the latest interaction
    pub last_interaction: u64,
}

impl GameState {
    pub fn active_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    /// Append a sentence to this turn's status message
    pub fn note(&mut self, text: impl AsRef<str>) {
        if !self.message.is_empty() {
            self.message.push(' ');
        }
        self.message.push_str(text.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_codes_round_trip() {
        for phase in [Phase::Active, Phase::Won, Phase::Lost] {
            let code = phase.code().to_string();
            assert_eq!(Phase::from_code(&code), Some(phase));
        }
        assert_eq!(Phase::from_code("3"), None);
        assert!(!Phase::Active.is_terminal());
        assert!(Phase::Won.is_terminal() && Phase::Lost.is_terminal());
    }

    #[test]
    fn vacant_and_defeated_slots_differ() {
        assert!(Enemy::VACANT.is_vacant());
        let mut defeated = Enemy::spawn(3.5, 4.5, 30);
        defeated.active = false;
        defeated.health = 0;
        assert!(!defeated.is_vacant());
        assert!(defeated.occupies_tile(3.9, 4.1));
        assert!(!defeated.occupies_tile(4.0, 4.1));
    }

    #[test]
    fn notes_are_joined_with_spaces() {
        let mut state = GameState {
            player: Player {
                x: 1.5,
                y: 1.5,
                angle: 0.0,
                health: 100,
                intents: Intents::default(),
            },
            enemies: [Enemy::VACANT; ENEMY_SLOTS],
            message: String::new(),
            phase: Phase::Active,
            last_interaction: 0,
        };
        state.note("Hit!");
        state.note("Enemy eliminated!");
        assert_eq!(state.message, "Hit! Enemy eliminated!");
    }
}
