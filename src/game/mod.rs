//! Game simulation modules

pub mod action;
pub mod combat;
pub mod map;
pub mod physics;
pub mod raycast;
pub mod render;
pub mod sprite;
pub mod state;
pub mod token;
pub mod turn;

pub use action::Action;
pub use map::{GridMap, MapError};
pub use render::{Frame, ViewConfig};
pub use state::{GameState, Phase};
pub use turn::{Engine, EngineError, TurnOutcome};

use combat::CombatStats;
use physics::MovementStats;

/// Gameplay tuning shared by every turn
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tuning {
    pub movement: MovementStats,
    pub combat: CombatStats,
}
