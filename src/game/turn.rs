//! Turn resolution
//!
//! A turn is a pure function of (prior state, action, clock): decode the
//! token, apply the action, let enemies act, check for the end of the
//! game, then render and encode the next state. Nothing is stored between
//! requests.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::action::Action;
use super::combat::{CombatSystem, ShotOutcome};
use super::map::{GridMap, Tile};
use super::physics::PhysicsSystem;
use super::render::{self, Frame, ViewConfig};
use super::state::{Enemy, GameState, Intents, Phase, Player, ENEMY_SLOTS};
use super::token::{self, DecodeError, EncodeError};
use super::Tuning;

/// Everything a caller needs after a turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: GameState,
    pub token: String,
    pub frame: Frame,
}

/// Turn failures
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Corrupted session: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Stateless turn resolver for one level
#[derive(Debug, Clone)]
pub struct Engine {
    map: GridMap,
    tuning: Tuning,
    view: ViewConfig,
}

impl Engine {
    pub fn new(map: GridMap, tuning: Tuning, view: ViewConfig) -> Self {
        Self { map, tuning, view }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Fresh state: player on the start tile facing east, enemies on spawn
    /// tiles picked by `seed`. Slots without a spawn stay vacant.
    pub fn start_state(&self, seed: u64, now: u64) -> GameState {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut spawns = self.map.enemy_spawns().to_vec();
        spawns.shuffle(&mut rng);

        let mut enemies = [Enemy::VACANT; ENEMY_SLOTS];
        for (slot, (x, y)) in enemies.iter_mut().zip(spawns) {
            *slot = Enemy::spawn(x, y, self.tuning.combat.enemy_health);
        }

        let (x, y) = self.map.player_start();
        GameState {
            player: Player {
                x,
                y,
                angle: 0.0,
                health: self.tuning.combat.player_health,
                intents: Intents::default(),
            },
            enemies,
            message: "You enter the dungeon. Find the exit!".to_string(),
            phase: Phase::Active,
            last_interaction: now,
        }
    }

    pub fn new_game(&self, seed: u64, now: u64) -> Result<TurnOutcome, EngineError> {
        let state = self.start_state(seed, now);
        info!(seed, enemies = state.active_enemies(), "New game started");
        self.finish(state)
    }

    /// Decode a token and check it against this level and its tuning.
    /// Anything a real game could not have produced is rejected, which
    /// also keeps the re-encoded token inside its length budget.
    pub fn decode(&self, token: &str) -> Result<GameState, DecodeError> {
        let state = token::decode(token)?;
        let combat = &self.tuning.combat;

        if state.player.health > combat.player_health {
            return Err(DecodeError::OutOfRange("player.health"));
        }
        if self.map.is_blocked(state.player.x, state.player.y) {
            return Err(DecodeError::InsideWall("player"));
        }

        for enemy in &state.enemies {
            if enemy.health > combat.enemy_health {
                return Err(DecodeError::OutOfRange("enemy.health"));
            }
            if enemy.is_vacant() {
                continue;
            }
            match self.map.tile_at(enemy.x, enemy.y) {
                Tile::Floor => {}
                Tile::Wall => return Err(DecodeError::InsideWall("enemy")),
                Tile::Exit => return Err(DecodeError::EnemyOnExit),
            }
        }

        Ok(state)
    }

    /// Decode, resolve one turn, render and re-encode
    pub fn apply_action(&self, token: &str, action: Action, now: u64) -> Result<TurnOutcome, EngineError> {
        let state = self.decode(token)?;
        self.advance(state, action, now)
    }

    /// Resolve one turn for an already decoded state
    pub fn advance(&self, state: GameState, action: Action, now: u64) -> Result<TurnOutcome, EngineError> {
        let state = self.step(state, action, now);
        self.finish(state)
    }

    fn finish(&self, state: GameState) -> Result<TurnOutcome, EngineError> {
        let frame = render::render(&self.map, &state, &self.view);
        let token = token::encode(&state)?;
        Ok(TurnOutcome { state, token, frame })
    }

    /// Pure state transition for one action
    pub fn step(&self, mut state: GameState, action: Action, now: u64) -> GameState {
        state.last_interaction = state.last_interaction.max(now);
        state.message.clear();

        if state.phase.is_terminal() {
            state.note(terminal_message(state.phase));
            return state;
        }

        if action == Action::Idle {
            state.note("Nothing happens.");
            return state;
        }

        let state = self.apply_player_action(state, action);
        let state = self.apply_held_intents(state, action);
        let state = self.run_enemies(state);
        let state = self.check_exit(state);

        debug!(
            action = action.name(),
            phase = ?state.phase,
            health = state.player.health,
            x = state.player.x,
            y = state.player.y,
            "Turn resolved"
        );
        state
    }

    fn apply_player_action(&self, mut state: GameState, action: Action) -> GameState {
        let movement = &self.tuning.movement;
        match action {
            Action::TurnLeft => {
                state.player.angle = PhysicsSystem::turn(state.player.angle, -1.0, movement);
                state.note("You turn left.");
            }
            Action::TurnRight => {
                state.player.angle = PhysicsSystem::turn(state.player.angle, 1.0, movement);
                state.note("You turn right.");
            }
            Action::MoveForward => return self.walk(state, 1.0),
            Action::MoveBackward => return self.walk(state, -1.0),
            Action::Shoot => return self.shoot(state),
            Action::Wait => state.note("You wait."),
            Action::HoldForward => {
                let held = !state.player.intents.forward;
                state.player.intents.forward = held;
                state.note(if held { "You start walking." } else { "You stop walking." });
            }
            Action::HoldLeft => {
                let held = !state.player.intents.turn_left;
                state.player.intents.turn_left = held;
                state.note(if held { "You keep turning left." } else { "You stop turning left." });
            }
            Action::HoldRight => {
                let held = !state.player.intents.turn_right;
                state.player.intents.turn_right = held;
                state.note(if held { "You keep turning right." } else { "You stop turning right." });
            }
            Action::Idle => {}
        }
        state
    }

    fn walk(&self, mut state: GameState, throttle: f32) -> GameState {
        let player = state.player;
        let (x, y) = PhysicsSystem::advance(
            &self.map,
            player.x,
            player.y,
            player.angle,
            throttle,
            &self.tuning.movement,
        );

        if x == player.x && y == player.y {
            state.note("A wall blocks your way.");
        }
        state.player.x = x;
        state.player.y = y;
        state
    }

    fn shoot(&self, mut state: GameState) -> GameState {
        let (enemies, outcome) =
            CombatSystem::resolve_shot(&self.map, &state.player, state.enemies, &self.tuning.combat);
        state.enemies = enemies;

        match outcome {
            ShotOutcome::Miss => state.note("Your shot hits nothing."),
            ShotOutcome::Hit { remaining, .. } => {
                state.note(format!("Hit! The enemy has {remaining} HP left."));
            }
            ShotOutcome::Eliminated { slot } => {
                state.note("Enemy eliminated!");
                debug!(slot, "Enemy eliminated");
                if state.active_enemies() == 0 {
                    state.phase = Phase::Won;
                    state.note("All enemies are down. You win!");
                    info!("Game won by clearing the dungeon");
                }
            }
        }
        state
    }

    /// Held buttons act once per turn, skipping the one the explicit
    /// action already performed
    fn apply_held_intents(&self, mut state: GameState, action: Action) -> GameState {
        if state.phase != Phase::Active {
            return state;
        }

        let movement = &self.tuning.movement;
        let intents = state.player.intents;
        if intents.turn_left && action != Action::TurnLeft {
            state.player.angle = PhysicsSystem::turn(state.player.angle, -1.0, movement);
        }
        if intents.turn_right && action != Action::TurnRight {
            state.player.angle = PhysicsSystem::turn(state.player.angle, 1.0, movement);
        }
        if intents.forward && action != Action::MoveForward {
            state = self.walk(state, 1.0);
        }
        state
    }

    /// Each active enemy closes in, then strikes if in contact. The first
    /// fatal strike ends the round.
    fn run_enemies(&self, mut state: GameState) -> GameState {
        if state.phase != Phase::Active {
            return state;
        }

        let combat = &self.tuning.combat;
        let (px, py) = (state.player.x, state.player.y);

        for slot in 0..ENEMY_SLOTS {
            let enemy = state.enemies[slot];
            if !enemy.active {
                continue;
            }

            let enemy = if CombatSystem::in_contact(&enemy, px, py, combat) {
                enemy
            } else {
                let others = state.enemies;
                CombatSystem::step_toward(&self.map, enemy, px, py, |x, y| {
                    others
                        .iter()
                        .enumerate()
                        .any(|(i, other)| i != slot && other.active && other.occupies_tile(x, y))
                })
            };
            state.enemies[slot] = enemy;

            if CombatSystem::in_contact(&enemy, px, py, combat) {
                let (health, dead) = CombatSystem::apply_damage(state.player.health, combat.contact_damage);
                state.player.health = health;
                state.note(format!("An enemy strikes you for {}!", combat.contact_damage));

                if dead {
                    state.phase = Phase::Lost;
                    state.note("You have been slain.");
                    info!(slot, "Game lost to enemy contact");
                    break;
                }
            }
        }

        state
    }

    fn check_exit(&self, mut state: GameState) -> GameState {
        if state.phase == Phase::Active && self.map.tile_at(state.player.x, state.player.y) == Tile::Exit {
            state.phase = Phase::Won;
            state.note("You found the exit. You escaped!");
            info!("Game won by reaching the exit");
        }
        state
    }
}

fn terminal_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Won => "Victory! Start a new game to play again.",
        Phase::Lost => "You have fallen. Start a new game to try again.",
        Phase::Active => "",
    }
}
