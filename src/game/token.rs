//! Session token codec
//!
//! The whole game travels as a short string of `|`-separated fields so the
//! server keeps no session storage. Field order:
//!
//! ```text
//! px|py|angle|hp|hold_fwd|hold_left|hold_right|(ex|ey|ehp|active) x ENEMY_SLOTS|phase|timestamp
//! ```
//!
//! Positions are truncated rather than rounded: truncation never pushes a
//! coordinate across a tile boundary, so an in-floor position stays on
//! the same tile after a round trip.

use std::fmt::Write;
use std::str::FromStr;

use super::action::Action;
use super::physics::normalize_angle;
use super::state::{Enemy, GameState, Intents, Phase, Player, ENEMY_SLOTS};

pub const DELIMITER: char = '|';

/// Hard limit on a button id (prefix + token)
pub const TOKEN_CEILING: usize = 100;

/// Longest token that still fits next to any button prefix
pub const MAX_TOKEN_LEN: usize = TOKEN_CEILING - Action::MAX_PREFIX_LEN;

const PLAYER_FIELDS: usize = 7;
const ENEMY_FIELDS: usize = 4;
const TRAILER_FIELDS: usize = 2;

/// Number of fields in every valid token
pub const FIELD_COUNT: usize = PLAYER_FIELDS + ENEMY_FIELDS * ENEMY_SLOTS + TRAILER_FIELDS;

const PLAYER_SCALE: f64 = 100.0;
const ANGLE_SCALE: f64 = 1000.0;
const ENEMY_SCALE: f64 = 10.0;

/// Absorbs f32 representation error so a decoded value re-encodes to the
/// same digits.
const SNAP_EPSILON: f64 = 1e-3;

/// Token decoding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Field `{0}` is not a number")]
    NotANumber(&'static str),

    #[error("Field `{0}` is out of range")]
    OutOfRange(&'static str),

    #[error("Field `{0}` is not a 0/1 flag")]
    InvalidFlag(&'static str),

    #[error("Unknown phase code")]
    UnknownPhase,

    #[error("Token is {len} characters, limit is {limit}")]
    TooLong { len: usize, limit: usize },

    #[error("The {0} is inside a wall")]
    InsideWall(&'static str),

    #[error("An enemy is standing on the exit")]
    EnemyOnExit,
}

/// Token encoding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("Token needs {len} characters with its button prefix, limit is {ceiling}")]
    Overflow { len: usize, ceiling: usize },
}

/// Truncate towards zero at `scale` (100 = two decimals) without leaving
/// the integer cell the value started in.
fn truncate(value: f32, scale: f64) -> f64 {
    let exact = f64::from(value);
    let snapped = (exact * scale + SNAP_EPSILON).trunc() / scale;
    if snapped.floor() > exact.floor() {
        (exact * scale).trunc() / scale
    } else {
        snapped
    }
}

fn flag(value: bool) -> char {
    if value {
        '1'
    } else {
        '0'
    }
}

/// Serialize a game state. Fails if the result would not fit in a button
/// id next to the longest action prefix.
pub fn encode(state: &GameState) -> Result<String, EncodeError> {
    let p = &state.player;
    let mut out = String::with_capacity(TOKEN_CEILING);

    // Writing into a String cannot fail
    let _ = write!(
        out,
        "{:.2}{d}{:.2}{d}{:.3}{d}{}{d}{}{d}{}{d}{}",
        truncate(p.x, PLAYER_SCALE),
        truncate(p.y, PLAYER_SCALE),
        truncate(p.angle, ANGLE_SCALE),
        p.health,
        flag(p.intents.forward),
        flag(p.intents.turn_left),
        flag(p.intents.turn_right),
        d = DELIMITER,
    );

    for enemy in &state.enemies {
        let _ = write!(
            out,
            "{d}{:.1}{d}{:.1}{d}{}{d}{}",
            truncate(enemy.x, ENEMY_SCALE),
            truncate(enemy.y, ENEMY_SCALE),
            enemy.health,
            flag(enemy.active),
            d = DELIMITER,
        );
    }

    let _ = write!(
        out,
        "{d}{}{d}{}",
        state.phase.code(),
        state.last_interaction,
        d = DELIMITER,
    );

    let len = out.len() + Action::MAX_PREFIX_LEN;
    if len > TOKEN_CEILING {
        return Err(EncodeError::Overflow {
            len,
            ceiling: TOKEN_CEILING,
        });
    }

    Ok(out)
}

/// Positional reader over the token fields
struct Fields<'a> {
    parts: std::str::Split<'a, char>,
}

impl<'a> Fields<'a> {
    fn next(&mut self) -> &'a str {
        // Arity is checked up front, so the iterator cannot run dry
        self.parts.next().unwrap_or_default()
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        self.next()
            .parse()
            .map_err(|_| DecodeError::NotANumber(field))
    }

    fn real(&mut self, field: &'static str) -> Result<f32, DecodeError> {
        let value: f32 = self.number(field)?;
        if !value.is_finite() {
            return Err(DecodeError::NotANumber(field));
        }
        Ok(value)
    }

    fn coordinate(&mut self, field: &'static str) -> Result<f32, DecodeError> {
        let value = self.real(field)?;
        if value < 0.0 {
            return Err(DecodeError::OutOfRange(field));
        }
        Ok(value)
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        match self.next() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(DecodeError::InvalidFlag(field)),
        }
    }
}

/// Parse a token back into a game state. Any malformed field rejects the
/// whole token; no partially decoded state is ever returned.
pub fn decode(token: &str) -> Result<GameState, DecodeError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(DecodeError::TooLong {
            len: token.len(),
            limit: MAX_TOKEN_LEN,
        });
    }

    let found = token.split(DELIMITER).count();
    if found != FIELD_COUNT {
        return Err(DecodeError::FieldCount {
            expected: FIELD_COUNT,
            found,
        });
    }

    let mut fields = Fields {
        parts: token.split(DELIMITER),
    };

    let player = Player {
        x: fields.coordinate("player.x")?,
        y: fields.coordinate("player.y")?,
        angle: normalize_angle(fields.real("player.angle")?),
        health: fields.number("player.health")?,
        intents: Intents {
            forward: fields.flag("player.hold_forward")?,
            turn_left: fields.flag("player.hold_left")?,
            turn_right: fields.flag("player.hold_right")?,
        },
    };

    let mut enemies = [Enemy::VACANT; ENEMY_SLOTS];
    for slot in enemies.iter_mut() {
        let enemy = Enemy {
            x: fields.coordinate("enemy.x")?,
            y: fields.coordinate("enemy.y")?,
            health: fields.number("enemy.health")?,
            active: fields.flag("enemy.active")?,
        };
        if enemy.active && enemy.health == 0 {
            return Err(DecodeError::OutOfRange("enemy.health"));
        }
        *slot = enemy;
    }

    let phase = Phase::from_code(fields.next()).ok_or(DecodeError::UnknownPhase)?;
    let last_interaction = fields.number("timestamp")?;

    Ok(GameState {
        player,
        enemies,
        message: String::new(),
        phase,
        last_interaction,
    })
}
