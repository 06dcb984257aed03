//! Symbolic first-person frame assembly

use std::f32::consts::FRAC_PI_3;
use std::fmt;

use super::map::GridMap;
use super::raycast;
use super::sprite;
use super::state::GameState;

/// Smallest distance used in projection math
pub const MIN_DEPTH: f32 = 1e-3;

/// Camera and screen settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    /// Screen columns. Odd, so the centre column looks straight ahead.
    pub width: usize,
    /// Screen rows
    pub height: usize,
    /// Horizontal field of view in radians
    pub fov: f32,
    /// Rays stop after this many tiles
    pub max_depth: f32,
    /// Walls closer than this use the near shade
    pub near_depth: f32,
    /// Walls closer than this (and not near) use the mid shade
    pub mid_depth: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 31,
            height: 13,
            fov: FRAC_PI_3,
            max_depth: 16.0,
            near_depth: 3.0,
            mid_depth: 7.0,
        }
    }
}

impl ViewConfig {
    #[cfg(test)]
    pub fn center_column(&self) -> usize {
        self.width / 2
    }

    /// Rows covered by something standing `depth` tiles away
    pub fn slice_height(&self, depth: f32) -> usize {
        let rows = self.height as f32 / depth.max(MIN_DEPTH);
        (rows.round() as usize).min(self.height)
    }

    /// First row of a vertically centred run of `rows` rows
    pub fn slice_top(&self, rows: usize) -> usize {
        (self.height - rows.min(self.height)) / 2
    }
}

/// Symbols a frame is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Ceiling,
    WallNear,
    WallMid,
    WallFar,
    Exit,
    FloorNear,
    FloorMid,
    FloorFar,
    Enemy,
    EnemyDefeated,
}

impl Glyph {
    pub fn as_char(self) -> char {
        match self {
            Glyph::Ceiling => ' ',
            Glyph::WallNear => '█',
            Glyph::WallMid => '▓',
            Glyph::WallFar => '░',
            Glyph::Exit => '▞',
            Glyph::FloorNear => '=',
            Glyph::FloorMid => '-',
            Glyph::FloorFar => '.',
            Glyph::Enemy => 'M',
            Glyph::EnemyDefeated => 'x',
        }
    }
}

/// A rendered view plus its status line
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
    pub status: String,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Glyph::Ceiling; width * height],
            status: String::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, column: usize, row: usize) -> Option<Glyph> {
        if column >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row * self.width + column])
    }

    /// Out-of-range writes are ignored
    pub fn set(&mut self, column: usize, row: usize, glyph: Glyph) {
        if column < self.width && row < self.height {
            self.cells[row * self.width + column] = glyph;
        }
    }

    #[cfg(test)]
    pub fn column(&self, column: usize) -> Vec<Glyph> {
        (0..self.height).filter_map(|row| self.get(column, row)).collect()
    }

    pub fn row_text(&self, row: usize) -> String {
        (0..self.width)
            .filter_map(|column| self.get(column, row))
            .map(Glyph::as_char)
            .collect()
    }

    /// The picture alone, without the status line
    pub fn view_text(&self) -> String {
        (0..self.height)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.view_text())?;
        write!(f, "{}", self.status)
    }
}

/// Render the player's view of the dungeon
pub fn render(map: &GridMap, state: &GameState, view: &ViewConfig) -> Frame {
    let mut frame = Frame::new(view.width, view.height);
    let player = &state.player;

    let columns = raycast::cast_columns(map, player.x, player.y, player.angle, view);
    raycast::paint_columns(&columns, view, &mut frame);
    sprite::paint_sprites(player, &state.enemies, &columns, view, &mut frame);

    frame.status = status_line(state);
    frame
}

fn status_line(state: &GameState) -> String {
    let foes = state.enemies.iter().filter(|e| !e.is_vacant()).count();
    let mut line = format!(
        "HP {} | Foes {}/{}",
        state.player.health,
        state.active_enemies(),
        foes
    );
    if !state.message.is_empty() {
        line.push_str(" | ");
        line.push_str(&state.message);
    }
    line
}
