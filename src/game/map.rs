//! Dungeon tile grid and tile lookups
//!
//! The level is never serialized: client and server both rebuild it from
//! [`LEVEL`], so a token only has to carry the entities moving through it.

/// A single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Exit,
}

/// Built-in level layout.
///
/// `#` wall, `.` floor, `E` exit, `P` player start, `M` enemy spawn candidate.
pub const LEVEL: [&str; 9] = [
    "############",
    "#P...#....M#",
    "#.##.#.##..#",
    "#.#......#.#",
    "#.#.##.#.#.#",
    "#M..#..#...#",
    "###.#.##.#.#",
    "#.....M..#E#",
    "############",
];

/// Immutable tile grid with the spawn points found while parsing it
#[derive(Debug, Clone)]
pub struct GridMap {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    player_start: (f32, f32),
    enemy_spawns: Vec<(f32, f32)>,
}

impl GridMap {
    /// Parse a map from rows of glyphs (see [`LEVEL`] for the legend)
    pub fn parse(rows: &[&str]) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut player_start = None;
        let mut enemy_spawns = Vec::new();
        let mut has_exit = false;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(MapError::RaggedRow { row: y });
            }
            for (x, glyph) in row.chars().enumerate() {
                let centre = (x as f32 + 0.5, y as f32 + 0.5);
                let tile = match glyph {
                    '#' => Tile::Wall,
                    '.' => Tile::Floor,
                    'E' => {
                        has_exit = true;
                        Tile::Exit
                    }
                    'P' => {
                        if player_start.replace(centre).is_some() {
                            return Err(MapError::DuplicatePlayerStart);
                        }
                        Tile::Floor
                    }
                    'M' => {
                        enemy_spawns.push(centre);
                        Tile::Floor
                    }
                    other => return Err(MapError::UnknownGlyph { glyph: other, x, y }),
                };
                tiles.push(tile);
            }
        }

        if !has_exit {
            return Err(MapError::MissingExit);
        }

        Ok(Self {
            width,
            height,
            tiles,
            player_start: player_start.ok_or(MapError::MissingPlayerStart)?,
            enemy_spawns,
        })
    }

    /// The level shipped with the server
    pub fn builtin() -> Result<Self, MapError> {
        Self::parse(&LEVEL)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Centre of the player start tile
    pub fn player_start(&self) -> (f32, f32) {
        self.player_start
    }

    /// Centres of every enemy spawn candidate, in reading order
    pub fn enemy_spawns(&self) -> &[(f32, f32)] {
        &self.enemy_spawns
    }

    /// Tile under a world position. Anything off the grid reads as a wall.
    pub fn tile_at(&self, x: f32, y: f32) -> Tile {
        if !x.is_finite() || !y.is_finite() {
            return Tile::Wall;
        }
        self.tile_at_cell(x.floor() as i64, y.floor() as i64)
    }

    /// Tile at integer cell coordinates, walls outside the grid
    pub fn tile_at_cell(&self, cx: i64, cy: i64) -> Tile {
        if cx < 0 || cy < 0 || cx >= self.width as i64 || cy >= self.height as i64 {
            return Tile::Wall;
        }
        self.tiles[cy as usize * self.width + cx as usize]
    }

    pub fn is_blocked(&self, x: f32, y: f32) -> bool {
        self.tile_at(x, y) == Tile::Wall
    }
}

/// Map parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map has no rows")]
    Empty,

    #[error("Row {row} has a different width from the first row")]
    RaggedRow { row: usize },

    #[error("Unknown map glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("Map has no player start")]
    MissingPlayerStart,

    #[error("Map has more than one player start")]
    DuplicatePlayerStart,

    #[error("Map has no exit tile")]
    MissingExit,
}
