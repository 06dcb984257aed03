//! Column raycaster
//!
//! One ray per screen column, walked through the grid with DDA stepping.
//! Hit distances are corrected by `cos(ray - facing)` so a flat wall
//! renders flat instead of bowing towards the screen edges.

use super::map::{GridMap, Tile};
use super::physics::normalize_angle;
use super::render::{Frame, Glyph, ViewConfig, MIN_DEPTH};

/// Where a single ray stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Euclidean distance along the ray
    pub distance: f32,
    pub tile: Tile,
}

/// Result of casting one screen column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Perpendicular (fish-eye corrected) distance. `max_depth` on a miss.
    pub depth: f32,
    pub hit: Option<Tile>,
}

/// Step direction, first boundary distance and per-cell distance on one axis
fn axis_setup(origin: f32, cell: i64, dir: f32) -> (i64, f32, f32) {
    if dir.abs() < 1e-9 {
        return (0, f32::INFINITY, f32::INFINITY);
    }
    let delta = (1.0 / dir).abs();
    if dir < 0.0 {
        (-1, (origin - cell as f32) * delta, delta)
    } else {
        (1, (cell as f32 + 1.0 - origin) * delta, delta)
    }
}

/// Walk a ray from `(x, y)` until it enters a wall or exit tile.
/// Returns `None` when nothing is hit within `max_depth`.
pub fn cast_ray(map: &GridMap, x: f32, y: f32, angle: f32, max_depth: f32) -> Option<RayHit> {
    cast_ray_until(map, x, y, angle, max_depth, |tile| tile != Tile::Floor)
}

/// Like [`cast_ray`], stopping only on tiles for which `stops` holds
pub fn cast_ray_until(
    map: &GridMap,
    x: f32,
    y: f32,
    angle: f32,
    max_depth: f32,
    stops: impl Fn(Tile) -> bool,
) -> Option<RayHit> {
    let mut cell_x = x.floor() as i64;
    let mut cell_y = y.floor() as i64;

    let (step_x, mut side_x, delta_x) = axis_setup(x, cell_x, angle.cos());
    let (step_y, mut side_y, delta_y) = axis_setup(y, cell_y, angle.sin());

    loop {
        let distance = if side_x < side_y {
            let d = side_x;
            side_x += delta_x;
            cell_x += step_x;
            d
        } else {
            let d = side_y;
            side_y += delta_y;
            cell_y += step_y;
            d
        };

        if distance > max_depth {
            return None;
        }

        let tile = map.tile_at_cell(cell_x, cell_y);
        if stops(tile) {
            return Some(RayHit { distance, tile });
        }
    }
}

/// World angle of the ray through `column`
pub fn ray_angle(view: &ViewConfig, facing: f32, column: usize) -> f32 {
    let offset = if view.width > 1 {
        column as f32 / (view.width - 1) as f32 - 0.5
    } else {
        0.0
    };
    normalize_angle(facing + offset * view.fov)
}

/// Cast every screen column from the given camera
pub fn cast_columns(map: &GridMap, x: f32, y: f32, facing: f32, view: &ViewConfig) -> Vec<Column> {
    (0..view.width)
        .map(|column| {
            let angle = ray_angle(view, facing, column);
            match cast_ray(map, x, y, angle, view.max_depth) {
                Some(hit) => Column {
                    depth: (hit.distance * (angle - facing).cos()).max(MIN_DEPTH),
                    hit: Some(hit.tile),
                },
                None => Column {
                    depth: view.max_depth,
                    hit: None,
                },
            }
        })
        .collect()
}

fn wall_glyph(view: &ViewConfig, column: &Column) -> Glyph {
    if column.hit == Some(Tile::Exit) {
        Glyph::Exit
    } else if column.depth < view.near_depth {
        Glyph::WallNear
    } else if column.depth < view.mid_depth {
        Glyph::WallMid
    } else {
        Glyph::WallFar
    }
}

/// Floor shade by how far below the horizon a row sits
fn floor_glyph(view: &ViewConfig, row: usize) -> Glyph {
    let half = view.height as f32 / 2.0;
    let below = (row as f32 + 0.5 - half) / half;
    if below > 0.6 {
        Glyph::FloorNear
    } else if below > 0.3 {
        Glyph::FloorMid
    } else {
        Glyph::FloorFar
    }
}

/// Draw ceiling, wall slices and floor for every column
pub fn paint_columns(columns: &[Column], view: &ViewConfig, frame: &mut Frame) {
    for (index, column) in columns.iter().enumerate() {
        let (top, bottom) = match column.hit {
            Some(_) => {
                let rows = view.slice_height(column.depth);
                let top = view.slice_top(rows);
                (top, top + rows)
            }
            None => (view.height / 2, view.height / 2),
        };

        let wall = wall_glyph(view, column);
        for row in 0..view.height {
            let glyph = if row < top {
                Glyph::Ceiling
            } else if row < bottom {
                wall
            } else {
                floor_glyph(view, row)
            };
            frame.set(index, row, glyph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn hall() -> GridMap {
        GridMap::parse(&[
            "########", //
            "#......#", //
            "#......#", //
            "#......#", //
            "#P.....#", //
            "#......#", //
            "#......#", //
            "#......#", //
            "###E####",
        ])
        .unwrap()
    }

    #[test]
    fn ray_stops_at_first_wall() {
        let map = hall();
        let hit = cast_ray(&map, 1.5, 4.5, 0.0, 16.0).unwrap();
        assert!((hit.distance - 5.5).abs() < 1e-4);
        assert_eq!(hit.tile, Tile::Wall);

        let hit = cast_ray(&map, 1.5, 4.5, FRAC_PI_2, 16.0).unwrap();
        assert!((hit.distance - 3.5).abs() < 1e-4);

        let hit = cast_ray(&map, 1.5, 4.5, PI, 16.0).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-4);
    }

    #[test]
    fn ray_reports_exit_tiles() {
        let map = hall();
        let hit = cast_ray(&map, 3.5, 6.5, FRAC_PI_2, 16.0).unwrap();
        assert_eq!(hit.tile, Tile::Exit);
        assert!((hit.distance - 1.5).abs() < 1e-4);
    }

    #[test]
    fn custom_stop_rule_sees_past_exits() {
        let map = hall();
        // The exit sits in the border row; past it the grid ends
        let hit = cast_ray_until(&map, 3.5, 6.5, FRAC_PI_2, 16.0, |tile| tile == Tile::Wall).unwrap();
        assert_eq!(hit.tile, Tile::Wall);
        assert!((hit.distance - 2.5).abs() < 1e-4);
    }

    #[test]
    fn ray_beyond_max_depth_misses() {
        let map = hall();
        assert_eq!(cast_ray(&map, 1.5, 4.5, 0.0, 3.0), None);
    }

    #[test]
    fn leaving_an_unwalled_grid_counts_as_a_wall() {
        let map = GridMap::parse(&["P..E"]).unwrap();
        let hit = cast_ray(&map, 0.5, 0.5, PI, 16.0).unwrap();
        assert_eq!(hit.tile, Tile::Wall);
        assert!((hit.distance - 0.5).abs() < 1e-4);
    }

    #[test]
    fn centre_column_is_uncorrected() {
        let map = hall();
        let view = ViewConfig::default();
        let centre = view.center_column();
        assert_eq!(ray_angle(&view, 0.0, centre), 0.0);

        let columns = cast_columns(&map, 1.5, 4.5, 0.0, &view);
        assert_eq!(columns.len(), view.width);
        let straight = cast_ray(&map, 1.5, 4.5, 0.0, view.max_depth).unwrap();
        assert!((columns[centre].depth - straight.distance).abs() < 1e-5);
        let edge = cast_ray(&map, 1.5, 4.5, ray_angle(&view, 0.0, 0), view.max_depth).unwrap();
        assert!(columns[0].depth < edge.distance);
    }

    #[test]
    fn flat_wall_has_constant_corrected_depth() {
        let map = hall();
        let view = ViewConfig::default();
        let columns = cast_columns(&map, 1.5, 4.5, 0.0, &view);
        for column in &columns {
            assert!((column.depth - 5.5).abs() < 1e-3, "depth {}", column.depth);
        }
    }

    #[test]
    fn painted_column_has_ceiling_wall_floor_bands() {
        let map = hall();
        let view = ViewConfig::default();
        let columns = cast_columns(&map, 1.5, 4.5, 0.0, &view);
        let mut frame = Frame::new(view.width, view.height);
        paint_columns(&columns, &view, &mut frame);

        // 13 / 5.5 rounds to a two-row slice starting at row 5
        let glyphs = frame.column(view.center_column());
        assert!(glyphs[..5].iter().all(|g| *g == Glyph::Ceiling));
        assert_eq!(&glyphs[5..7], &[Glyph::WallMid, Glyph::WallMid]);
        assert_eq!(glyphs[12], Glyph::FloorNear);
        assert!(glyphs[7..].iter().all(|g| matches!(
            g,
            Glyph::FloorNear | Glyph::FloorMid | Glyph::FloorFar
        )));
    }

    #[test]
    fn empty_column_splits_ceiling_and_floor() {
        let map = hall();
        let view = ViewConfig {
            max_depth: 2.0,
            ..ViewConfig::default()
        };
        let columns = cast_columns(&map, 1.5, 4.5, 0.0, &view);
        assert_eq!(columns[view.center_column()].hit, None);
        assert_eq!(columns[view.center_column()].depth, 2.0);

        let mut frame = Frame::new(view.width, view.height);
        paint_columns(&columns, &view, &mut frame);
        let glyphs = frame.column(view.center_column());
        assert!(glyphs[..6].iter().all(|g| *g == Glyph::Ceiling));
        assert!(glyphs[6..].iter().all(|g| *g != Glyph::Ceiling));
    }

    #[test]
    fn near_wall_fills_the_column() {
        let map = hall();
        let view = ViewConfig::default();
        let columns = cast_columns(&map, 1.5, 4.5, PI, &view);
        let mut frame = Frame::new(view.width, view.height);
        paint_columns(&columns, &view, &mut frame);
        assert!(frame
            .column(view.center_column())
            .iter()
            .all(|g| *g == Glyph::WallNear));
    }
}
