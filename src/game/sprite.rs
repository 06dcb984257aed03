//! Enemy sprites projected into camera space

use super::raycast::Column;
use super::render::{Frame, Glyph, ViewConfig, MIN_DEPTH};
use super::state::{Enemy, Player};

/// Screen placement of a world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub column: usize,
    /// Distance along the view axis, comparable with corrected wall depths
    pub depth: f32,
}

/// Project a world point for a camera at `(x, y)` facing `facing`.
/// Returns `None` for points behind the camera or outside the field of view.
pub fn project(view: &ViewConfig, x: f32, y: f32, facing: f32, tx: f32, ty: f32) -> Option<Projection> {
    let dx = tx - x;
    let dy = ty - y;

    // Rotate the offset by -facing: forward runs along the view axis,
    // lateral is positive towards the right-hand screen edge.
    let (sin, cos) = facing.sin_cos();
    let forward = dx * cos + dy * sin;
    let lateral = -dx * sin + dy * cos;

    if forward <= MIN_DEPTH {
        return None;
    }

    let half_fov = view.fov / 2.0;
    let bearing = lateral.atan2(forward);
    if bearing.abs() > half_fov {
        return None;
    }

    let last = view.width.saturating_sub(1);
    let position = (bearing + half_fov) / view.fov * last as f32;
    let column = (position.round().max(0.0) as usize).min(last);

    Some(Projection {
        column,
        depth: forward,
    })
}

/// Draw every non-vacant enemy, far to near, skipping any column where a
/// wall is closer than the sprite.
pub fn paint_sprites(
    player: &Player,
    enemies: &[Enemy],
    columns: &[Column],
    view: &ViewConfig,
    frame: &mut Frame,
) {
    let mut sprites: Vec<(Projection, Glyph)> = enemies
        .iter()
        .filter(|enemy| !enemy.is_vacant())
        .filter_map(|enemy| {
            let glyph = if enemy.active {
                Glyph::Enemy
            } else {
                Glyph::EnemyDefeated
            };
            project(view, player.x, player.y, player.angle, enemy.x, enemy.y)
                .map(|projection| (projection, glyph))
        })
        .collect();

    sprites.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

    for (projection, glyph) in sprites {
        draw_sprite(&projection, glyph, columns, view, frame);
    }
}

fn draw_sprite(projection: &Projection, glyph: Glyph, columns: &[Column], view: &ViewConfig, frame: &mut Frame) {
    let full = view.slice_height(projection.depth).max(1);
    let full_top = view.slice_top(full);

    // Defeated enemies lie on the floor: bottom third of the slice only
    let (top, rows) = match glyph {
        Glyph::EnemyDefeated => {
            let rows = (full / 3).max(1);
            (full_top + full - rows, rows)
        }
        _ => (full_top, full),
    };

    let half_width = full / 4;
    let first = projection.column.saturating_sub(half_width);
    let last = (projection.column + half_width).min(view.width.saturating_sub(1));

    for column in first..=last {
        let occluded = columns
            .get(column)
            .map_or(true, |wall| projection.depth >= wall.depth);
        if occluded {
            continue;
        }
        for row in top..top + rows {
            frame.set(column, row, glyph);
        }
    }
}
