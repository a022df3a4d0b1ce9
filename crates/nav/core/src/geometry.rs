//! Geometry helpers over world positions.

use crate::grid::Grid;
use crate::position::Position;

/// Tiles on the straight segment between two positions, endpoints included.
///
/// Uses Bresenham's line algorithm, so the result is symmetric in shape but
/// ordered from `from` to `to`.
pub fn segment_cells(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity(dx.max(-dy) as usize + 1);
    let mut current = from;
    let mut err = dx + dy;

    loop {
        cells.push(current);
        if current == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
    }

    cells
}

/// Whether every tile between two world positions is ground-walkable.
pub fn line_of_sight(grid: &Grid, from: Position, to: Position) -> bool {
    segment_cells(from, to)
        .into_iter()
        .all(|cell| grid.is_walkable(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionType;
    use crate::grid::RawCollisionMap;

    #[test]
    fn segment_includes_both_endpoints() {
        let cells = segment_cells(Position::new(0, 0), Position::new(4, 2));
        assert_eq!(cells.first(), Some(&Position::new(0, 0)));
        assert_eq!(cells.last(), Some(&Position::new(4, 2)));
        assert_eq!(cells.len(), 5);
        assert!(cells.windows(2).all(|w| w[0].is_adjacent(w[1])));
    }

    #[test]
    fn segment_of_single_point() {
        let p = Position::new(-3, 7);
        assert_eq!(segment_cells(p, p), vec![p]);
    }

    #[test]
    fn walls_block_sight() {
        let mut raw = RawCollisionMap::filled(10, 10, CollisionType::Walkable).unwrap();
        raw.fill_rect(Position::new(5, 0), Position::new(5, 6), CollisionType::NonWalkable);
        let grid = Grid::build(raw, 0, 0, false);

        assert!(!line_of_sight(&grid, Position::new(1, 3), Position::new(8, 3)));
        assert!(line_of_sight(&grid, Position::new(1, 8), Position::new(8, 8)));
        assert!(!line_of_sight(&grid, Position::new(1, 8), Position::new(20, 8)));
    }
}
