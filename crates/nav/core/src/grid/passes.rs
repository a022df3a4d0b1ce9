//! Pure derivation passes run while building a [`super::Grid`].
//!
//! Each pass reads one [`RawCollisionMap`] and returns a new one, so the input
//! of a pass is never affected by the cells it has already rewritten.

use crate::collision::CollisionType;
use crate::position::Position;

use super::raw::RawCollisionMap;

/// Radius (Chebyshev) of the low-priority buffer around repelling tiles.
pub const SOFT_BUFFER_RADIUS: i32 = 2;

/// Downgrades Walkable tiles near walls to LowPriority.
///
/// A tile is downgraded when any tile within [`SOFT_BUFFER_RADIUS`] is
/// NonWalkable, or TeleportOver for a mover that cannot teleport.
pub fn soften(source: &RawCollisionMap, can_teleport: bool) -> RawCollisionMap {
    let mut out = source.clone();

    for y in 0..source.height() as i32 {
        for x in 0..source.width() as i32 {
            let origin = Position::new(x, y);
            let repels = source
                .get(origin)
                .is_some_and(|kind| kind.repels_neighbors(can_teleport));
            if !repels {
                continue;
            }

            for dy in -SOFT_BUFFER_RADIUS..=SOFT_BUFFER_RADIUS {
                for dx in -SOFT_BUFFER_RADIUS..=SOFT_BUFFER_RADIUS {
                    let neighbor = origin.offset(dx, dy);
                    if source.get(neighbor) == Some(CollisionType::Walkable) {
                        out.set(neighbor, CollisionType::LowPriority);
                    }
                }
            }
        }
    }

    out
}

/// Closes one-tile-wide passages and diagonal gaps for walkers.
///
/// Interior Walkable tiles with three or more NonWalkable cardinal neighbors
/// become Thickened, then diagonal gaps are closed on the result.
pub fn thicken_narrow_passages(source: &RawCollisionMap) -> RawCollisionMap {
    let mut out = source.clone();
    let is_wall = |p: Position| source.get(p) == Some(CollisionType::NonWalkable);

    for y in 1..source.height() as i32 - 1 {
        for x in 1..source.width() as i32 - 1 {
            let p = Position::new(x, y);
            if source.get(p) != Some(CollisionType::Walkable) {
                continue;
            }

            let walls = [(0, -1), (0, 1), (-1, 0), (1, 0)]
                .into_iter()
                .filter(|&(dx, dy)| is_wall(p.offset(dx, dy)))
                .count();
            if walls >= 3 {
                out.set(p, CollisionType::Thickened);
            }
        }
    }

    close_diagonal_gaps(&out)
}

/// Marks Walkable tiles squeezed between two diagonal obstacles as Thickened.
fn close_diagonal_gaps(source: &RawCollisionMap) -> RawCollisionMap {
    let mut out = source.clone();
    let solid = |p: Position| {
        matches!(
            source.get(p),
            Some(
                CollisionType::NonWalkable
                    | CollisionType::TeleportOver
                    | CollisionType::Thickened
            )
        )
    };
    let wall = |p: Position| source.get(p) == Some(CollisionType::NonWalkable);

    for y in 1..source.height() as i32 - 1 {
        for x in 1..source.width() as i32 - 1 {
            let p = Position::new(x, y);
            if source.get(p) != Some(CollisionType::Walkable) {
                continue;
            }

            let falling = solid(p.offset(-1, -1))
                && solid(p.offset(1, 1))
                && wall(p.offset(0, -1))
                && wall(p.offset(-1, 0));
            let rising = solid(p.offset(1, -1))
                && solid(p.offset(-1, 1))
                && wall(p.offset(0, -1))
                && wall(p.offset(1, 0));

            if falling || rising {
                out.set(p, CollisionType::Thickened);
            }
        }
    }

    out
}

/// Re-opens teleport-only tiles around known exits (grid-local positions).
pub fn drill_exits(source: &RawCollisionMap, exits: &[Position]) -> RawCollisionMap {
    let mut out = source.clone();

    for exit in exits {
        if !source.contains(*exit) {
            continue;
        }
        for dy in -1..=1 {
            for dx in -1..=1 {
                let p = exit.offset(dx, dy);
                if matches!(
                    source.get(p),
                    Some(CollisionType::Thickened | CollisionType::TeleportOver)
                ) {
                    out.set(p, CollisionType::Walkable);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use CollisionType::{NonWalkable as X, Walkable as O};

    fn map(rows: Vec<Vec<CollisionType>>) -> RawCollisionMap {
        RawCollisionMap::new(rows).unwrap()
    }

    #[test]
    fn soften_reads_the_source_only() {
        // A chain of Walkable tiles must not cascade into LowPriority.
        let raw = map(vec![vec![X, O, O, O, O, O]]);
        let soft = soften(&raw, false);
        assert_eq!(soft.get(Position::new(1, 0)), Some(CollisionType::LowPriority));
        assert_eq!(soft.get(Position::new(2, 0)), Some(CollisionType::LowPriority));
        assert_eq!(soft.get(Position::new(3, 0)), Some(O));
        assert_eq!(raw.get(Position::new(1, 0)), Some(O));
    }

    #[test]
    fn teleporters_are_not_repelled_by_voids() {
        let t = CollisionType::TeleportOver;
        let raw = map(vec![vec![t, O, O, O]]);
        assert_eq!(soften(&raw, true).get(Position::new(1, 0)), Some(O));
        assert_eq!(
            soften(&raw, false).get(Position::new(1, 0)),
            Some(CollisionType::LowPriority)
        );
    }

    #[test]
    fn dead_end_notch_is_thickened() {
        let raw = map(vec![
            vec![X, X, X, X, X],
            vec![X, X, O, X, X],
            vec![O, O, O, O, O],
        ]);
        let thick = thicken_narrow_passages(&raw);
        assert_eq!(thick.get(Position::new(2, 1)), Some(CollisionType::Thickened));
        assert_eq!(thick.get(Position::new(2, 2)), Some(O));
    }

    #[test]
    fn diagonal_gap_is_closed() {
        let raw = map(vec![
            vec![X, X, O, O],
            vec![X, O, O, O],
            vec![O, O, X, O],
            vec![O, O, O, O],
        ]);
        let thick = thicken_narrow_passages(&raw);
        assert_eq!(thick.get(Position::new(1, 1)), Some(CollisionType::Thickened));
    }

    #[test]
    fn drilling_reopens_exit_neighborhood() {
        let mut raw = RawCollisionMap::filled(5, 5, CollisionType::Thickened).unwrap();
        raw.set(Position::new(0, 0), X);
        let drilled = drill_exits(&raw, &[Position::new(1, 1), Position::new(40, 40)]);
        assert_eq!(drilled.get(Position::new(0, 0)), Some(X));
        assert_eq!(drilled.get(Position::new(2, 2)), Some(O));
        assert_eq!(drilled.get(Position::new(3, 3)), Some(CollisionType::Thickened));
    }
}
