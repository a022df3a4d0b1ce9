//! Weighted A* over a collision [`Grid`].
//!
//! The planner works in grid-local coordinates. Callers holding world
//! positions translate with [`Grid::to_local`] before searching and map the
//! result back with [`Path::translated`] using [`Grid::offset`].
//!
//! The heuristic (octile distance) is scaled by a weight below one, which
//! keeps the search fast on large maps while staying close to the cheapest
//! route. Exact shortest paths are not a goal.
mod node;
mod path;

pub use path::Path;

use std::collections::BinaryHeap;

use arrayvec::ArrayVec;

use crate::collision::CollisionType;
use crate::grid::Grid;
use crate::position::Position;

use node::SearchNode;

/// Longest run of TeleportOver tiles a single route may cross.
pub const MAX_CONSECUTIVE_TELEPORT_OVER: u32 = 12;

/// Default multiplier applied to the heuristic.
pub const DEFAULT_HEURISTIC_WEIGHT: f64 = 0.5;

const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Finds a route with the default planner settings.
pub fn find_path(grid: &Grid, start: Position, goal: Position, can_teleport: bool) -> Option<Path> {
    Planner::default().find_path(grid, start, goal, can_teleport)
}

/// Weighted A* path planner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Planner {
    heuristic_weight: f64,
}

impl Planner {
    pub const fn new() -> Self {
        Self {
            heuristic_weight: DEFAULT_HEURISTIC_WEIGHT,
        }
    }

    pub const fn with_heuristic_weight(heuristic_weight: f64) -> Self {
        Self { heuristic_weight }
    }

    pub fn heuristic_weight(&self) -> f64 {
        self.heuristic_weight
    }

    /// Computes a route between two grid-local positions.
    ///
    /// Returns `None` without searching when the grid is empty or either
    /// endpoint lies outside it, and `None` after searching when the frontier
    /// is exhausted before reaching the goal.
    pub fn find_path(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        can_teleport: bool,
    ) -> Option<Path> {
        if grid.width() <= 0 || grid.height() <= 0 {
            return None;
        }
        if !grid.contains_local(start) || !grid.contains_local(goal) {
            return None;
        }

        let width = grid.width() as usize;
        let index = |p: Position| p.y as usize * width + p.x as usize;
        let cell_count = width * grid.height() as usize;

        let mut cost_so_far = vec![u32::MAX; cell_count];
        let mut came_from: Vec<Option<Position>> = vec![None; cell_count];
        let mut frontier = BinaryHeap::new();
        let mut sequence = 0u64;
        let mut expanded = 0usize;

        cost_so_far[index(start)] = 0;
        frontier.push(SearchNode {
            position: start,
            cost: 0,
            priority: self.heuristic_weight * heuristic(start, goal),
            teleport_streak: 0,
            sequence,
        });

        while let Some(current) = frontier.pop() {
            if current.position == goal {
                tracing::trace!(
                    ?start,
                    ?goal,
                    expanded,
                    cost = current.cost,
                    "path found"
                );
                return Some(reconstruct(grid, &came_from, index, start, goal));
            }

            // Stale entry superseded by a cheaper push.
            if current.cost > cost_so_far[index(current.position)] {
                continue;
            }
            expanded += 1;

            for neighbor in neighbors(grid, current.position, can_teleport) {
                let Some(kind) = grid.cell(neighbor) else {
                    continue;
                };
                let Some(step) = kind.step_cost(can_teleport) else {
                    continue;
                };

                let teleport_streak = if kind == CollisionType::TeleportOver {
                    current.teleport_streak + 1
                } else {
                    0
                };
                if teleport_streak > MAX_CONSECUTIVE_TELEPORT_OVER {
                    continue;
                }

                let new_cost = current.cost.saturating_add(step);
                let slot = index(neighbor);
                if new_cost < cost_so_far[slot] {
                    cost_so_far[slot] = new_cost;
                    came_from[slot] = Some(current.position);
                    sequence += 1;
                    frontier.push(SearchNode {
                        position: neighbor,
                        cost: new_cost,
                        priority: f64::from(new_cost)
                            + self.heuristic_weight * heuristic(neighbor, goal),
                        teleport_streak,
                        sequence,
                    });
                }
            }
        }

        tracing::trace!(?start, ?goal, expanded, "frontier exhausted");
        None
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

/// Octile distance for 8-directional movement.
fn heuristic(a: Position, b: Position) -> f64 {
    let dx = f64::from(a.x.abs_diff(b.x));
    let dy = f64::from(a.y.abs_diff(b.y));
    dx + dy + (core::f64::consts::SQRT_2 - 2.0) * dx.min(dy)
}

/// Enterable neighbors, refusing diagonals that squeeze past a blocked corner.
fn neighbors(grid: &Grid, from: Position, can_teleport: bool) -> ArrayVec<Position, 8> {
    let mut out = ArrayVec::new();
    let blocked = |p: Position| grid.is_blocked_local(p, can_teleport);

    for (dx, dy) in DIRECTIONS {
        let next = from.offset(dx, dy);
        if blocked(next) {
            continue;
        }
        if dx != 0 && dy != 0 && (blocked(from.offset(dx, 0)) || blocked(from.offset(0, dy))) {
            continue;
        }
        out.push(next);
    }

    out
}

fn reconstruct(
    grid: &Grid,
    came_from: &[Option<Position>],
    index: impl Fn(Position) -> usize,
    start: Position,
    goal: Position,
) -> Path {
    let mut cells = Vec::new();
    let mut cursor = goal;

    while cursor != start {
        if grid.cell(cursor) != Some(CollisionType::TeleportOver) {
            cells.push(cursor);
        }
        match came_from[index(cursor)] {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    cells.push(start);
    cells.reverse();
    Path::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::RawCollisionMap;
    use CollisionType::{NonWalkable as X, Walkable as O};

    fn open_grid(width: usize, height: usize) -> Grid {
        Grid::build(RawCollisionMap::filled(width, height, O).unwrap(), 0, 0, false)
    }

    #[test]
    fn start_equal_to_goal_is_a_single_cell() {
        let grid = open_grid(4, 4);
        let path = find_path(&grid, Position::new(2, 2), Position::new(2, 2), false).unwrap();
        assert_eq!(path.cells(), &[Position::new(2, 2)]);
    }

    #[test]
    fn heuristic_matches_octile_distance() {
        let h = heuristic(Position::new(0, 0), Position::new(3, 3));
        assert!((h - 3.0 * core::f64::consts::SQRT_2).abs() < 1e-9);
        assert_eq!(heuristic(Position::new(0, 0), Position::new(5, 0)), 5.0);
    }

    #[test]
    fn diagonal_squeeze_is_refused() {
        let raw = RawCollisionMap::new(vec![vec![O, X], vec![X, O]]).unwrap();
        let grid = Grid::build(raw, 0, 0, false);
        assert!(find_path(&grid, Position::new(0, 0), Position::new(1, 1), false).is_none());
    }

    #[test]
    fn monsters_are_avoided_when_a_detour_is_cheap() {
        let mut raw = RawCollisionMap::filled(5, 3, O).unwrap();
        raw.set(Position::new(2, 1), CollisionType::Monster);
        let grid = Grid::build(raw, 0, 0, false);

        let path = find_path(&grid, Position::new(0, 1), Position::new(4, 1), false).unwrap();
        assert!(!path.cells().contains(&Position::new(2, 1)));
        assert_eq!(path.first(), Some(Position::new(0, 1)));
        assert_eq!(path.last(), Some(Position::new(4, 1)));
    }

    #[test]
    fn monsters_are_crossed_when_unavoidable() {
        let mut raw = RawCollisionMap::filled(5, 1, O).unwrap();
        raw.set(Position::new(2, 0), CollisionType::Monster);
        let grid = Grid::build(raw, 0, 0, false);

        let path = find_path(&grid, Position::new(0, 0), Position::new(4, 0), false).unwrap();
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn heavier_weight_still_reaches_the_goal() {
        let grid = open_grid(20, 20);
        let planner = Planner::with_heuristic_weight(2.0);
        let path = planner
            .find_path(&grid, Position::new(0, 0), Position::new(19, 7), false)
            .unwrap();
        assert_eq!(path.last(), Some(Position::new(19, 7)));
        assert_eq!(planner.heuristic_weight(), 2.0);
    }
}
