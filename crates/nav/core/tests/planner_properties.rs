use nav_core::grid::passes::SOFT_BUFFER_RADIUS;
use nav_core::{
    CollisionType, Grid, GridBuilder, MAX_CONSECUTIVE_TELEPORT_OVER, Position, RawCollisionMap,
    find_path,
};

use CollisionType::{NonWalkable as X, TeleportOver as T, Walkable as O};

fn open(width: usize, height: usize) -> RawCollisionMap {
    RawCollisionMap::filled(width, height, O).unwrap()
}

/// One row: walkable, `gap` void tiles, walkable.
fn void_strip(gap: usize) -> RawCollisionMap {
    let mut row = vec![O];
    row.extend(std::iter::repeat_n(T, gap));
    row.push(O);
    RawCollisionMap::new(vec![row]).unwrap()
}

/// Deterministic maze-ish map with scattered walls and monsters.
fn cluttered(width: usize, height: usize) -> RawCollisionMap {
    let mut raw = open(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let h = (x * 31 + y * 17) % 11;
            let kind = match h {
                0 => X,
                5 => CollisionType::Monster,
                7 => CollisionType::Object,
                _ => continue,
            };
            raw.set(Position::new(x, y), kind);
        }
    }
    raw.set(Position::new(0, 0), O);
    raw.set(Position::new(width as i32 - 1, height as i32 - 1), O);
    raw
}

#[test]
fn open_field_diagonal_is_optimal() {
    let grid = Grid::build(open(10, 10), 0, 0, false);
    let goal = Position::new(9, 9);
    let path = find_path(&grid, Position::new(0, 0), goal, false).unwrap();

    assert_eq!(path.len(), 10);
    let distances: Vec<u32> = path
        .cells()
        .iter()
        .map(|c| c.chebyshev_distance(goal))
        .collect();
    assert!(distances.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn consecutive_cells_are_adjacent_for_walkers() {
    let grid = Grid::build(cluttered(30, 20), 0, 0, false);
    let path = find_path(&grid, Position::new(0, 0), Position::new(29, 19), false).unwrap();

    assert_eq!(path.first(), Some(Position::new(0, 0)));
    assert_eq!(path.last(), Some(Position::new(29, 19)));
    assert!(path.cells().windows(2).all(|w| w[0].is_adjacent(w[1])));
}

#[test]
fn paths_never_cut_blocked_corners() {
    let grid = Grid::build(cluttered(30, 20), 0, 0, false);
    let path = find_path(&grid, Position::new(0, 0), Position::new(29, 19), false).unwrap();

    for w in path.cells().windows(2) {
        let (a, b) = (w[0], w[1]);
        if a.x != b.x && a.y != b.y {
            assert!(!grid.is_blocked_local(Position::new(b.x, a.y), false));
            assert!(!grid.is_blocked_local(Position::new(a.x, b.y), false));
        }
    }
}

#[test]
fn teleport_streak_is_capped() {
    let cap = MAX_CONSECUTIVE_TELEPORT_OVER as usize;

    let crossable = Grid::build(void_strip(cap), 0, 0, true);
    let goal = Position::new(cap as i32 + 1, 0);
    let path = find_path(&crossable, Position::ORIGIN, goal, true).unwrap();
    assert_eq!(path.cells(), &[Position::ORIGIN, goal]);

    let too_wide = Grid::build(void_strip(cap + 1), 0, 0, true);
    let goal = Position::new(cap as i32 + 2, 0);
    assert!(find_path(&too_wide, Position::ORIGIN, goal, true).is_none());
}

#[test]
fn walkers_cannot_cross_voids() {
    let grid = Grid::build(void_strip(2), 0, 0, false);
    assert!(find_path(&grid, Position::ORIGIN, Position::new(3, 0), false).is_none());
}

#[test]
fn enclosed_goal_is_unreachable() {
    let mut raw = open(9, 9);
    raw.fill_rect(Position::new(3, 3), Position::new(5, 5), X);
    raw.set(Position::new(4, 4), O);
    let grid = Grid::build(raw, 0, 0, false);

    assert!(find_path(&grid, Position::ORIGIN, Position::new(4, 4), false).is_none());
}

#[test]
fn out_of_bounds_endpoints_yield_none() {
    let grid = Grid::build(open(5, 5), 0, 0, false);
    assert!(find_path(&grid, Position::new(-1, 0), Position::new(2, 2), false).is_none());
    assert!(find_path(&grid, Position::new(0, 0), Position::new(5, 2), false).is_none());
}

#[test]
fn search_is_deterministic() {
    let grid = Grid::build(cluttered(40, 40), 0, 0, false);
    let start = Position::new(0, 0);
    let goal = Position::new(39, 39);
    let first = find_path(&grid, start, goal, false);
    assert!(first.is_some());
    for _ in 0..5 {
        assert_eq!(find_path(&grid, start, goal, false), first);
    }
}

#[test]
fn softened_grid_keeps_walkable_tiles_away_from_walls() {
    let grid = GridBuilder::new(cluttered(25, 25)).build();
    let width = grid.width();
    let height = grid.height();

    for y in 0..height {
        for x in 0..width {
            let p = Position::new(x, y);
            if grid.cell(p) != Some(O) {
                continue;
            }
            for dy in -SOFT_BUFFER_RADIUS..=SOFT_BUFFER_RADIUS {
                for dx in -SOFT_BUFFER_RADIUS..=SOFT_BUFFER_RADIUS {
                    assert_ne!(grid.cell(p.offset(dx, dy)), Some(X), "{p} is too close to a wall");
                }
            }
        }
    }
}

#[test]
fn world_offset_round_trips_through_the_planner() {
    let grid = Grid::build(open(6, 6), 1000, 2000, false);
    let start = grid.to_local(Position::new(1000, 2000));
    let goal = grid.to_local(Position::new(1005, 2003));
    let path = find_path(&grid, start, goal, false)
        .unwrap()
        .translated(grid.offset());

    assert_eq!(path.first(), Some(Position::new(1000, 2000)));
    assert_eq!(path.last(), Some(Position::new(1005, 2003)));
}
