//! Deterministic navigation primitives shared by the navigator and its tools.
//!
//! `nav-core` owns the collision model and the path search. Everything here is
//! pure and synchronous: grids are built once per loaded map region and never
//! mutated afterwards, and the planner only reads them.
//!
//! - [`grid`] turns a raw per-tile classification into a weighted [`Grid`]
//! - [`planner`] runs weighted A* over a grid and returns a [`Path`]
//! - [`geometry`] provides distance and line-of-sight helpers
pub mod collision;
pub mod geometry;
pub mod grid;
pub mod planner;
pub mod position;

pub use collision::CollisionType;
pub use geometry::{line_of_sight, segment_cells};
pub use grid::{Grid, GridBuilder, GridError, RawCollisionMap};
pub use planner::{
    DEFAULT_HEURISTIC_WEIGHT, MAX_CONSECUTIVE_TELEPORT_OVER, Path, Planner, find_path,
};
pub use position::Position;
