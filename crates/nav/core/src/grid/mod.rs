//! Collision grid construction and queries.
//!
//! Construction is split into two phases:
//!
//! 1. **Ingestion**: [`RawCollisionMap`] validates and copies the raw
//!    classification read from the game.
//! 2. **Derivation**: [`GridBuilder`] runs the pure passes from [`passes`]
//!    (optional thickening and exit drilling, then softening) and freezes the
//!    result into an immutable [`Grid`].
//!
//! A grid is built once per loaded map region. Callers that need a snapshot
//! they can hand to another owner use `Clone`, which is a full deep copy.
pub mod passes;
mod raw;

pub use raw::{GridError, RawCollisionMap};

use crate::collision::CollisionType;
use crate::position::Position;

/// Immutable, weighted collision grid for one map region.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    offset: Position,
    cells: RawCollisionMap,
}

impl Grid {
    /// Builds a grid with the default derivation (softening only).
    pub fn build(raw: RawCollisionMap, offset_x: i32, offset_y: i32, can_teleport: bool) -> Self {
        GridBuilder::new(raw)
            .offset(Position::new(offset_x, offset_y))
            .can_teleport(can_teleport)
            .build()
    }

    /// World position of the grid's local origin.
    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn width(&self) -> i32 {
        self.cells.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.cells.height() as i32
    }

    /// Translates a world position into grid-local coordinates.
    pub fn to_local(&self, world: Position) -> Position {
        Position::new(world.x - self.offset.x, world.y - self.offset.y)
    }

    /// Translates a grid-local position into world coordinates.
    pub fn to_world(&self, local: Position) -> Position {
        Position::new(local.x + self.offset.x, local.y + self.offset.y)
    }

    pub fn contains_local(&self, local: Position) -> bool {
        self.cells.contains(local)
    }

    /// Classification of a grid-local tile.
    pub fn cell(&self, local: Position) -> Option<CollisionType> {
        self.cells.get(local)
    }

    /// Classification of a world tile.
    pub fn cell_at(&self, world: Position) -> Option<CollisionType> {
        self.cell(self.to_local(world))
    }

    /// Ground walkability of a world tile; teleport eligibility is not considered.
    pub fn is_walkable(&self, world: Position) -> bool {
        self.cell_at(world)
            .is_some_and(CollisionType::is_ground_walkable)
    }

    /// Whether the given mover may enter a grid-local tile.
    pub fn is_blocked_local(&self, local: Position, can_teleport: bool) -> bool {
        self.cell(local).is_none_or(|kind| kind.blocks(can_teleport))
    }

    /// Raw row-major cell storage.
    pub fn cells(&self) -> &[CollisionType] {
        self.cells.cells()
    }
}

/// Derivation-phase builder for [`Grid`].
#[derive(Clone, Debug)]
pub struct GridBuilder {
    raw: RawCollisionMap,
    offset: Position,
    can_teleport: bool,
    thicken: bool,
    exits: Vec<Position>,
}

impl GridBuilder {
    pub fn new(raw: RawCollisionMap) -> Self {
        Self {
            raw,
            offset: Position::ORIGIN,
            can_teleport: false,
            thicken: false,
            exits: Vec::new(),
        }
    }

    pub fn offset(mut self, offset: Position) -> Self {
        self.offset = offset;
        self
    }

    /// Teleporters are not repelled by TeleportOver tiles during softening.
    pub fn can_teleport(mut self, can_teleport: bool) -> Self {
        self.can_teleport = can_teleport;
        self
    }

    /// Close one-tile passages and diagonal gaps for walkers.
    pub fn thicken_narrow_passages(mut self) -> Self {
        self.thicken = true;
        self
    }

    /// Keep these world positions (and their 3x3 neighborhood) walkable.
    pub fn drill_exits(mut self, exits: impl IntoIterator<Item = Position>) -> Self {
        self.exits.extend(exits);
        self
    }

    pub fn build(self) -> Grid {
        let offset = self.offset;
        let mut cells = self.raw;

        if self.thicken {
            cells = passes::thicken_narrow_passages(&cells);
        }
        if !self.exits.is_empty() {
            let local: Vec<Position> = self
                .exits
                .iter()
                .map(|p| Position::new(p.x - offset.x, p.y - offset.y))
                .collect();
            cells = passes::drill_exits(&cells, &local);
        }

        Grid {
            offset,
            cells: passes::soften(&cells, self.can_teleport),
        }
    }
}
