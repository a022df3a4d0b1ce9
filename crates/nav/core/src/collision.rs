//! Per-tile passability classes and the search costs attached to them.

/// Canonical passability class of a single map tile.
///
/// `LowPriority` and `Thickened` are never read from raw map data; the grid
/// builder derives them (see [`crate::grid`]).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum CollisionType {
    #[default]
    NonWalkable,
    Walkable,
    /// Walkable, but close to a wall. Searched at a heavy penalty.
    LowPriority,
    Monster,
    /// Soft blocker such as destructible terrain.
    Object,
    /// Only crossable by a teleporting mover.
    TeleportOver,
    /// Narrow passage closed for walkers by the thickening pass.
    Thickened,
}

impl CollisionType {
    /// Cost of stepping onto a Walkable tile.
    pub const WALKABLE_COST: u32 = 1;
    pub const OBJECT_COST: u32 = 4;
    pub const MONSTER_COST: u32 = 16;
    pub const LOW_PRIORITY_COST: u32 = 20;
    pub const TELEPORT_COST: u32 = 1;

    /// Ground walkability, ignoring any teleport capability.
    pub const fn is_ground_walkable(self) -> bool {
        !matches!(self, CollisionType::NonWalkable | CollisionType::TeleportOver)
    }

    /// Whether the tile may not be entered by the given mover.
    pub const fn blocks(self, can_teleport: bool) -> bool {
        match self {
            CollisionType::NonWalkable => true,
            CollisionType::TeleportOver | CollisionType::Thickened => !can_teleport,
            _ => false,
        }
    }

    /// Cost of stepping onto this tile, `None` when it is impassable.
    pub const fn step_cost(self, can_teleport: bool) -> Option<u32> {
        match self {
            CollisionType::Walkable => Some(Self::WALKABLE_COST),
            CollisionType::Object => Some(Self::OBJECT_COST),
            CollisionType::Monster => Some(Self::MONSTER_COST),
            CollisionType::LowPriority => Some(Self::LOW_PRIORITY_COST),
            CollisionType::TeleportOver | CollisionType::Thickened if can_teleport => {
                Some(Self::TELEPORT_COST)
            }
            _ => None,
        }
    }

    /// Tiles that make their surroundings unattractive to walk along.
    pub const fn repels_neighbors(self, can_teleport: bool) -> bool {
        match self {
            CollisionType::NonWalkable => true,
            CollisionType::TeleportOver => !can_teleport,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn impassable_tiles_have_no_cost() {
        for kind in CollisionType::iter() {
            assert_eq!(
                kind.blocks(false),
                kind.step_cost(false).is_none(),
                "{kind} walker cost/block mismatch"
            );
            assert_eq!(
                kind.blocks(true),
                kind.step_cost(true).is_none(),
                "{kind} teleporter cost/block mismatch"
            );
        }
    }

    #[test]
    fn teleport_only_tiles_open_up_for_teleporters() {
        assert_eq!(CollisionType::TeleportOver.step_cost(true), Some(1));
        assert_eq!(CollisionType::Thickened.step_cost(true), Some(1));
        assert!(CollisionType::TeleportOver.blocks(false));
        assert!(CollisionType::Thickened.blocks(false));
        assert!(CollisionType::Thickened.is_ground_walkable());
    }

    #[test]
    fn wall_penalty_outweighs_soft_blockers() {
        let low = CollisionType::LowPriority.step_cost(false);
        let monster = CollisionType::Monster.step_cost(false);
        let object = CollisionType::Object.step_cost(false);
        assert!(low > monster && monster > object);
    }
}
