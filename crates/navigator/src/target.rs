//! Target providers: "where should the character go now?"
//!
//! The orchestrator asks its provider once per iteration. Returning `None`
//! ends the movement successfully, so a provider can express both moving
//! goals (follow an entity) and completion conditions (the entity is gone).
use nav_core::Position;

use crate::world::{EntityId, WorldSnapshot};

pub trait TargetProvider {
    fn next_target(&mut self, world: &WorldSnapshot) -> Option<Position>;
}

impl<F> TargetProvider for F
where
    F: FnMut(&WorldSnapshot) -> Option<Position>,
{
    fn next_target(&mut self, world: &WorldSnapshot) -> Option<Position> {
        self(world)
    }
}

/// A fixed point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticTarget(pub Position);

impl TargetProvider for StaticTarget {
    fn next_target(&mut self, _world: &WorldSnapshot) -> Option<Position> {
        Some(self.0)
    }
}

/// The candidate closest to the character, re-evaluated every iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NearestOf {
    candidates: Vec<Position>,
}

impl NearestOf {
    pub fn new(candidates: impl IntoIterator<Item = Position>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }
}

impl TargetProvider for NearestOf {
    fn next_target(&mut self, world: &WorldSnapshot) -> Option<Position> {
        let me = world.player.position;
        self.candidates
            .iter()
            .copied()
            .min_by_key(|candidate| candidate.distance_squared(me))
    }
}

/// A monster's current position; ends once it is gone or dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FollowEntity {
    id: EntityId,
}

impl FollowEntity {
    pub fn new(id: EntityId) -> Self {
        Self { id }
    }
}

impl TargetProvider for FollowEntity {
    fn next_target(&mut self, world: &WorldSnapshot) -> Option<Position> {
        world
            .monster(self.id)
            .filter(|monster| monster.is_alive())
            .map(|monster| monster.position)
    }
}

/// Visits a detour point first, then defers to the wrapped provider.
#[derive(Clone, Debug)]
pub struct WithSideGoal<P> {
    detour: Option<Position>,
    arrival_distance: u32,
    inner: P,
}

impl<P: TargetProvider> WithSideGoal<P> {
    pub fn new(detour: Position, arrival_distance: u32, inner: P) -> Self {
        Self {
            detour: Some(detour),
            arrival_distance,
            inner,
        }
    }

    pub fn detour_pending(&self) -> bool {
        self.detour.is_some()
    }
}

impl<P: TargetProvider> TargetProvider for WithSideGoal<P> {
    fn next_target(&mut self, world: &WorldSnapshot) -> Option<Position> {
        if let Some(detour) = self.detour {
            if world.distance_from_player(detour) > self.arrival_distance {
                return Some(detour);
            }
            tracing::debug!(%detour, "side goal reached, resuming");
            self.detour = None;
        }
        self.inner.next_target(world)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::world::{Monster, PlayerState};

    fn world_at(position: Position) -> WorldSnapshot {
        WorldSnapshot {
            area: 1,
            in_town: false,
            player: PlayerState::new(position),
            monsters: vec![Monster {
                id: 9,
                position: Position::new(30, 30),
                hp: 10,
                hostile: true,
            }],
            objects: Vec::new(),
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn nearest_of_tracks_the_player() {
        let mut provider = NearestOf::new([Position::new(0, 0), Position::new(100, 0)]);
        assert_eq!(
            provider.next_target(&world_at(Position::new(10, 0))),
            Some(Position::new(0, 0))
        );
        assert_eq!(
            provider.next_target(&world_at(Position::new(90, 0))),
            Some(Position::new(100, 0))
        );
        assert_eq!(NearestOf::new([]).next_target(&world_at(Position::ORIGIN)), None);
    }

    #[test]
    fn follow_stops_when_entity_dies() {
        let mut provider = FollowEntity::new(9);
        let mut world = world_at(Position::ORIGIN);
        assert_eq!(provider.next_target(&world), Some(Position::new(30, 30)));
        world.monsters[0].hp = 0;
        assert_eq!(provider.next_target(&world), None);
    }

    #[test]
    fn side_goal_wrapper_detours_once() {
        let mut provider =
            WithSideGoal::new(Position::new(5, 0), 2, StaticTarget(Position::new(50, 0)));
        assert_eq!(
            provider.next_target(&world_at(Position::ORIGIN)),
            Some(Position::new(5, 0))
        );
        assert_eq!(
            provider.next_target(&world_at(Position::new(4, 0))),
            Some(Position::new(50, 0))
        );
        assert!(!provider.detour_pending());
        assert_eq!(
            provider.next_target(&world_at(Position::ORIGIN)),
            Some(Position::new(50, 0))
        );
    }

    #[test]
    fn closures_are_providers() {
        let mut calls = 0;
        let mut provider = |_: &WorldSnapshot| {
            calls += 1;
            (calls < 3).then_some(Position::new(1, 1))
        };
        let world = world_at(Position::ORIGIN);
        assert!(provider.next_target(&world).is_some());
        assert!(provider.next_target(&world).is_some());
        assert!(provider.next_target(&world).is_none());
    }
}
