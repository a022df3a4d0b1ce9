//! Object interaction: doors on the way, obstacles when blocked, side goals on arrival.
use nav_core::{Position, segment_cells};
use tokio::time::sleep;

use crate::navigator::Navigator;
use crate::outcome::{MoveContext, MoveError};
use crate::pacing::scale_for_latency;
use crate::world::{EntityId, ObjectKind, WorldObject, WorldSnapshot};

/// Closed door ahead on the straight line between two positions.
///
/// Doors span more than one tile, so a door within one tile of the segment
/// counts as intersecting it. Only doors closer to `to` than `from` is are
/// considered; the mover's own tile is not part of the segment.
pub fn door_between(world: &WorldSnapshot, from: Position, to: Position) -> Option<&WorldObject> {
    let remaining = from.distance_squared(to);
    let doors: Vec<&WorldObject> = world
        .objects
        .iter()
        .filter(|object| object.is_closed_door())
        .filter(|door| door.position.distance_squared(to) < remaining)
        .collect();
    if doors.is_empty() {
        return None;
    }

    segment_cells(from, to).into_iter().skip(1).find_map(|cell| {
        doors
            .iter()
            .copied()
            .find(|door| door.position.chebyshev_distance(cell) <= 1)
    })
}

/// Nearest selectable object of `kind` within `radius` of `from`.
pub fn nearest_selectable(
    world: &WorldSnapshot,
    kind: ObjectKind,
    from: Position,
    radius: u32,
) -> Option<&WorldObject> {
    world
        .objects
        .iter()
        .filter(|object| object.kind == kind && object.selectable)
        .filter(|object| object.position.distance(from) <= radius)
        .min_by_key(|object| (object.position.distance_squared(from), object.id))
}

impl Navigator {
    /// Interacts with `object` until it is gone or no longer selectable.
    ///
    /// Between attempts the character is nudged, which frees the classic
    /// case of a door that will not open while the character stands on it.
    pub(crate) async fn interact_until_done(
        &mut self,
        object: EntityId,
        kind: ObjectKind,
        destination: Position,
    ) -> Result<(), MoveError> {
        let attempts = self.config.interaction_attempts.max(1);

        for attempt in 0..attempts {
            let world = self.refresh(destination).await?;
            if is_done(&world, object) {
                tracing::debug!(object, %kind, attempt, "interaction completed");
                return Ok(());
            }
            if attempt > 0 {
                self.nudge(world.player.position).await;
            }

            if let Err(err) = self.collaborators.input.interact(object).await {
                tracing::warn!(object, %kind, error = %err, "interaction command failed");
            }
            self.stats.interactions += 1;
            sleep(scale_for_latency(self.config.interaction_cooldown, world.latency)).await;
        }

        let world = self.refresh(destination).await?;
        if is_done(&world, object) {
            return Ok(());
        }
        Err(MoveError::InteractionFailed {
            object,
            kind,
            attempts,
            context: MoveContext::from_world(&world, destination),
        })
    }

    /// Tries one quick fix when the character stops moving: break the nearest
    /// destructible, else open the nearest door.
    pub(crate) async fn clear_obstacle(&mut self, world: &WorldSnapshot, destination: Position) {
        let position = world.player.position;
        let radius = self.config.finish_distance * 2;

        let destructible = nearest_selectable(world, ObjectKind::Destructible, position, radius);
        if let Some(obstacle) = destructible {
            tracing::debug!(object = obstacle.id, at = %obstacle.position, "hitting obstacle");
            if let Err(err) = self.collaborators.input.interact(obstacle.id).await {
                tracing::warn!(object = obstacle.id, error = %err, "obstacle interaction failed");
            }
            self.stats.interactions += 1;
            sleep(scale_for_latency(self.config.interaction_cooldown / 2, world.latency)).await;
            return;
        }

        if let Some(door) = nearest_selectable(world, ObjectKind::Door, position, radius) {
            let id = door.id;
            if let Err(err) = self.interact_until_done(id, ObjectKind::Door, destination).await {
                if err.is_death() {
                    return;
                }
                tracing::warn!(error = %err, "could not open nearby door");
            }
        }
    }
}

fn is_done(world: &WorldSnapshot, object: EntityId) -> bool {
    world.object(object).is_none_or(|found| !found.selectable)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::world::PlayerState;

    fn object(id: EntityId, kind: ObjectKind, x: i32, y: i32) -> WorldObject {
        WorldObject {
            id,
            kind,
            position: Position::new(x, y),
            selectable: true,
        }
    }

    fn world(objects: Vec<WorldObject>) -> WorldSnapshot {
        WorldSnapshot {
            area: 1,
            in_town: false,
            player: PlayerState::new(Position::ORIGIN),
            monsters: Vec::new(),
            objects,
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn doors_near_the_segment_are_found() {
        let mut w = world(vec![
            object(1, ObjectKind::Door, 10, 1),
            object(2, ObjectKind::Door, 5, 6),
        ]);
        let found = door_between(&w, Position::ORIGIN, Position::new(20, 0));
        assert_eq!(found.map(|d| d.id), Some(1));

        w.objects[0].selectable = false;
        assert!(door_between(&w, Position::ORIGIN, Position::new(20, 0)).is_none());
    }

    #[test]
    fn doors_behind_or_beside_the_mover_are_ignored() {
        let from = Position::new(5, 5);
        let to = Position::new(30, 5);
        let behind = world(vec![object(1, ObjectKind::Door, 4, 5)]);
        assert!(door_between(&behind, from, to).is_none());

        let beside = world(vec![object(2, ObjectKind::Door, 5, 6)]);
        assert!(door_between(&beside, from, to).is_none());

        let ahead = world(vec![object(3, ObjectKind::Door, 6, 6)]);
        assert_eq!(door_between(&ahead, from, to).map(|d| d.id), Some(3));
    }

    #[test]
    fn nearest_selectable_respects_kind_and_radius() {
        let w = world(vec![
            object(1, ObjectKind::Destructible, 6, 0),
            object(2, ObjectKind::Destructible, 2, 2),
            object(3, ObjectKind::Chest, 1, 0),
        ]);
        let found = nearest_selectable(&w, ObjectKind::Destructible, Position::ORIGIN, 10);
        assert_eq!(found.map(|o| o.id), Some(2));
        assert!(nearest_selectable(&w, ObjectKind::Destructible, Position::ORIGIN, 1).is_none());
    }
}
