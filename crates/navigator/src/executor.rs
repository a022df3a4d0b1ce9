//! Movement executor: drives one movement toward a fixed point.
//!
//! Each iteration re-reads the world and walks through the same checks in a
//! fixed order:
//!
//! 1. arrival (with a doubled tolerance once the character is blocked)
//! 2. closed doors on the straight line, for walkers
//! 3. the caller's stationary band
//! 4. teleport cast pacing
//! 5. hostiles in the way, rate limited per navigator
//! 6. stationary time: remedies past the block threshold, `PlayerStuck` past the stuck threshold
//! 7. confinement around a reference point: `RoundTrip`
//! 8. movement skill selection
//! 9. (re)planning
//! 10. one move command toward the point a stride ahead, then a paced wait
//!
//! Command failures reported by the dispatcher are handled in place:
//! hostile and blocked signals drop the cached path, a missing path after
//! partial progress nudges and continues along the remaining route.
use std::fmt;
use std::sync::Arc;

use nav_core::{Grid, Position, line_of_sight};
use tokio::time::{Instant, sleep};

use crate::error::CommandError;
use crate::interaction::door_between;
use crate::navigator::Navigator;
use crate::outcome::{MoveContext, MoveError, MoveOutcome};
use crate::pacing::{remaining_cast, walk_duration};
use crate::state::NavigationState;
use crate::world::{Monster, MovementSkill, ObjectKind, WorldSnapshot};

pub type MonsterFilter = Arc<dyn Fn(&Monster) -> bool + Send + Sync>;

/// Per-call options for [`Navigator::move_to_point`].
#[derive(Clone, Default)]
pub struct MoveOptions {
    pub finish_distance: Option<u32>,
    /// Stop anywhere within `[min, max]` of the destination.
    pub stationary: Option<(u32, u32)>,
    pub ignore_monsters: bool,
    pub ignore_items: bool,
    /// Hostiles rejected by the filter never interrupt movement.
    pub monster_filter: Option<MonsterFilter>,
    pub clear_path_radius: Option<u32>,
}

impl MoveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finish_distance(mut self, distance: u32) -> Self {
        self.finish_distance = Some(distance);
        self
    }

    pub fn with_stationary_distance(mut self, min: u32, max: u32) -> Self {
        self.stationary = Some((min, max));
        self
    }

    pub fn ignoring_monsters(mut self) -> Self {
        self.ignore_monsters = true;
        self
    }

    pub fn ignoring_items(mut self) -> Self {
        self.ignore_items = true;
        self
    }

    pub fn with_monster_filter(
        mut self,
        filter: impl Fn(&Monster) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.monster_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_clear_path_radius(mut self, radius: u32) -> Self {
        self.clear_path_radius = Some(radius);
        self
    }

    fn accepts(&self, monster: &Monster) -> bool {
        self.monster_filter
            .as_ref()
            .is_none_or(|filter| filter(monster))
    }
}

impl fmt::Debug for MoveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveOptions")
            .field("finish_distance", &self.finish_distance)
            .field("stationary", &self.stationary)
            .field("ignore_monsters", &self.ignore_monsters)
            .field("ignore_items", &self.ignore_items)
            .field("monster_filter", &self.monster_filter.is_some())
            .field("clear_path_radius", &self.clear_path_radius)
            .finish()
    }
}

/// First hostile that must be dealt with before moving on.
pub fn blocking_monster<'w>(
    world: &'w WorldSnapshot,
    grid: &Grid,
    radius: u32,
    options: &MoveOptions,
) -> Option<&'w Monster> {
    let me = world.player.position;
    world.hostiles().find(|monster| {
        options.accepts(monster)
            && me.distance(monster.position) <= radius
            && line_of_sight(grid, me, monster.position)
            && door_between(world, me, monster.position).is_none()
    })
}

impl Navigator {
    /// Moves the character toward `destination` until it arrives or fails.
    pub async fn move_to_point(
        &mut self,
        destination: Position,
        options: &MoveOptions,
    ) -> MoveOutcome {
        let mut state = NavigationState::new(destination);
        let finish = options
            .finish_distance
            .unwrap_or(self.config.finish_distance);
        let clear_path_radius = options
            .clear_path_radius
            .unwrap_or(self.config.clear_path_radius);

        loop {
            let world = self.refresh(destination).await?;
            let can_teleport = self.can_teleport(&world);
            let grid = self.grid_for(&world, can_teleport).await?;
            let position = world.player.position;
            let distance = position.distance(destination);
            let context = MoveContext::from_world(&world, destination);

            let tolerance = if state.blocked {
                finish * self.config.blocked_finish_multiplier
            } else {
                finish
            };
            if distance <= tolerance {
                tracing::debug!(%context, distance, blocked = state.blocked, "arrived");
                return Ok(());
            }

            if !can_teleport {
                if let Some(door) = door_between(&world, position, destination) {
                    let id = door.id;
                    tracing::debug!(door = id, at = %door.position, "closed door on the way");
                    self.interact_until_done(id, ObjectKind::Door, destination)
                        .await?;
                    state.invalidate_path();
                    continue;
                }
            }

            if let Some((min, max)) = options.stationary {
                if (min..=max).contains(&distance) {
                    tracing::debug!(%context, distance, min, max, "within stationary band");
                    return Ok(());
                }
            }

            let now = Instant::now();
            if can_teleport {
                let cast = world.player.cast_duration;
                if let Some(wait) = remaining_cast(state.last_command, cast, now) {
                    sleep(wait).await;
                    continue;
                }
            }

            if !world.in_town
                && !options.ignore_monsters
                && clear_path_radius > 0
                && self.monster_check_due(now)
            {
                if let Some(monster) = blocking_monster(&world, &grid, clear_path_radius, options) {
                    tracing::debug!(
                        monster = monster.id,
                        at = %monster.position,
                        "monster in path"
                    );
                    return Err(MoveError::MonstersInPath { context });
                }
            }

            if world.player.is_disabled() {
                state.reset_stationary();
            } else {
                let stationary = state.observe_position(position, now);
                if stationary > self.config.stuck_threshold {
                    tracing::debug!(%context, ?stationary, "player stuck");
                    return Err(MoveError::PlayerStuck { context });
                }
                if stationary > self.config.block_threshold {
                    state.blocked = true;
                    if state.remedy_due(self.config.block_threshold, now) {
                        self.clear_obstacle(&world, destination).await;
                        continue;
                    }
                }
            }

            let confined = state.observe_round_trip(position, self.config.round_trip_radius, now);
            if confined > self.config.round_trip_threshold {
                tracing::debug!(%context, ?confined, "round trip detected");
                return Err(MoveError::RoundTrip { context });
            }
            if confined > self.config.round_trip_threshold / 2 {
                state.blocked = true;
            }

            self.select_movement_skill(&world, can_teleport).await?;

            let stride = self.config.stride(can_teleport);
            if let Some(path) = state.path.as_mut() {
                path.resume_from(position);
            }
            let stale = state.path.as_ref().is_none_or(|path| {
                path.len() <= 1
                    || path
                        .first()
                        .is_none_or(|head| head.distance(position) as usize > stride)
            });
            if stale {
                self.stats.step_plans += 1;
                match self.plan(&grid, position, destination, can_teleport) {
                    Some(path) => state.path = Some(path),
                    None => {
                        if distance < finish + self.config.no_path_slack {
                            tracing::debug!(%context, distance, "no path but close enough");
                            return Ok(());
                        }
                        tracing::debug!(%context, "path could not be calculated");
                        return Err(MoveError::NoPath { context });
                    }
                }
            }

            let Some((index, next)) = state
                .path
                .as_ref()
                .filter(|path| path.len() > 1)
                .and_then(|path| path.stride_target(stride))
            else {
                tracing::debug!(%context, "planner reports arrival");
                return Ok(());
            };

            let pause = walk_duration(
                if world.in_town {
                    self.config.town_pacing
                } else {
                    self.config.field_pacing
                },
                world.latency,
                &mut self.rng,
            );

            self.stats.move_commands += 1;
            state.last_command = Some(Instant::now());
            match self.collaborators.input.move_toward(next).await {
                Ok(()) => sleep(pause).await,
                Err(CommandError::MonstersInPath | CommandError::Blocked) => {
                    state.invalidate_path();
                    sleep(pause).await;
                }
                Err(CommandError::NoPath) if index > 0 => {
                    self.nudge(position).await;
                    if let Some(path) = state.path.as_mut() {
                        path.advance(index);
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn monster_check_due(&mut self, now: Instant) -> bool {
        let due = self.last_monster_check.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.config.monster_check_interval
        });
        if due {
            self.last_monster_check = Some(now);
        }
        due
    }

    async fn select_movement_skill(
        &mut self,
        world: &WorldSnapshot,
        can_teleport: bool,
    ) -> Result<(), MoveError> {
        let wanted = if can_teleport {
            MovementSkill::Teleport
        } else {
            MovementSkill::Speed
        };
        if world.player.active_skill == Some(wanted) {
            return Ok(());
        }
        let Some(binding) = self.collaborators.capabilities.binding_for(wanted) else {
            return Ok(());
        };
        tracing::trace!(skill = %wanted, "switching movement skill");
        self.collaborators.input.press_binding(binding).await?;
        Ok(())
    }
}
