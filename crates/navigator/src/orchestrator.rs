//! Goal-directed navigation: retargeting, side goals and maintenance around
//! the executor.
//!
//! Every iteration asks the [`TargetProvider`] for the base destination,
//! optionally swaps in a side goal (shrine or chest), and sends the executor
//! one stride along the cached route. Routes to the base destination and to
//! the active side goal are cached separately, so finishing a detour picks
//! the base route up again where the character rejoins it. Failures that end
//! the call report the base destination in their context, not the leg's.
use nav_core::Position;
use tokio::time::Instant;

use crate::executor::MoveOptions;
use crate::navigator::Navigator;
use crate::outcome::{MoveContext, MoveError, MoveOutcome};
use crate::side_goal::{SideGoal, SideGoalKind, find_side_goal};
use crate::state::RouteCache;
use crate::target::TargetProvider;
use crate::world::WorldSnapshot;

/// Orchestrator bookkeeping for one `move_to` call.
#[derive(Debug, Default)]
struct Journey {
    base: Option<RouteCache>,
    detour: Option<RouteCache>,
    side_goal: Option<SideGoal>,
    /// Consecutive `PlayerStuck` retries and where the first one happened.
    stuck_retries: u32,
    stuck_at: Option<Position>,
    /// Base destination of the previous iteration, for failure contexts.
    last_base: Option<Position>,
    /// Base route must be resumed from the current position.
    rejoin: bool,
    /// Target the executor reported as reached.
    reached: Option<Position>,
}

impl Journey {
    fn cache_mut(&mut self, detour: bool) -> &mut Option<RouteCache> {
        if detour { &mut self.detour } else { &mut self.base }
    }

    fn clear_side_goal(&mut self) {
        self.side_goal = None;
        self.detour = None;
        self.rejoin = true;
    }
}

impl Navigator {
    /// Follows `provider` until it returns `None` or its destination is reached.
    pub async fn move_to<P>(&mut self, provider: &mut P) -> MoveOutcome
    where
        P: TargetProvider + ?Sized,
    {
        self.move_to_with(provider, &MoveOptions::default()).await
    }

    /// [`Navigator::move_to`] with options applied to every executor leg.
    ///
    /// `ignore_items` also suppresses looting during maintenance.
    pub async fn move_to_with<P>(
        &mut self,
        provider: &mut P,
        options: &MoveOptions,
    ) -> MoveOutcome
    where
        P: TargetProvider + ?Sized,
    {
        let mut journey = Journey::default();
        let finish = options
            .finish_distance
            .unwrap_or(self.config.finish_distance);

        loop {
            let previous_base = journey.last_base.unwrap_or(Position::ORIGIN);
            let world = self.refresh(previous_base).await?;
            let Some(base) = provider.next_target(&world) else {
                tracing::debug!("target provider finished");
                return Ok(());
            };
            journey.last_base = Some(base);

            let can_teleport = self.can_teleport(&world);
            let grid = self.grid_for(&world, can_teleport).await?;
            let position = world.player.position;
            if journey
                .stuck_at
                .is_some_and(|stuck| stuck.distance(position) > finish)
            {
                journey.stuck_retries = 0;
                journey.stuck_at = None;
            }

            if !world.in_town {
                self.run_maintenance(&world, options, false).await;
                if journey.side_goal.is_none() {
                    journey.side_goal = find_side_goal(
                        &world,
                        &self.config,
                        &mut self.unreachable,
                        Instant::now(),
                    );
                    if let Some(goal) = journey.side_goal {
                        tracing::debug!(
                            object = goal.object,
                            at = %goal.position,
                            from = %base,
                            "redirecting to side goal"
                        );
                    }
                }
            }

            let side_goal = journey.side_goal;
            let on_detour = side_goal.is_some();
            let target = side_goal.map_or(base, |goal| goal.position);
            let context = MoveContext::from_world(&world, target);

            let reached = journey.reached.take() == Some(target);
            if reached || position.distance(target) <= finish {
                match side_goal {
                    Some(goal) => {
                        self.complete_side_goal(goal, &world, base, options).await?;
                        journey.clear_side_goal();
                        continue;
                    }
                    None => {
                        tracing::debug!(%context, "destination reached");
                        return Ok(());
                    }
                }
            }

            let cached = journey
                .cache_mut(on_detour)
                .as_ref()
                .is_some_and(|cache| cache.targets(target));
            if !cached {
                self.stats.route_plans += 1;
                match self.plan(&grid, position, target, can_teleport) {
                    Some(path) => {
                        *journey.cache_mut(on_detour) = Some(RouteCache::new(target, path));
                    }
                    None => {
                        if let Some(goal) = side_goal {
                            tracing::warn!(
                                at = %goal.position,
                                "side goal unreachable, skipping it for a while"
                            );
                            self.unreachable.mark(goal.position, Instant::now());
                            journey.clear_side_goal();
                            continue;
                        }
                        tracing::debug!(%context, "path could not be calculated");
                        return Err(MoveError::NoPath { context });
                    }
                }
            } else if !on_detour && journey.rejoin {
                if let Some(cache) = journey.base.as_mut() {
                    cache.path.resume_from(position);
                }
            }
            if !on_detour {
                journey.rejoin = false;
            }

            let (step, next) = if world.in_town {
                (0, target)
            } else {
                let stride = self.config.stride(can_teleport);
                journey
                    .cache_mut(on_detour)
                    .as_ref()
                    .and_then(|cache| cache.path.stride_target(stride))
                    .unwrap_or((0, target))
            };

            match self.move_to_point(next, options).await {
                Ok(()) => {
                    if next == target {
                        journey.reached = Some(target);
                        continue;
                    }
                    if let Some(cache) = journey.cache_mut(on_detour).as_mut() {
                        cache.path.advance(step);
                    }
                }
                Err(MoveError::MonstersInPath { context }) => {
                    tracing::debug!(%context, "monsters in path, engaging");
                    *journey.cache_mut(on_detour) = None;
                    let world = self.refresh(base).await?;
                    self.run_maintenance(&world, options, true).await;
                }
                Err(MoveError::PlayerStuck { context })
                    if journey.stuck_retries < self.config.stuck_retries =>
                {
                    journey.stuck_retries += 1;
                    journey.stuck_at.get_or_insert(context.position);
                    tracing::debug!(%context, retry = journey.stuck_retries, "stuck, nudging");
                    *journey.cache_mut(on_detour) = None;
                    self.nudge(position).await;
                }
                Err(MoveError::NoPath { context }) if step > 0 => {
                    tracing::debug!(%context, "leg unreachable, nudging past it");
                    self.nudge(position).await;
                    if let Some(cache) = journey.cache_mut(on_detour).as_mut() {
                        cache.path.advance(step);
                    }
                }
                Err(err) => return Err(err.with_destination(base)),
            }
        }
    }

    async fn complete_side_goal(
        &mut self,
        goal: SideGoal,
        world: &WorldSnapshot,
        base: Position,
        options: &MoveOptions,
    ) -> Result<(), MoveError> {
        tracing::debug!(object = goal.object, at = %goal.position, "side goal reached");
        match self
            .interact_until_done(goal.object, goal.object_kind(), base)
            .await
        {
            Ok(()) => {}
            Err(err) if err.is_death() => return Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "side goal interaction failed");
                self.unreachable.mark(goal.position, Instant::now());
            }
        }

        if goal.kind == SideGoalKind::Chest && !options.ignore_items {
            if let Err(err) = self
                .collaborators
                .loot
                .pick_up_around(self.config.loot_radius)
                .await
            {
                tracing::warn!(
                    error = %err,
                    at = %world.player.position,
                    "picking up chest contents failed"
                );
            }
        }
        Ok(())
    }
}
