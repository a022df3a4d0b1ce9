//! The per-character [`Navigator`] and the helpers shared by its entry points.
//!
//! Entry points live next to the behavior they implement:
//! [`Navigator::move_to_point`] in `executor`, [`Navigator::move_to`] in
//! `orchestrator`. This module owns the state that outlives a single call:
//! the grid cache, rate-limit timestamps, the unreachable side-goal map, the
//! random source used for nudges and pacing, and the counters.
use std::sync::Arc;

use nav_core::{Grid, GridBuilder, Path, Planner, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, sleep};

use crate::config::NavigatorConfig;
use crate::executor::MoveOptions;
use crate::outcome::{MoveContext, MoveError};
use crate::side_goal::UnreachableGoals;
use crate::stats::NavigatorStats;
use crate::world::{AreaId, Collaborators, WorldSnapshot};

/// Grid built for one area and mover kind.
#[derive(Clone, Debug)]
struct CachedGrid {
    area: AreaId,
    can_teleport: bool,
    grid: Arc<Grid>,
}

/// Navigation core for one controlled character.
///
/// Never shared: every method takes `&mut self`, and a character running in
/// its own task owns its navigator outright.
pub struct Navigator {
    pub(crate) collaborators: Collaborators,
    pub(crate) config: NavigatorConfig,
    pub(crate) planner: Planner,
    grid: Option<CachedGrid>,
    pub(crate) last_monster_check: Option<Instant>,
    pub(crate) last_maintenance: Option<Instant>,
    pub(crate) unreachable: UnreachableGoals,
    pub(crate) rng: StdRng,
    pub(crate) stats: NavigatorStats,
}

impl Navigator {
    pub fn new(collaborators: Collaborators, config: NavigatorConfig) -> Self {
        Self::with_rng(collaborators, config, StdRng::from_entropy())
    }

    /// Deterministic nudges and pacing, for replays and tests.
    pub fn with_seed(collaborators: Collaborators, config: NavigatorConfig, seed: u64) -> Self {
        Self::with_rng(collaborators, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(collaborators: Collaborators, config: NavigatorConfig, rng: StdRng) -> Self {
        let planner = Planner::with_heuristic_weight(config.heuristic_weight);
        Self {
            collaborators,
            config,
            planner,
            grid: None,
            last_monster_check: None,
            last_maintenance: None,
            unreachable: UnreachableGoals::default(),
            rng,
            stats: NavigatorStats::new(),
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn stats(&self) -> &NavigatorStats {
        &self.stats
    }

    /// Drops the cached grid, e.g. after the map changed under the character.
    pub fn invalidate_grid(&mut self) {
        self.grid = None;
    }

    /// Waits for priority, reads the world and checks for death.
    pub(crate) async fn refresh(
        &mut self,
        destination: Position,
    ) -> Result<WorldSnapshot, MoveError> {
        self.collaborators.gate.wait_for_priority().await;
        let world = self.collaborators.world.refresh().await?;
        if world.player.is_dead() {
            let context = MoveContext::from_world(&world, destination);
            tracing::info!(%context, "character died while moving");
            return Err(MoveError::CharacterDied { context });
        }
        Ok(world)
    }

    pub(crate) fn can_teleport(&self, world: &WorldSnapshot) -> bool {
        self.collaborators.capabilities.can_teleport(world)
    }

    /// Returns the grid for the current area, building it when the area or
    /// the teleport capability changed.
    pub(crate) async fn grid_for(
        &mut self,
        world: &WorldSnapshot,
        can_teleport: bool,
    ) -> Result<Arc<Grid>, MoveError> {
        if let Some(cached) = &self.grid {
            if cached.area == world.area && cached.can_teleport == can_teleport {
                return Ok(Arc::clone(&cached.grid));
            }
        }

        let collision = self.collaborators.world.collision_map(world.area).await?;
        let mut builder = GridBuilder::new(collision.raw)
            .offset(collision.offset)
            .can_teleport(can_teleport);
        if self.config.thicken_narrow_passages && !can_teleport {
            builder = builder
                .thicken_narrow_passages()
                .drill_exits(collision.exits);
        }
        let grid = Arc::new(builder.build());

        tracing::debug!(
            area = world.area,
            can_teleport,
            width = grid.width(),
            height = grid.height(),
            "collision grid built"
        );
        self.stats.grid_builds += 1;
        self.grid = Some(CachedGrid {
            area: world.area,
            can_teleport,
            grid: Arc::clone(&grid),
        });
        Ok(grid)
    }

    /// Plans between two world positions and returns the route in world coordinates.
    pub(crate) fn plan(
        &mut self,
        grid: &Grid,
        from: Position,
        to: Position,
        can_teleport: bool,
    ) -> Option<Path> {
        let path = self
            .planner
            .find_path(grid, grid.to_local(from), grid.to_local(to), can_teleport)
            .map(|local| local.translated(grid.offset()));
        if path.is_none() {
            self.stats.failed_plans += 1;
        }
        path
    }

    /// Small random move to break out of a local stuck state.
    pub(crate) async fn nudge(&mut self, from: Position) {
        let radius = self.config.nudge_radius.max(1);
        let target = from.offset(
            self.rng.gen_range(-radius..=radius),
            self.rng.gen_range(-radius..=radius),
        );
        tracing::debug!(%from, %target, "nudging");
        if let Err(err) = self.collaborators.input.move_toward(target).await {
            tracing::warn!(error = %err, "nudge command failed");
        }
        self.stats.nudges += 1;
        sleep(self.config.nudge_pause).await;
    }

    /// Clears hostiles around the character and picks up what they dropped.
    ///
    /// Runs at most once per maintenance cooldown unless `force` is set.
    /// Collaborator failures are logged and absorbed.
    pub(crate) async fn run_maintenance(
        &mut self,
        world: &WorldSnapshot,
        options: &MoveOptions,
        force: bool,
    ) {
        let now = Instant::now();
        let due = self.last_maintenance.is_none_or(|last| {
            now.saturating_duration_since(last) > self.config.maintenance_cooldown
        });
        if world.in_town || !(force || due) {
            return;
        }
        self.last_maintenance = Some(now);
        self.stats.maintenance_runs += 1;

        let position = world.player.position;
        let radius = options
            .clear_path_radius
            .unwrap_or(self.config.clear_path_radius);
        if !options.ignore_monsters {
            if let Err(err) = self.collaborators.combat.clear_around(position, radius).await {
                tracing::warn!(error = %err, %position, "clearing hostiles failed");
            }
        }
        if options.ignore_items {
            return;
        }
        if let Err(err) = self
            .collaborators
            .loot
            .pick_up_around(self.config.loot_radius)
            .await
        {
            tracing::warn!(error = %err, "picking up items failed");
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
