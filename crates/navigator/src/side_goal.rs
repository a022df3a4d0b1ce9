//! Opportunistic detours to shrines and chests.
//!
//! Scanning order:
//!
//! 1. a curse-breaking shrine while cursed,
//! 2. a health, mana or refill shrine unless already topped up,
//! 3. the nearest buff shrine that outranks (or matches) the active buff,
//! 4. the nearest selectable chest, when chests are enabled.
//!
//! Only targets strictly inside the scan radius count, and positions whose
//! path failed recently are skipped.
use std::collections::HashMap;
use std::time::Duration;

use nav_core::Position;
use tokio::time::Instant;

use crate::config::NavigatorConfig;
use crate::world::{EntityId, ObjectKind, ShrineKind, StatusFlags, WorldObject, WorldSnapshot};

/// Life or mana above this percentage counts as topped up.
const TOPPED_UP_PERCENT: u8 = 95;

const ALWAYS_TAKE: [ShrineKind; 3] = [ShrineKind::Refill, ShrineKind::Health, ShrineKind::Mana];

/// Buff shrines, best first, with the status each one grants.
const PRIORITIZED: [(ShrineKind, StatusFlags); 4] = [
    (ShrineKind::Experience, StatusFlags::SHRINE_EXPERIENCE),
    (ShrineKind::ManaRegen, StatusFlags::SHRINE_MANA_REGEN),
    (ShrineKind::Stamina, StatusFlags::SHRINE_STAMINA),
    (ShrineKind::Skill, StatusFlags::SHRINE_SKILL),
];

const CURSE_BREAKING: [ShrineKind; 10] = [
    ShrineKind::Experience,
    ShrineKind::ManaRegen,
    ShrineKind::Stamina,
    ShrineKind::Skill,
    ShrineKind::Armor,
    ShrineKind::Combat,
    ShrineKind::ResistLightning,
    ShrineKind::ResistFire,
    ShrineKind::ResistCold,
    ShrineKind::ResistPoison,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideGoalKind {
    Shrine(ShrineKind),
    Chest,
}

/// A temporary destination replacing the caller's one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SideGoal {
    pub object: EntityId,
    pub position: Position,
    pub kind: SideGoalKind,
}

impl SideGoal {
    fn from_object(object: &WorldObject, kind: SideGoalKind) -> Self {
        Self {
            object: object.id,
            position: object.position,
            kind,
        }
    }

    pub fn object_kind(&self) -> ObjectKind {
        match self.kind {
            SideGoalKind::Shrine(kind) => ObjectKind::Shrine(kind),
            SideGoalKind::Chest => ObjectKind::Chest,
        }
    }
}

/// Positions whose path failed, with the instant of failure.
#[derive(Clone, Debug, Default)]
pub struct UnreachableGoals {
    failed: HashMap<Position, Instant>,
}

impl UnreachableGoals {
    pub fn mark(&mut self, position: Position, now: Instant) {
        self.failed.insert(position, now);
    }

    /// Whether `position` is still cooling down. Expired entries are dropped.
    pub fn is_cooling_down(
        &mut self,
        position: Position,
        cooldown: Duration,
        now: Instant,
    ) -> bool {
        match self.failed.get(&position) {
            Some(failed) if now.saturating_duration_since(*failed) < cooldown => true,
            Some(_) => {
                self.failed.remove(&position);
                false
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Picks the side goal to pursue from this snapshot, if any.
pub fn find_side_goal(
    world: &WorldSnapshot,
    config: &NavigatorConfig,
    unreachable: &mut UnreachableGoals,
    now: Instant,
) -> Option<SideGoal> {
    let player = &world.player;
    if world.in_town || player.is_dead() || player.hp_percent <= config.side_goal_min_hp_percent {
        return None;
    }

    let radius = config.side_goal_scan_radius;
    let cooldown = config.side_goal_cooldown;
    let mut candidates: Vec<&WorldObject> = world
        .objects
        .iter()
        .filter(|object| object.selectable && world.distance_from_player(object.position) < radius)
        .filter(|object| !unreachable.is_cooling_down(object.position, cooldown, now))
        .collect();
    candidates.sort_by_key(|object| (world.distance_from_player(object.position), object.id));

    if config.interact_with_shrines {
        if let Some(goal) = shrine_goal(world, &candidates) {
            return Some(goal);
        }
    }

    if config.interact_with_chests {
        return candidates
            .iter()
            .find(|object| object.kind == ObjectKind::Chest)
            .map(|object| SideGoal::from_object(object, SideGoalKind::Chest));
    }

    None
}

/// `candidates` must be sorted nearest first.
fn shrine_goal(world: &WorldSnapshot, candidates: &[&WorldObject]) -> Option<SideGoal> {
    let player = &world.player;
    let shrines = || {
        candidates
            .iter()
            .filter_map(|object| object.shrine().map(|kind| (*object, kind)))
    };
    let goal = |(object, kind): (&WorldObject, ShrineKind)| {
        SideGoal::from_object(object, SideGoalKind::Shrine(kind))
    };

    if player.is_cursed() {
        if let Some(found) = shrines().find(|(_, kind)| CURSE_BREAKING.contains(kind)) {
            tracing::debug!(shrine = %found.1, "curse detected, breaking it at shrine");
            return Some(goal(found));
        }
    }

    let needed = |kind: &ShrineKind| {
        let hp_full = player.hp_percent > TOPPED_UP_PERCENT;
        let mp_full = player.mp_percent > TOPPED_UP_PERCENT;
        match kind {
            ShrineKind::Health => !hp_full,
            ShrineKind::Mana => !mp_full,
            ShrineKind::Refill => !(hp_full && mp_full),
            _ => false,
        }
    };
    if let Some(found) = shrines().find(|(_, kind)| ALWAYS_TAKE.contains(kind) && needed(kind)) {
        return Some(goal(found));
    }

    let active_rank = PRIORITIZED
        .iter()
        .position(|(_, status)| player.status.contains(*status));
    let rank_of = |kind: ShrineKind| PRIORITIZED.iter().position(|(shrine, _)| *shrine == kind);
    shrines()
        .find(|(_, kind)| match (rank_of(*kind), active_rank) {
            (Some(rank), Some(active)) => rank <= active,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .map(goal)
}
