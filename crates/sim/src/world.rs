//! In-memory world implementing every navigator collaborator.
//!
//! Commands take effect immediately and are visible on the next refresh.
//! Walkers follow their own shortest path toward the commanded point, at most
//! `walk_speed` tiles per command, and stop in front of closed doors and
//! intact destructibles. Teleporters land on the commanded tile when it is
//! ground-walkable.
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use nav_core::{Grid, Position, find_path};
use navigator::{
    AreaCollision, AreaId, Capabilities, Collaborators, CombatCollaborator, CommandError, EntityId,
    InputDispatcher, KeyBinding, LootCollaborator, MovementSkill, ObjectKind, ShrineKind,
    StatusFlags, WorldError, WorldReader, WorldSnapshot,
};

use crate::scenario::Scenario;

pub const TELEPORT_BINDING: KeyBinding = KeyBinding(1);
pub const SPEED_BINDING: KeyBinding = KeyBinding(2);

/// How the simulated character reacts to move commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovementMode {
    #[default]
    Normal,
    /// Ignores every move command.
    Frozen,
    /// Alternates between two positions regardless of the commanded point.
    Oscillate { a: Position, b: Position },
}

/// Everything the simulation received, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimCommand {
    Move(Position),
    Interact(EntityId),
    Binding(KeyBinding),
    ClearAround { position: Position, radius: u32 },
    PickUp { radius: u32 },
}

#[derive(Debug)]
struct SimState {
    snapshot: WorldSnapshot,
    mode: MovementMode,
    can_teleport: bool,
    walk_speed: u32,
    /// Interactions an object absorbs before it reacts.
    stubborn: HashMap<EntityId, u32>,
    /// Move commands left before the character dies.
    death_after: Option<u32>,
    commands: Vec<SimCommand>,
    refreshes: u64,
}

/// Simulated world for one area.
#[derive(Debug)]
pub struct SimWorld {
    collision: AreaCollision,
    walker_grid: Grid,
    state: RwLock<SimState>,
}

impl SimWorld {
    pub const DEFAULT_WALK_SPEED: u32 = 4;

    pub fn new(collision: AreaCollision, snapshot: WorldSnapshot) -> Self {
        let walker_grid = Grid::build(
            collision.raw.clone(),
            collision.offset.x,
            collision.offset.y,
            false,
        );
        Self {
            collision,
            walker_grid,
            state: RwLock::new(SimState {
                snapshot,
                mode: MovementMode::Normal,
                can_teleport: false,
                walk_speed: Self::DEFAULT_WALK_SPEED,
                stubborn: HashMap::new(),
                death_after: None,
                commands: Vec::new(),
                refreshes: 0,
            }),
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        let world = Self::new(scenario.collision.clone(), scenario.snapshot.clone());
        world.update(|state| {
            state.can_teleport = scenario.can_teleport;
            state.walk_speed = scenario.walk_speed;
        });
        world
    }

    pub fn with_mode(self, mode: MovementMode) -> Self {
        self.update(|state| state.mode = mode);
        self
    }

    pub fn with_teleport(self, can_teleport: bool) -> Self {
        self.update(|state| state.can_teleport = can_teleport);
        self
    }

    pub fn with_walk_speed(self, walk_speed: u32) -> Self {
        self.update(|state| state.walk_speed = walk_speed.max(1));
        self
    }

    /// `object` ignores its first `absorbed` interactions.
    pub fn with_stubborn_object(self, object: EntityId, absorbed: u32) -> Self {
        self.update(|state| {
            state.stubborn.insert(object, absorbed);
        });
        self
    }

    /// The character dies after `moves` more move commands.
    pub fn with_death_after(self, moves: u32) -> Self {
        self.update(|state| state.death_after = Some(moves));
        self
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.read().snapshot.clone()
    }

    pub fn player_position(&self) -> Position {
        self.read().snapshot.player.position
    }

    pub fn commands(&self) -> Vec<SimCommand> {
        self.read().commands.clone()
    }

    pub fn move_commands(&self) -> usize {
        self.read()
            .commands
            .iter()
            .filter(|command| matches!(command, SimCommand::Move(_)))
            .count()
    }

    pub fn interactions_with(&self, object: EntityId) -> usize {
        self.read()
            .commands
            .iter()
            .filter(|command| **command == SimCommand::Interact(object))
            .count()
    }

    pub fn refreshes(&self) -> u64 {
        self.read().refreshes
    }

    fn read(&self) -> RwLockReadGuard<'_, SimState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SimState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut SimState)) {
        apply(&mut self.write());
    }

    fn walk(&self, state: &SimState, target: Position) -> Position {
        let from = state.snapshot.player.position;
        let grid = &self.walker_grid;
        let Some(path) = find_path(grid, grid.to_local(from), grid.to_local(target), false) else {
            tracing::trace!(%from, %target, "simulated walker found no route");
            return from;
        };

        let mut position = from;
        for cell in path
            .translated(grid.offset())
            .cells()
            .iter()
            .skip(1)
            .take(state.walk_speed as usize)
        {
            if is_obstructed(&state.snapshot, *cell) {
                break;
            }
            position = *cell;
        }
        position
    }
}

fn is_obstructed(world: &WorldSnapshot, cell: Position) -> bool {
    world.objects.iter().any(|object| {
        object.position == cell
            && object.selectable
            && matches!(object.kind, ObjectKind::Door | ObjectKind::Destructible)
    })
}

fn apply_shrine(world: &mut WorldSnapshot, kind: ShrineKind) {
    let player = &mut world.player;
    match kind {
        ShrineKind::Health => player.hp_percent = 100,
        ShrineKind::Mana => player.mp_percent = 100,
        ShrineKind::Refill => {
            player.hp_percent = 100;
            player.mp_percent = 100;
        }
        _ => {
            player.status.remove(StatusFlags::CURSES);
            let buff = match kind {
                ShrineKind::Experience => StatusFlags::SHRINE_EXPERIENCE,
                ShrineKind::ManaRegen => StatusFlags::SHRINE_MANA_REGEN,
                ShrineKind::Stamina => StatusFlags::SHRINE_STAMINA,
                ShrineKind::Skill => StatusFlags::SHRINE_SKILL,
                _ => StatusFlags::empty(),
            };
            if !buff.is_empty() {
                player.status.remove(
                    StatusFlags::SHRINE_EXPERIENCE
                        | StatusFlags::SHRINE_MANA_REGEN
                        | StatusFlags::SHRINE_STAMINA
                        | StatusFlags::SHRINE_SKILL,
                );
                player.status.insert(buff);
            }
        }
    }
}

/// Wires one simulated world into every collaborator slot.
pub fn collaborators(world: &Arc<SimWorld>) -> Collaborators {
    Collaborators::new(
        world.clone(),
        world.clone(),
        world.clone(),
        world.clone(),
        world.clone(),
    )
}

#[async_trait]
impl WorldReader for SimWorld {
    async fn refresh(&self) -> Result<WorldSnapshot, WorldError> {
        let mut state = self.write();
        state.refreshes += 1;
        Ok(state.snapshot.clone())
    }

    async fn collision_map(&self, area: AreaId) -> Result<AreaCollision, WorldError> {
        if area != self.read().snapshot.area {
            return Err(WorldError::UnknownArea { area });
        }
        Ok(self.collision.clone())
    }
}

#[async_trait]
impl InputDispatcher for SimWorld {
    async fn move_toward(&self, position: Position) -> Result<(), CommandError> {
        let mut state = self.write();
        state.commands.push(SimCommand::Move(position));

        let next = match state.mode {
            MovementMode::Frozen => state.snapshot.player.position,
            MovementMode::Oscillate { a, b } => {
                if state.snapshot.player.position == a { b } else { a }
            }
            MovementMode::Normal if state.can_teleport => {
                if self.walker_grid.is_walkable(position) {
                    position
                } else {
                    state.snapshot.player.position
                }
            }
            MovementMode::Normal => self.walk(&state, position),
        };
        state.snapshot.player.position = next;

        if let Some(remaining) = state.death_after.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                state.snapshot.player.hp_percent = 0;
            }
        }
        Ok(())
    }

    async fn interact(&self, object: EntityId) -> Result<(), CommandError> {
        let mut state = self.write();
        state.commands.push(SimCommand::Interact(object));

        if let Some(absorbed) = state.stubborn.get_mut(&object) {
            if *absorbed > 0 {
                *absorbed -= 1;
                return Ok(());
            }
        }

        let snapshot = &mut state.snapshot;
        let Some(target) = snapshot
            .objects
            .iter_mut()
            .find(|candidate| candidate.id == object)
        else {
            return Err(CommandError::Rejected(format!("no object {object}")));
        };
        if !target.selectable {
            return Ok(());
        }
        target.selectable = false;
        if let ObjectKind::Shrine(kind) = target.kind {
            apply_shrine(snapshot, kind);
        }
        Ok(())
    }

    async fn press_binding(&self, binding: KeyBinding) -> Result<(), CommandError> {
        let mut state = self.write();
        state.commands.push(SimCommand::Binding(binding));
        state.snapshot.player.active_skill = match binding {
            TELEPORT_BINDING => Some(MovementSkill::Teleport),
            SPEED_BINDING => Some(MovementSkill::Speed),
            _ => return Err(CommandError::Rejected(format!("unbound key {}", binding.0))),
        };
        Ok(())
    }
}

#[async_trait]
impl CombatCollaborator for SimWorld {
    async fn clear_around(&self, position: Position, radius: u32) -> Result<(), CommandError> {
        let mut state = self.write();
        state
            .commands
            .push(SimCommand::ClearAround { position, radius });
        for monster in state
            .snapshot
            .monsters
            .iter_mut()
            .filter(|monster| monster.hostile && monster.position.distance(position) <= radius)
        {
            monster.hp = 0;
        }
        Ok(())
    }
}

#[async_trait]
impl LootCollaborator for SimWorld {
    async fn pick_up_around(&self, radius: u32) -> Result<(), CommandError> {
        self.write().commands.push(SimCommand::PickUp { radius });
        Ok(())
    }
}

impl Capabilities for SimWorld {
    fn can_teleport(&self, _world: &WorldSnapshot) -> bool {
        self.read().can_teleport
    }

    fn binding_for(&self, skill: MovementSkill) -> Option<KeyBinding> {
        match skill {
            MovementSkill::Teleport => Some(TELEPORT_BINDING),
            MovementSkill::Speed => Some(SPEED_BINDING),
        }
    }
}
