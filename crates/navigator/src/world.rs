//! World model read by the navigator and the collaborators it drives.
//!
//! The navigator never talks to the game process directly. Everything it
//! knows arrives through [`WorldReader::refresh`] as an owned
//! [`WorldSnapshot`], and everything it does leaves through
//! [`InputDispatcher`] or the combat and loot collaborators. Implementations
//! live outside this crate (a game bridge in production, `nav-sim` in tests).
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bitflags::bitflags;
use nav_core::{Position, RawCollisionMap};

use crate::error::{CommandError, WorldError};

pub type AreaId = u32;
pub type EntityId = u32;

bitflags! {
    /// Status effects on the controlled character relevant to navigation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StatusFlags: u32 {
        const AMPLIFY_DAMAGE = 1 << 0;
        const LOWER_RESIST = 1 << 1;
        const DECREPIFY = 1 << 2;

        const SHRINE_EXPERIENCE = 1 << 8;
        const SHRINE_MANA_REGEN = 1 << 9;
        const SHRINE_STAMINA = 1 << 10;
        const SHRINE_SKILL = 1 << 11;

        const STUNNED = 1 << 16;
        const FROZEN = 1 << 17;

        const CURSES = Self::AMPLIFY_DAMAGE.bits()
            | Self::LOWER_RESIST.bits()
            | Self::DECREPIFY.bits();
        const DISABLED = Self::STUNNED.bits() | Self::FROZEN.bits();
    }
}

/// Movement abilities the navigator may switch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MovementSkill {
    Teleport,
    Speed,
}

/// Opaque input binding understood by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding(pub u16);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub position: Position,
    pub hp_percent: u8,
    pub mp_percent: u8,
    pub status: StatusFlags,
    pub active_skill: Option<MovementSkill>,
    /// Animation time of the active movement skill.
    pub cast_duration: Duration,
}

impl PlayerState {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            hp_percent: 100,
            mp_percent: 100,
            status: StatusFlags::empty(),
            active_skill: None,
            cast_duration: Duration::ZERO,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp_percent == 0
    }

    /// Stunned or frozen characters do not accumulate stuck time.
    pub fn is_disabled(&self) -> bool {
        self.status.intersects(StatusFlags::DISABLED)
    }

    pub fn is_cursed(&self) -> bool {
        self.status.intersects(StatusFlags::CURSES)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monster {
    pub id: EntityId,
    pub position: Position,
    pub hp: u32,
    pub hostile: bool,
}

impl Monster {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ShrineKind {
    Refill,
    Health,
    Mana,
    Experience,
    ManaRegen,
    Stamina,
    Skill,
    Armor,
    Combat,
    ResistLightning,
    ResistFire,
    ResistCold,
    ResistPoison,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Door,
    Shrine(ShrineKind),
    Chest,
    Destructible,
    Other,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Door => f.write_str("door"),
            ObjectKind::Shrine(kind) => write!(f, "shrine ({kind})"),
            ObjectKind::Chest => f.write_str("chest"),
            ObjectKind::Destructible => f.write_str("destructible"),
            ObjectKind::Other => f.write_str("object"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldObject {
    pub id: EntityId,
    pub kind: ObjectKind,
    pub position: Position,
    /// Closed doors, unopened chests and unused shrines are selectable.
    pub selectable: bool,
}

impl WorldObject {
    pub fn is_closed_door(&self) -> bool {
        self.kind == ObjectKind::Door && self.selectable
    }

    pub fn shrine(&self) -> Option<ShrineKind> {
        match self.kind {
            ObjectKind::Shrine(kind) if self.selectable => Some(kind),
            _ => None,
        }
    }
}

/// One refresh worth of world state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub area: AreaId,
    pub in_town: bool,
    pub player: PlayerState,
    pub monsters: Vec<Monster>,
    pub objects: Vec<WorldObject>,
    /// Round-trip estimate to the game server.
    pub latency: Duration,
}

impl WorldSnapshot {
    pub fn distance_from_player(&self, position: Position) -> u32 {
        self.player.position.distance(position)
    }

    pub fn object(&self, id: EntityId) -> Option<&WorldObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn monster(&self, id: EntityId) -> Option<&Monster> {
        self.monsters.iter().find(|monster| monster.id == id)
    }

    pub fn hostiles(&self) -> impl Iterator<Item = &Monster> {
        self.monsters
            .iter()
            .filter(|monster| monster.hostile && monster.is_alive())
    }
}

/// Collision data for one area, in world coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AreaCollision {
    pub raw: RawCollisionMap,
    pub offset: Position,
    /// Known exits; their neighborhood is kept open when the grid is thickened.
    pub exits: Vec<Position>,
}

#[async_trait]
pub trait WorldReader: Send + Sync {
    async fn refresh(&self) -> Result<WorldSnapshot, WorldError>;

    async fn collision_map(&self, area: AreaId) -> Result<AreaCollision, WorldError>;
}

/// Fire-and-forget input commands. Effects are observed on the next refresh.
#[async_trait]
pub trait InputDispatcher: Send + Sync {
    async fn move_toward(&self, position: Position) -> Result<(), CommandError>;

    async fn interact(&self, object: EntityId) -> Result<(), CommandError>;

    async fn press_binding(&self, binding: KeyBinding) -> Result<(), CommandError>;
}

#[async_trait]
pub trait CombatCollaborator: Send + Sync {
    /// Engages hostiles within `radius` of `position`.
    async fn clear_around(&self, position: Position, radius: u32) -> Result<(), CommandError>;
}

#[async_trait]
pub trait LootCollaborator: Send + Sync {
    async fn pick_up_around(&self, radius: u32) -> Result<(), CommandError>;
}

pub trait Capabilities: Send + Sync {
    fn can_teleport(&self, world: &WorldSnapshot) -> bool;

    fn binding_for(&self, skill: MovementSkill) -> Option<KeyBinding>;
}

/// Lets a higher-priority task (e.g. life preservation) preempt movement.
///
/// Awaited once per loop iteration, before anything else happens.
#[async_trait]
pub trait PriorityGate: Send + Sync {
    async fn wait_for_priority(&self);
}

/// Gate that never blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysPriority;

#[async_trait]
impl PriorityGate for AlwaysPriority {
    async fn wait_for_priority(&self) {}
}

/// Every collaborator one [`crate::Navigator`] needs.
#[derive(Clone)]
pub struct Collaborators {
    pub world: Arc<dyn WorldReader>,
    pub input: Arc<dyn InputDispatcher>,
    pub combat: Arc<dyn CombatCollaborator>,
    pub loot: Arc<dyn LootCollaborator>,
    pub capabilities: Arc<dyn Capabilities>,
    pub gate: Arc<dyn PriorityGate>,
}

impl Collaborators {
    pub fn new(
        world: Arc<dyn WorldReader>,
        input: Arc<dyn InputDispatcher>,
        combat: Arc<dyn CombatCollaborator>,
        loot: Arc<dyn LootCollaborator>,
        capabilities: Arc<dyn Capabilities>,
    ) -> Self {
        Self {
            world,
            input,
            combat,
            loot,
            capabilities,
            gate: Arc::new(AlwaysPriority),
        }
    }

    pub fn with_priority_gate(mut self, gate: Arc<dyn PriorityGate>) -> Self {
        self.gate = gate;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curse_and_disable_groups() {
        let mut player = PlayerState::new(Position::ORIGIN);
        assert!(!player.is_cursed());
        player.status |= StatusFlags::DECREPIFY | StatusFlags::SHRINE_SKILL;
        assert!(player.is_cursed());
        assert!(!player.is_disabled());
        player.status.insert(StatusFlags::FROZEN);
        assert!(player.is_disabled());
    }

    #[test]
    fn used_shrines_are_not_reported() {
        let mut shrine = WorldObject {
            id: 7,
            kind: ObjectKind::Shrine(ShrineKind::Experience),
            position: Position::new(3, 3),
            selectable: true,
        };
        assert_eq!(shrine.shrine(), Some(ShrineKind::Experience));
        shrine.selectable = false;
        assert_eq!(shrine.shrine(), None);
        assert_eq!(shrine.kind.to_string(), "shrine (experience)");
    }
}
