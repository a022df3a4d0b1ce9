//! Asynchronous navigation for one controlled character.
//!
//! A [`Navigator`] turns "go there" into a stream of move and interaction
//! commands against a live world it only observes through snapshots. It plans
//! with `nav-core`, watches for hostiles, doors and lack of progress, and
//! reports failures as [`MoveError`] values classified by [`ErrorSeverity`].
//!
//! Modules are organized by responsibility:
//! - [`navigator`] owns the per-character state shared by every entry point
//! - [`executor`] drives a single movement toward a fixed point
//! - [`orchestrator`] follows a [`TargetProvider`] with side goals and maintenance
//! - [`world`] defines snapshots and the collaborator traits the host implements
//! - [`side_goal`], [`interaction`] and [`pacing`] hold the decision helpers
//! - [`config`], [`outcome`] and [`stats`] cover tuning, results and counters
pub mod config;
pub mod error;
pub mod executor;
pub mod interaction;
pub mod navigator;
pub mod orchestrator;
pub mod outcome;
pub mod pacing;
pub mod side_goal;
pub mod state;
pub mod stats;
pub mod target;
pub mod world;

pub use config::NavigatorConfig;
pub use error::{CommandError, WorldError};
pub use executor::{MonsterFilter, MoveOptions, blocking_monster};
pub use navigator::Navigator;
pub use outcome::{ErrorSeverity, MoveContext, MoveError, MoveOutcome};
pub use pacing::PacingRange;
pub use side_goal::{SideGoal, SideGoalKind};
pub use stats::NavigatorStats;
pub use target::{FollowEntity, NearestOf, StaticTarget, TargetProvider, WithSideGoal};
pub use world::{
    AlwaysPriority, AreaCollision, AreaId, Capabilities, Collaborators, CombatCollaborator,
    EntityId, InputDispatcher, KeyBinding, LootCollaborator, Monster, MovementSkill, ObjectKind,
    PlayerState, PriorityGate, ShrineKind, StatusFlags, WorldObject, WorldReader, WorldSnapshot,
};
