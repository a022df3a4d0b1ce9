//! Simulated world for exercising the navigator end to end.
//!
//! [`SimWorld`] implements every collaborator trait the navigator needs on top
//! of an in-memory snapshot, and [`Scenario`] loads one from a JSON file. The
//! `nav-sim` binary runs a scenario to completion; the navigator's integration
//! tests drive the same world under paused time.
pub mod scenario;
pub mod world;

pub use scenario::{Scenario, ScenarioError};
pub use world::{
    MovementMode, SPEED_BINDING, SimCommand, SimWorld, TELEPORT_BINDING, collaborators,
};
