//! Outcome taxonomy for every navigation entry point.
//!
//! A movement call ends in `Ok(())` or exactly one [`MoveError`]. Callers
//! match on the variant (or ask [`MoveError::severity`]) to decide whether to
//! retry, pick another destination, or abandon the run.
//!
//! # Severity
//!
//! | variant | severity |
//! |---|---|
//! | `MonstersInPath`, `InteractionFailed` | recoverable |
//! | `PlayerStuck`, `RoundTrip`, `NoPath` | terminal |
//! | `CharacterDied`, `World`, `Command` | fatal |
//!
//! A surfaced `PlayerStuck` has already been through the nudge retries of
//! [`crate::Navigator::move_to`].
use std::fmt;

use nav_core::Position;
use thiserror::Error;

use crate::error::{CommandError, WorldError};
use crate::world::{AreaId, EntityId, ObjectKind, WorldSnapshot};

pub type MoveOutcome = Result<(), MoveError>;

/// Where a navigation failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveContext {
    pub area: AreaId,
    pub position: Position,
    pub destination: Position,
}

impl MoveContext {
    pub fn new(area: AreaId, position: Position, destination: Position) -> Self {
        Self {
            area,
            position,
            destination,
        }
    }

    pub fn from_world(world: &WorldSnapshot, destination: Position) -> Self {
        Self::new(world.area, world.player.position, destination)
    }
}

impl fmt::Display for MoveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "area {} at {} toward {}",
            self.area, self.position, self.destination
        )
    }
}

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("monsters in path ({context})")]
    MonstersInPath { context: MoveContext },

    #[error("player stuck ({context})")]
    PlayerStuck { context: MoveContext },

    #[error("round trip without progress ({context})")]
    RoundTrip { context: MoveContext },

    #[error("path could not be calculated ({context})")]
    NoPath { context: MoveContext },

    #[error("character died ({context})")]
    CharacterDied { context: MoveContext },

    #[error("failed to interact with {kind} {object} after {attempts} attempts ({context})")]
    InteractionFailed {
        object: EntityId,
        kind: ObjectKind,
        attempts: u32,
        context: MoveContext,
    },

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("movement command failed")]
    Command(#[from] CommandError),
}

/// How a caller should react to a [`MoveError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Resolve the cause (fight, retry the interaction) and resume.
    Recoverable,

    /// Retrying the same movement will not help; choose another objective.
    Terminal,

    /// Abandon the movement and whatever requested it.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Terminal => "terminal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

impl MoveError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MonstersInPath { .. } | Self::InteractionFailed { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::PlayerStuck { .. } | Self::RoundTrip { .. } | Self::NoPath { .. } => {
                ErrorSeverity::Terminal
            }
            Self::CharacterDied { .. } | Self::World(_) | Self::Command(_) => {
                ErrorSeverity::Fatal
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity().is_recoverable()
    }

    pub fn is_death(&self) -> bool {
        matches!(self, Self::CharacterDied { .. })
    }

    pub fn context(&self) -> Option<&MoveContext> {
        match self {
            Self::MonstersInPath { context }
            | Self::PlayerStuck { context }
            | Self::RoundTrip { context }
            | Self::NoPath { context }
            | Self::CharacterDied { context }
            | Self::InteractionFailed { context, .. } => Some(context),
            Self::World(_) | Self::Command(_) => None,
        }
    }

    /// Replaces the destination recorded in the context, if there is one.
    pub fn with_destination(mut self, destination: Position) -> Self {
        match &mut self {
            Self::MonstersInPath { context }
            | Self::PlayerStuck { context }
            | Self::RoundTrip { context }
            | Self::NoPath { context }
            | Self::CharacterDied { context }
            | Self::InteractionFailed { context, .. } => context.destination = destination,
            Self::World(_) | Self::Command(_) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MoveContext {
        MoveContext::new(3, Position::new(1, 2), Position::new(40, 2))
    }

    #[test]
    fn severity_drives_retry_policy() {
        let context = context();
        assert!(MoveError::MonstersInPath { context }.is_retryable());
        assert!(MoveError::InteractionFailed {
            object: 8,
            kind: ObjectKind::Door,
            attempts: 5,
            context,
        }
        .is_retryable());
        assert_eq!(
            MoveError::PlayerStuck { context }.severity(),
            ErrorSeverity::Terminal
        );
        assert!(!MoveError::RoundTrip { context }.is_retryable());
        assert!(!MoveError::NoPath { context }.is_retryable());

        let died = MoveError::CharacterDied { context };
        assert_eq!(died.severity(), ErrorSeverity::Fatal);
        assert!(died.is_death());
        assert_eq!(
            MoveError::Command(CommandError::Disconnected).severity().as_str(),
            "fatal"
        );
    }

    #[test]
    fn messages_carry_area_and_destination() {
        let err = MoveError::NoPath { context: context() };
        assert_eq!(
            err.to_string(),
            "path could not be calculated (area 3 at (1, 2) toward (40, 2))"
        );
        assert_eq!(err.context().map(|c| c.area), Some(3));
    }

    #[test]
    fn leg_failures_can_be_retargeted() {
        let err = MoveError::PlayerStuck { context: context() };
        let err = err.with_destination(Position::new(90, 9));
        let context = err.context().copied().unwrap();
        assert_eq!(context.destination, Position::new(90, 9));
        assert_eq!(context.position, Position::new(1, 2));

        let command = MoveError::Command(CommandError::Blocked).with_destination(Position::ORIGIN);
        assert!(command.context().is_none());
    }
}
