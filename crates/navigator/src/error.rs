//! Failures reported by collaborators.
use nav_core::GridError;
use thiserror::Error;

use crate::world::AreaId;

/// The world-state reader could not produce a snapshot or collision map.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world state unavailable: {0}")]
    Unavailable(String),

    #[error("no collision data for area {area}")]
    UnknownArea { area: AreaId },

    #[error("malformed collision data for area {area}")]
    Collision {
        area: AreaId,
        #[source]
        source: GridError,
    },
}

/// A low-level command was rejected or reported a movement signal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The game refused the move because hostiles are in the way.
    #[error("monsters block the movement command")]
    MonstersInPath,

    /// The character could not advance from its current tile.
    #[error("movement command blocked")]
    Blocked,

    /// The game found no route toward the commanded point.
    #[error("no route toward the commanded point")]
    NoPath,

    #[error("command rejected: {0}")]
    Rejected(String),

    #[error("input channel disconnected")]
    Disconnected,
}
