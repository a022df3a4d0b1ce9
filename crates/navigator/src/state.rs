//! Per-call navigation state.
//!
//! A [`NavigationState`] lives for exactly one executor call and a
//! [`RouteCache`] for one orchestrator call. Neither is shared between calls
//! or characters; everything that must outlive a call is owned by the
//! [`crate::Navigator`].
use std::time::Duration;

use nav_core::{Path, Position};
use tokio::time::Instant;

/// Executor bookkeeping for one movement toward a fixed destination.
#[derive(Clone, Debug)]
pub struct NavigationState {
    pub destination: Position,
    /// Cached route in world coordinates.
    pub path: Option<Path>,
    /// Set after the block threshold or half the round-trip threshold.
    pub blocked: bool,
    pub last_command: Option<Instant>,
    last_remedy: Option<Instant>,
    stationary: Option<(Position, Instant)>,
    round_trip: Option<(Position, Instant)>,
}

impl NavigationState {
    pub fn new(destination: Position) -> Self {
        Self {
            destination,
            path: None,
            blocked: false,
            last_command: None,
            last_remedy: None,
            stationary: None,
            round_trip: None,
        }
    }

    pub fn invalidate_path(&mut self) {
        self.path = None;
    }

    /// Records the current position and returns how long it has been unchanged.
    pub fn observe_position(&mut self, position: Position, now: Instant) -> Duration {
        match self.stationary {
            Some((previous, since)) if previous == position => now.saturating_duration_since(since),
            _ => {
                self.stationary = Some((position, now));
                Duration::ZERO
            }
        }
    }

    /// Forgets stationary time, e.g. while the character is stunned.
    pub fn reset_stationary(&mut self) {
        self.stationary = None;
    }

    /// Returns how long the character has stayed within `radius` of the
    /// round-trip reference. Leaving the radius moves the reference.
    pub fn observe_round_trip(
        &mut self,
        position: Position,
        radius: u32,
        now: Instant,
    ) -> Duration {
        match self.round_trip {
            Some((reference, since)) if reference.distance(position) <= radius => {
                now.saturating_duration_since(since)
            }
            _ => {
                self.round_trip = Some((position, now));
                Duration::ZERO
            }
        }
    }

    /// Whether an obstacle remedy may be attempted again.
    pub fn remedy_due(&mut self, cooldown: Duration, now: Instant) -> bool {
        let due = self
            .last_remedy
            .is_none_or(|last| now.saturating_duration_since(last) >= cooldown);
        if due {
            self.last_remedy = Some(now);
        }
        due
    }
}

/// Cached route toward one orchestrator target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteCache {
    pub destination: Position,
    /// World coordinates.
    pub path: Path,
}

impl RouteCache {
    pub fn new(destination: Position, path: Path) -> Self {
        Self { destination, path }
    }

    pub fn targets(&self, destination: Position) -> bool {
        self.destination == destination
    }
}
