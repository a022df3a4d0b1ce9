//! Command pacing: randomized, latency-scaled waits between inputs.
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

/// Latency above which pacing stops growing.
const MAX_SCALED_LATENCY: Duration = Duration::from_millis(500);

/// Inclusive range a randomized wait is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingRange {
    pub min: Duration,
    pub max: Duration,
}

impl PacingRange {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    /// Draws a duration from the range. A reversed range yields `min`.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span = (self.max - self.min).as_millis() as u64;
        self.min + Duration::from_millis(rng.gen_range(0..=span))
    }
}

/// Stretches `base` by the measured latency.
///
/// Each millisecond of latency adds a proportional share of `base`, so a
/// 100 ms ping turns a 300 ms wait into 330 ms. Latency is capped at 500 ms.
pub fn scale_for_latency(base: Duration, latency: Duration) -> Duration {
    let latency_ms = latency.min(MAX_SCALED_LATENCY).as_millis() as u32;
    base + base * latency_ms / 1000
}

/// Randomized wait after a movement command.
pub fn walk_duration(range: PacingRange, latency: Duration, rng: &mut impl Rng) -> Duration {
    scale_for_latency(range.sample(rng), latency)
}

/// Time left before a new teleport command may be issued.
pub fn remaining_cast(
    last_command: Option<Instant>,
    cast_duration: Duration,
    now: Instant,
) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last_command?);
    cast_duration.checked_sub(elapsed).filter(|d| !d.is_zero())
}
