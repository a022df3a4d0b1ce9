//! Navigator tuning parameters and their environment loader.
use std::env;
use std::time::Duration;

use nav_core::DEFAULT_HEURISTIC_WEIGHT;

use crate::pacing::PacingRange;

/// Thresholds and radii used by the executor and the orchestrator.
///
/// All durations are wall-clock. Distances are in tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigatorConfig {
    /// Distance at which a destination counts as reached.
    pub finish_distance: u32,
    /// Finish distance multiplier applied while the blocked flag is set.
    pub blocked_finish_multiplier: u32,
    /// Extra slack under which a missing path still counts as arrival.
    pub no_path_slack: u32,
    /// Hostiles within this distance interrupt movement. Zero disables the check.
    pub clear_path_radius: u32,
    pub monster_check_interval: Duration,
    /// Stationary time after which the blocked flag is set and remedies tried.
    pub block_threshold: Duration,
    /// Stationary time after which the call fails with `PlayerStuck`.
    pub stuck_threshold: Duration,
    pub round_trip_radius: u32,
    pub round_trip_threshold: Duration,
    pub teleport_stride: usize,
    pub walk_stride: usize,
    pub field_pacing: PacingRange,
    pub town_pacing: PacingRange,
    pub maintenance_cooldown: Duration,
    pub loot_radius: u32,
    pub interact_with_shrines: bool,
    pub interact_with_chests: bool,
    pub side_goal_scan_radius: u32,
    /// How long a side goal without a path is ignored.
    pub side_goal_cooldown: Duration,
    /// Side goals are not pursued at or below this life percentage.
    pub side_goal_min_hp_percent: u8,
    pub interaction_attempts: u32,
    pub interaction_cooldown: Duration,
    /// Consecutive `PlayerStuck` outcomes absorbed by the orchestrator.
    pub stuck_retries: u32,
    pub nudge_radius: i32,
    pub nudge_pause: Duration,
    /// Close one-tile passages for walkers when building grids.
    pub thicken_narrow_passages: bool,
    pub heuristic_weight: f64,
}

impl NavigatorConfig {
    pub const DEFAULT_FINISH_DISTANCE: u32 = 4;
    pub const DEFAULT_BLOCKED_FINISH_MULTIPLIER: u32 = 2;
    pub const DEFAULT_NO_PATH_SLACK: u32 = 5;
    pub const DEFAULT_CLEAR_PATH_RADIUS: u32 = 7;
    pub const DEFAULT_MONSTER_CHECK_INTERVAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_BLOCK_THRESHOLD: Duration = Duration::from_millis(500);
    pub const DEFAULT_STUCK_THRESHOLD: Duration = Duration::from_secs(2);
    pub const DEFAULT_ROUND_TRIP_RADIUS: u32 = 8;
    pub const DEFAULT_ROUND_TRIP_THRESHOLD: Duration = Duration::from_secs(10);
    pub const DEFAULT_TELEPORT_STRIDE: usize = 30;
    pub const DEFAULT_WALK_STRIDE: usize = 8;
    pub const DEFAULT_FIELD_PACING: PacingRange = PacingRange::from_millis(300, 350);
    pub const DEFAULT_TOWN_PACING: PacingRange = PacingRange::from_millis(500, 800);
    pub const DEFAULT_MAINTENANCE_COOLDOWN: Duration = Duration::from_millis(500);
    pub const DEFAULT_LOOT_RADIUS: u32 = 25;
    pub const DEFAULT_SIDE_GOAL_SCAN_RADIUS: u32 = 50;
    pub const DEFAULT_SIDE_GOAL_COOLDOWN: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_SIDE_GOAL_MIN_HP_PERCENT: u8 = 30;
    pub const DEFAULT_INTERACTION_ATTEMPTS: u32 = 5;
    pub const DEFAULT_INTERACTION_COOLDOWN: Duration = Duration::from_millis(200);
    pub const DEFAULT_STUCK_RETRIES: u32 = 1;
    pub const DEFAULT_NUDGE_RADIUS: i32 = 3;
    pub const DEFAULT_NUDGE_PAUSE: Duration = Duration::from_millis(200);

    pub fn new() -> Self {
        Self {
            finish_distance: Self::DEFAULT_FINISH_DISTANCE,
            blocked_finish_multiplier: Self::DEFAULT_BLOCKED_FINISH_MULTIPLIER,
            no_path_slack: Self::DEFAULT_NO_PATH_SLACK,
            clear_path_radius: Self::DEFAULT_CLEAR_PATH_RADIUS,
            monster_check_interval: Self::DEFAULT_MONSTER_CHECK_INTERVAL,
            block_threshold: Self::DEFAULT_BLOCK_THRESHOLD,
            stuck_threshold: Self::DEFAULT_STUCK_THRESHOLD,
            round_trip_radius: Self::DEFAULT_ROUND_TRIP_RADIUS,
            round_trip_threshold: Self::DEFAULT_ROUND_TRIP_THRESHOLD,
            teleport_stride: Self::DEFAULT_TELEPORT_STRIDE,
            walk_stride: Self::DEFAULT_WALK_STRIDE,
            field_pacing: Self::DEFAULT_FIELD_PACING,
            town_pacing: Self::DEFAULT_TOWN_PACING,
            maintenance_cooldown: Self::DEFAULT_MAINTENANCE_COOLDOWN,
            loot_radius: Self::DEFAULT_LOOT_RADIUS,
            interact_with_shrines: true,
            interact_with_chests: false,
            side_goal_scan_radius: Self::DEFAULT_SIDE_GOAL_SCAN_RADIUS,
            side_goal_cooldown: Self::DEFAULT_SIDE_GOAL_COOLDOWN,
            side_goal_min_hp_percent: Self::DEFAULT_SIDE_GOAL_MIN_HP_PERCENT,
            interaction_attempts: Self::DEFAULT_INTERACTION_ATTEMPTS,
            interaction_cooldown: Self::DEFAULT_INTERACTION_COOLDOWN,
            stuck_retries: Self::DEFAULT_STUCK_RETRIES,
            nudge_radius: Self::DEFAULT_NUDGE_RADIUS,
            nudge_pause: Self::DEFAULT_NUDGE_PAUSE,
            thicken_narrow_passages: false,
            heuristic_weight: DEFAULT_HEURISTIC_WEIGHT,
        }
    }

    pub fn with_clear_path_radius(mut self, radius: u32) -> Self {
        self.clear_path_radius = radius;
        self
    }

    pub fn with_side_goal_scan_radius(mut self, radius: u32) -> Self {
        self.side_goal_scan_radius = radius;
        self
    }

    pub fn with_chests(mut self, enabled: bool) -> Self {
        self.interact_with_chests = enabled;
        self
    }

    pub fn with_shrines(mut self, enabled: bool) -> Self {
        self.interact_with_shrines = enabled;
        self
    }

    pub fn with_thickened_passages(mut self, enabled: bool) -> Self {
        self.thicken_narrow_passages = enabled;
        self
    }

    pub fn with_heuristic_weight(mut self, weight: f64) -> Self {
        self.heuristic_weight = weight;
        self
    }

    /// Stride for one executor leg.
    pub fn stride(&self, can_teleport: bool) -> usize {
        if can_teleport {
            self.teleport_stride
        } else {
            self.walk_stride
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `NAV_FINISH_DISTANCE` - Arrival distance in tiles (default: 4)
    /// - `NAV_CLEAR_PATH_RADIUS` - Monster interruption radius, 0 disables (default: 7)
    /// - `NAV_BLOCK_THRESHOLD_MS` - Stationary time before remedies (default: 500)
    /// - `NAV_STUCK_THRESHOLD_MS` - Stationary time before failing (default: 2000)
    /// - `NAV_ROUND_TRIP_THRESHOLD_MS` - Confinement time before failing (default: 10000)
    /// - `NAV_LOOT_RADIUS` - Pickup radius after combat and chests (default: 25)
    /// - `NAV_SIDE_GOAL_SCAN_RADIUS` - Shrine and chest scan radius (default: 50)
    /// - `NAV_INTERACT_WITH_SHRINES` - Detour to shrines (default: true)
    /// - `NAV_INTERACT_WITH_CHESTS` - Detour to chests (default: false)
    /// - `NAV_THICKEN_PASSAGES` - Thicken narrow passages for walkers (default: false)
    /// - `NAV_HEURISTIC_WEIGHT` - Planner heuristic weight (default: 0.5)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(distance) = read_env::<u32>("NAV_FINISH_DISTANCE") {
            config.finish_distance = distance.max(1);
        }
        if let Some(radius) = read_env::<u32>("NAV_CLEAR_PATH_RADIUS") {
            config.clear_path_radius = radius;
        }

        if let Some(ms) = read_env::<u64>("NAV_BLOCK_THRESHOLD_MS") {
            config.block_threshold = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("NAV_STUCK_THRESHOLD_MS") {
            config.stuck_threshold = Duration::from_millis(ms).max(config.block_threshold);
        }
        if let Some(ms) = read_env::<u64>("NAV_ROUND_TRIP_THRESHOLD_MS") {
            config.round_trip_threshold = Duration::from_millis(ms);
        }

        if let Some(radius) = read_env::<u32>("NAV_LOOT_RADIUS") {
            config.loot_radius = radius;
        }
        if let Some(radius) = read_env::<u32>("NAV_SIDE_GOAL_SCAN_RADIUS") {
            config.side_goal_scan_radius = radius;
        }
        if let Some(enabled) = read_env_bool("NAV_INTERACT_WITH_SHRINES") {
            config.interact_with_shrines = enabled;
        }
        if let Some(enabled) = read_env_bool("NAV_INTERACT_WITH_CHESTS") {
            config.interact_with_chests = enabled;
        }

        if let Some(enabled) = read_env_bool("NAV_THICKEN_PASSAGES") {
            config.thicken_narrow_passages = enabled;
        }
        if let Some(weight) = read_env::<f64>("NAV_HEURISTIC_WEIGHT")
            .filter(|weight| weight.is_finite() && *weight >= 0.0)
        {
            config.heuristic_weight = weight;
        }

        config
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_follow_teleport_capability() {
        let config = NavigatorConfig::default();
        assert_eq!(config.stride(true), 30);
        assert_eq!(config.stride(false), 8);
    }

    #[test]
    fn environment_overrides_defaults() {
        // SAFETY: these keys are only touched by this test.
        unsafe {
            env::set_var("NAV_FINISH_DISTANCE", "0");
            env::set_var("NAV_INTERACT_WITH_CHESTS", "yes");
            env::set_var("NAV_HEURISTIC_WEIGHT", "not-a-number");
        }

        let config = NavigatorConfig::from_env();
        assert_eq!(config.finish_distance, 1);
        assert!(config.interact_with_chests);
        assert_eq!(config.heuristic_weight, DEFAULT_HEURISTIC_WEIGHT);

        unsafe {
            env::remove_var("NAV_FINISH_DISTANCE");
            env::remove_var("NAV_INTERACT_WITH_CHESTS");
            env::remove_var("NAV_HEURISTIC_WEIGHT");
        }
    }
}
