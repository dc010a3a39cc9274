//! Configuration for Marga
//!
//! Loaded from a TOML file. Every field has a default, so an empty file (or
//! no file at all) yields the stock track vehicle:
//!
//! ```toml
//! [navigation]
//! safe_zone = 20          # cm, side distance that triggers steering
//! danger_zone = 10        # cm, side distance that allows hard turns
//! two_lap = true          # learn on lap 1, replay on lap 2
//!
//! [mapping]
//! turn_margin = 5         # distance before a turn to send the speed change
//!
//! [simulation]
//! course = "left_turn"
//! speed_factor = 4.0
//! ```

use crate::core::mailbox::OverflowPolicy;
use crate::core::sequence::GapPolicy;
use crate::error::{Error, Result};
use crate::mapping::LogOverflow;
use crate::sim::CourseTemplate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================================================
// Navigation
// ============================================================================

/// Steering thresholds and speeds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavigationConfig {
    /// Side distance below which steering reacts (cm)
    #[serde(default = "default_safe_zone")]
    pub safe_zone: u8,

    /// Side distance below which hard turns are allowed (cm)
    #[serde(default = "default_danger_zone")]
    pub danger_zone: u8,

    /// Front distance below which the vehicle pivots (cm)
    #[serde(default = "default_front_safe_zone")]
    pub front_safe_zone: u8,

    /// |(l - r) / (l + r)| at or above which a danger-tier turn is hard
    #[serde(default = "default_hard_turn_ratio")]
    pub hard_turn_ratio: f64,

    #[serde(default = "default_straight_speed")]
    pub straight_speed: u8,

    #[serde(default = "default_turn_speed")]
    pub turn_speed: u8,

    #[serde(default = "default_pivot_speed")]
    pub pivot_speed: u8,

    /// Front samples a pivot may last before the vehicle commits to its
    /// heading (0 = pivot until the front clears)
    #[serde(default = "default_pivot_limit")]
    pub pivot_limit: u32,

    /// Distance samples ignored after a committed pivot exit
    #[serde(default = "default_pivot_hold")]
    pub pivot_hold: u32,

    /// Radius of hard turns (0 = spin in place)
    #[serde(default)]
    pub hard_turn_radius: u8,

    /// Radius of slight turns
    #[serde(default = "default_wide_turn_radius")]
    pub wide_turn_radius: u8,

    /// Send path transitions to the path mapper
    #[serde(default = "default_true")]
    pub path_recording: bool,

    /// Start driving without waiting for a run-start event
    #[serde(default = "default_true")]
    pub auto_start: bool,

    /// Learn on the first lap and replay on the second
    #[serde(default)]
    pub two_lap: bool,

    /// Reaction to gaps in fused distance and telemetry streams
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

fn default_safe_zone() -> u8 {
    20
}
fn default_danger_zone() -> u8 {
    10
}
fn default_front_safe_zone() -> u8 {
    20
}
fn default_hard_turn_ratio() -> f64 {
    0.4
}
fn default_straight_speed() -> u8 {
    20
}
fn default_turn_speed() -> u8 {
    10
}
fn default_pivot_speed() -> u8 {
    20
}
fn default_pivot_limit() -> u32 {
    3
}
fn default_pivot_hold() -> u32 {
    5
}
fn default_wide_turn_radius() -> u8 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            safe_zone: default_safe_zone(),
            danger_zone: default_danger_zone(),
            front_safe_zone: default_front_safe_zone(),
            hard_turn_ratio: default_hard_turn_ratio(),
            straight_speed: default_straight_speed(),
            turn_speed: default_turn_speed(),
            pivot_speed: default_pivot_speed(),
            pivot_limit: default_pivot_limit(),
            pivot_hold: default_pivot_hold(),
            hard_turn_radius: 0,
            wide_turn_radius: default_wide_turn_radius(),
            path_recording: true,
            auto_start: true,
            two_lap: false,
            gap_policy: GapPolicy::default(),
        }
    }
}

// ============================================================================
// Path mapping
// ============================================================================

/// Path log and replay speed schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    /// Maximum segments in the path log
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,

    /// What to do with segments beyond capacity
    #[serde(default)]
    pub overflow: LogOverflow,

    /// Replay speed on long straights
    #[serde(default = "default_boost_speed")]
    pub straight_speed: u8,

    /// Replay speed ahead of a sharp turn
    #[serde(default = "default_sharp_turn_speed")]
    pub sharp_turn_speed: u8,

    /// Replay speed ahead of a wide turn
    #[serde(default = "default_wide_turn_speed")]
    pub wide_turn_speed: u8,

    /// Recorded straight length above which replay speeds up
    #[serde(default = "default_min_straight")]
    pub min_straight: u32,

    /// Remaining distance at which the turn speed is sent
    #[serde(default = "default_turn_margin")]
    pub turn_margin: u32,

    /// Turn radius above which a turn counts as wide
    #[serde(default = "default_min_wide_radius")]
    pub min_wide_radius: u8,

    /// Speed up on long straights during replay
    #[serde(default = "default_true")]
    pub straight_boost: bool,

    /// Speed assumed for lap time estimates until advice changes it
    #[serde(default = "default_straight_speed")]
    pub cruise_speed: u8,

    /// Encoder samples a new path state must last before the segment
    /// before it closes (0 = close on every transition)
    #[serde(default = "default_min_segment_samples")]
    pub min_segment_samples: u32,
}

fn default_log_capacity() -> usize {
    20
}
fn default_boost_speed() -> u8 {
    50
}
fn default_sharp_turn_speed() -> u8 {
    20
}
fn default_wide_turn_speed() -> u8 {
    30
}
fn default_min_straight() -> u32 {
    10
}
fn default_turn_margin() -> u32 {
    5
}
fn default_min_wide_radius() -> u8 {
    11
}
fn default_min_segment_samples() -> u32 {
    2
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            overflow: LogOverflow::default(),
            straight_speed: default_boost_speed(),
            sharp_turn_speed: default_sharp_turn_speed(),
            wide_turn_speed: default_wide_turn_speed(),
            min_straight: default_min_straight(),
            turn_margin: default_turn_margin(),
            min_wide_radius: default_min_wide_radius(),
            straight_boost: true,
            cruise_speed: default_straight_speed(),
            min_segment_samples: default_min_segment_samples(),
        }
    }
}

// ============================================================================
// Fusion and mailboxes
// ============================================================================

/// Raw IR sample fusion
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FusionConfig {
    /// Reaction to gaps in raw IR streams
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

/// Bounded mailbox sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailboxConfig {
    #[serde(default = "default_mailbox_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Send timeout under the block policy (0 = wait forever)
    #[serde(default)]
    pub send_timeout_ms: u64,
}

fn default_mailbox_capacity() -> usize {
    20
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            capacity: default_mailbox_capacity(),
            overflow: OverflowPolicy::default(),
            send_timeout_ms: 0,
        }
    }
}

impl MailboxConfig {
    pub fn send_timeout(&self) -> Option<Duration> {
        (self.send_timeout_ms > 0).then(|| Duration::from_millis(self.send_timeout_ms))
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// Virtual course and vehicle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub course: CourseTemplate,

    #[serde(default = "default_start_x")]
    pub start_x: i32,

    #[serde(default = "default_start_y")]
    pub start_y: i32,

    /// Degrees, multiple of 45 (0 = screen up, increasing to the left)
    #[serde(default)]
    pub start_heading: u16,

    /// Cells ahead of the vehicle where side rays start
    #[serde(default = "default_look_ahead")]
    pub look_ahead: i32,

    /// Look-ahead on diagonal headings
    #[serde(default = "default_diagonal_look_ahead")]
    pub diagonal_look_ahead: i32,

    /// Ray length limit in cells
    #[serde(default = "default_max_range")]
    pub max_range: u32,

    /// Simulation tick period
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Navigation timer period
    #[serde(default = "default_nav_tick_ms")]
    pub nav_tick_ms: u64,

    /// Time acceleration (2.0 = twice as fast)
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f32,

    /// Range noise seed (0 = random each run)
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Gaussian range noise standard deviation (cells)
    #[serde(default)]
    pub range_noise_stddev: f32,

    /// Tick limit for lockstep runs
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

fn default_start_x() -> i32 {
    160
}
fn default_start_y() -> i32 {
    240
}
fn default_look_ahead() -> i32 {
    10
}
fn default_diagonal_look_ahead() -> i32 {
    7
}
fn default_max_range() -> u32 {
    80
}
fn default_tick_ms() -> u64 {
    30
}
fn default_nav_tick_ms() -> u64 {
    50
}
fn default_speed_factor() -> f32 {
    1.0
}
fn default_random_seed() -> u64 {
    42
}
fn default_max_ticks() -> u64 {
    10_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            course: CourseTemplate::default(),
            start_x: default_start_x(),
            start_y: default_start_y(),
            start_heading: 0,
            look_ahead: default_look_ahead(),
            diagonal_look_ahead: default_diagonal_look_ahead(),
            max_range: default_max_range(),
            tick_ms: default_tick_ms(),
            nav_tick_ms: default_nav_tick_ms(),
            speed_factor: default_speed_factor(),
            random_seed: default_random_seed(),
            range_noise_stddev: 0.0,
            max_ticks: default_max_ticks(),
        }
    }
}

impl SimulationConfig {
    /// Simulation tick period scaled by the speed factor
    pub fn tick_interval(&self) -> Duration {
        scaled(self.tick_ms, self.speed_factor)
    }

    /// Navigation timer period scaled by the speed factor
    pub fn nav_tick_interval(&self) -> Duration {
        scaled(self.nav_tick_ms, self.speed_factor)
    }

    /// Simulation ticks per navigation tick, at least 1
    pub fn ticks_per_nav_tick(&self) -> u64 {
        (self.nav_tick_ms as f64 / self.tick_ms.max(1) as f64)
            .round()
            .max(1.0) as u64
    }
}

fn scaled(ms: u64, speed_factor: f32) -> Duration {
    Duration::from_micros((ms as f64 * 1000.0 / f64::from(speed_factor)) as u64)
}

// ============================================================================
// Logging
// ============================================================================

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Returns
    /// Parsed and validated configuration
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Laps the simulator runs before the course is complete
    pub fn laps(&self) -> u32 {
        if self.navigation.two_lap { 2 } else { 1 }
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<()> {
        let nav = &self.navigation;
        if nav.danger_zone > nav.safe_zone {
            return Err(Error::Config(format!(
                "danger_zone ({}) must not exceed safe_zone ({})",
                nav.danger_zone, nav.safe_zone
            )));
        }
        if !(nav.hard_turn_ratio > 0.0 && nav.hard_turn_ratio <= 1.0) {
            return Err(Error::Config(format!(
                "hard_turn_ratio must be in (0, 1], got {}",
                nav.hard_turn_ratio
            )));
        }
        if nav.wide_turn_radius == 0 || nav.wide_turn_radius >= 127 {
            return Err(Error::Config(format!(
                "wide_turn_radius must be in 1..127, got {}",
                nav.wide_turn_radius
            )));
        }
        if nav.hard_turn_radius >= 127 {
            return Err(Error::Config(format!(
                "hard_turn_radius must be below 127, got {}",
                nav.hard_turn_radius
            )));
        }
        if self.mapping.capacity == 0 {
            return Err(Error::Config("mapping.capacity must be positive".into()));
        }
        if self.mailbox.capacity == 0 {
            return Err(Error::Config("mailbox.capacity must be positive".into()));
        }

        let sim = &self.simulation;
        if sim.start_heading % 45 != 0 || sim.start_heading >= 360 {
            return Err(Error::Config(format!(
                "start_heading must be a multiple of 45 below 360, got {}",
                sim.start_heading
            )));
        }
        if sim.speed_factor <= 0.0 {
            return Err(Error::Config("speed_factor must be positive".into()));
        }
        if sim.tick_ms == 0 || sim.nav_tick_ms == 0 {
            return Err(Error::Config("tick periods must be positive".into()));
        }
        if sim.max_range == 0 {
            return Err(Error::Config("max_range must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.navigation.safe_zone, 20);
        assert_eq!(config.navigation.danger_zone, 10);
        assert_eq!(config.mapping.capacity, 20);
        assert_eq!(config.mapping.turn_margin, 5);
        assert_eq!(config.mapping.min_segment_samples, 2);
        assert_eq!(config.navigation.pivot_limit, 3);
        assert_eq!(config.navigation.pivot_hold, 5);
        assert_eq!(config.mailbox.capacity, 20);
        assert_eq!(config.simulation.course, CourseTemplate::Straight);
        assert_eq!(config.laps(), 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.navigation.front_safe_zone, 20);
        assert_eq!(config.simulation.max_range, 80);
        assert_eq!(config.mailbox.send_timeout(), None);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            [navigation]
            safe_zone = 25
            two_lap = true
            gap_policy = "halt"

            [mapping]
            overflow = "evict_oldest"

            [mailbox]
            overflow = "drop_oldest"
            send_timeout_ms = 250

            [simulation]
            course = "left_turn"
            speed_factor = 4.0
        "#;

        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.navigation.safe_zone, 25);
        assert_eq!(config.navigation.danger_zone, 10);
        assert_eq!(config.navigation.gap_policy, GapPolicy::Halt);
        assert_eq!(config.laps(), 2);
        assert_eq!(config.mapping.overflow, LogOverflow::EvictOldest);
        assert_eq!(config.mailbox.overflow, OverflowPolicy::DropOldest);
        assert_eq!(
            config.mailbox.send_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.simulation.course, CourseTemplate::LeftTurn);
        assert_eq!(config.simulation.tick_interval(), Duration::from_micros(7500));
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[navigation]"));
        assert!(toml_str.contains("safe_zone = 20"));

        let parsed = AppConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.mapping.min_wide_radius, 11);
    }

    #[test]
    fn test_validation_rejects_inverted_zones() {
        let err = AppConfig::from_toml_str(
            r#"
            [navigation]
            safe_zone = 10
            danger_zone = 15
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_rejects_odd_heading() {
        let mut config = AppConfig::default();
        config.simulation.start_heading = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ticks_per_nav_tick() {
        let config = SimulationConfig::default();
        assert_eq!(config.ticks_per_nav_tick(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("marga.toml");
        let mut config = AppConfig::default();
        config.simulation.course = CourseTemplate::Intersection;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.simulation.course, CourseTemplate::Intersection);
    }
}
