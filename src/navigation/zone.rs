//! Steering zone classification
//!
//! Maps a fused `(left, right)` pair onto one of five bands using the
//! normalized difference `d = (l - r) / (l + r)`:
//!
//! ```text
//!              min(l, r) >= safe            -> Straight
//!  d == 0                                   -> Straight
//!  danger tier (min < danger):
//!    d >=  ratio                            -> HardLeft
//!    d <= -ratio                            -> HardRight
//!  otherwise:
//!    d > 0                                  -> SlightLeft
//!    d < 0                                  -> SlightRight
//! ```
//!
//! A larger left distance means the right wall is closer, so the vehicle
//! steers left.

use crate::config::NavigationConfig;
use crate::core::types::{PathState, RadiusCode, Side};

/// Steering band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteeringZone {
    HardLeft,
    SlightLeft,
    Straight,
    SlightRight,
    HardRight,
}

impl SteeringZone {
    /// Side the zone turns toward
    pub fn side(self) -> Option<Side> {
        match self {
            SteeringZone::HardLeft | SteeringZone::SlightLeft => Some(Side::Left),
            SteeringZone::HardRight | SteeringZone::SlightRight => Some(Side::Right),
            SteeringZone::Straight => None,
        }
    }

    pub fn radius_code(self, config: &NavigationConfig) -> RadiusCode {
        match self {
            SteeringZone::Straight => RadiusCode::STRAIGHT,
            SteeringZone::HardLeft => RadiusCode::turn(Side::Left, config.hard_turn_radius),
            SteeringZone::HardRight => RadiusCode::turn(Side::Right, config.hard_turn_radius),
            SteeringZone::SlightLeft => RadiusCode::turn(Side::Left, config.wide_turn_radius),
            SteeringZone::SlightRight => RadiusCode::turn(Side::Right, config.wide_turn_radius),
        }
    }

    /// Path log state and radius for this zone
    pub fn path_state(self, config: &NavigationConfig) -> (PathState, u8) {
        match self {
            SteeringZone::Straight => (PathState::Straight, RadiusCode::STRAIGHT.0),
            SteeringZone::HardLeft => (PathState::TurnLeft, config.hard_turn_radius),
            SteeringZone::SlightLeft => (PathState::TurnLeft, config.wide_turn_radius),
            SteeringZone::HardRight => (PathState::TurnRight, config.hard_turn_radius),
            SteeringZone::SlightRight => (PathState::TurnRight, config.wide_turn_radius),
        }
    }
}

/// Classify a fused distance pair
pub fn classify(left: u8, right: u8, config: &NavigationConfig) -> SteeringZone {
    let nearest = left.min(right);
    if nearest >= config.safe_zone {
        return SteeringZone::Straight;
    }

    let total = u16::from(left) + u16::from(right);
    if total == 0 || left == right {
        return SteeringZone::Straight;
    }

    let d = (f64::from(left) - f64::from(right)) / f64::from(total);
    if nearest < config.danger_zone {
        if d >= config.hard_turn_ratio {
            return SteeringZone::HardLeft;
        }
        if d <= -config.hard_turn_ratio {
            return SteeringZone::HardRight;
        }
    }

    if d > 0.0 {
        SteeringZone::SlightLeft
    } else {
        SteeringZone::SlightRight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(left: u8, right: u8) -> SteeringZone {
        classify(left, right, &NavigationConfig::default())
    }

    #[test]
    fn test_safe_corridor_is_straight() {
        assert_eq!(zone(20, 20), SteeringZone::Straight);
        assert_eq!(zone(80, 20), SteeringZone::Straight);
        assert_eq!(zone(255, 255), SteeringZone::Straight);
    }

    #[test]
    fn test_equal_sides_are_straight() {
        assert_eq!(zone(15, 15), SteeringZone::Straight);
        assert_eq!(zone(8, 8), SteeringZone::Straight);
        assert_eq!(zone(0, 0), SteeringZone::Straight);
    }

    #[test]
    fn test_caution_tier() {
        assert_eq!(zone(30, 19), SteeringZone::SlightLeft);
        assert_eq!(zone(19, 30), SteeringZone::SlightRight);
        // 10 is not inside the danger tier
        assert_eq!(zone(10, 30), SteeringZone::SlightRight);
        assert_eq!(zone(30, 10), SteeringZone::SlightLeft);
    }

    #[test]
    fn test_danger_tier() {
        assert_eq!(zone(30, 9), SteeringZone::HardLeft);
        assert_eq!(zone(9, 30), SteeringZone::HardRight);
        // Ratio boundary is inclusive: 8/20 and -8/20
        assert_eq!(zone(14, 6), SteeringZone::HardLeft);
        assert_eq!(zone(6, 14), SteeringZone::HardRight);
        // Inside the danger tier but below the ratio
        assert_eq!(zone(12, 8), SteeringZone::SlightLeft);
        assert_eq!(zone(8, 12), SteeringZone::SlightRight);
    }

    #[test]
    fn test_bands_are_exhaustive_and_symmetric() {
        for left in 0..=60u8 {
            for right in 0..=60u8 {
                let forward = zone(left, right);
                let mirrored = zone(right, left);
                let expected = match forward {
                    SteeringZone::HardLeft => SteeringZone::HardRight,
                    SteeringZone::SlightLeft => SteeringZone::SlightRight,
                    SteeringZone::Straight => SteeringZone::Straight,
                    SteeringZone::SlightRight => SteeringZone::SlightLeft,
                    SteeringZone::HardRight => SteeringZone::HardLeft,
                };
                assert_eq!(mirrored, expected, "({}, {})", left, right);
            }
        }
    }

    #[test]
    fn test_radius_codes() {
        let config = NavigationConfig::default();
        assert_eq!(SteeringZone::Straight.radius_code(&config), RadiusCode(127));
        assert_eq!(SteeringZone::SlightLeft.radius_code(&config), RadiusCode(5));
        assert_eq!(SteeringZone::SlightRight.radius_code(&config), RadiusCode(133));
        assert_eq!(SteeringZone::HardLeft.radius_code(&config), RadiusCode(0));
        assert_eq!(SteeringZone::HardRight.radius_code(&config), RadiusCode(128));
    }
}
