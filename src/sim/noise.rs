//! Seeded range noise for the simulated rangers

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Gaussian noise source
///
/// Seed 0 draws from entropy; any other seed replays the same sequence.
#[derive(Clone)]
pub struct RangeNoise {
    rng: SmallRng,
    stddev: f32,
}

impl RangeNoise {
    pub fn new(seed: u64, stddev: f32) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng, stddev }
    }

    pub fn is_enabled(&self) -> bool {
        self.stddev > 0.0
    }

    /// Perturb a distance in cells, never below zero
    #[inline]
    pub fn apply(&mut self, distance: f64) -> f64 {
        if !self.is_enabled() {
            return distance;
        }
        let n: f64 = self.rng.sample(StandardNormal);
        (distance + n * f64::from(self.stddev)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_seed() {
        let mut a = RangeNoise::new(42, 1.5);
        let mut b = RangeNoise::new(42, 1.5);
        for _ in 0..100 {
            assert_eq!(a.apply(30.0), b.apply(30.0));
        }
    }

    #[test]
    fn test_zero_stddev_is_identity() {
        let mut noise = RangeNoise::new(42, 0.0);
        assert!(!noise.is_enabled());
        for d in [0.0, 8.0, 80.0] {
            assert_eq!(noise.apply(d), d);
        }
    }

    #[test]
    fn test_never_negative() {
        let mut noise = RangeNoise::new(7, 50.0);
        for _ in 0..1000 {
            assert!(noise.apply(1.0) >= 0.0);
        }
    }
}
