//! Pacing configuration.

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// A half-open range of delays in milliseconds, `[min, max)`.
///
/// A range whose bounds are equal always yields `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        if self.min >= self.max {
            return Duration::from_millis(self.min);
        }
        Duration::from_millis(rng.gen_range(self.min..self.max))
    }
}

/// Delays used when a script does not give one explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Per-character delay of `write`.
    pub keystroke: DelayRange,
    /// Single-step primitives such as `go` or `delete`.
    pub step: DelayRange,
    /// Per-character delay of `write_parallel`.
    pub parallel: DelayRange,
    /// Per-character delay of [`Director::paste`](crate::Director::paste).
    pub paste: DelayRange,
    /// Pause after each column of `write_lines`, in ms.
    pub column: u64,
    /// Default length of the `delay` operation, in ms.
    pub pause: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            keystroke: DelayRange::new(40, 70),
            step: DelayRange::new(50, 150),
            parallel: DelayRange::new(20, 40),
            paste: DelayRange::new(10, 20),
            column: 20,
            pause: 100,
        }
    }
}

/// Settings for one [`Director`](crate::Director) session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    pub timing: Timing,
    /// Seed for the delay generator; unseeded sessions draw from entropy.
    pub seed: Option<u64>,
}

impl DirectorConfig {
    /// Parse a configuration from YAML. Missing fields keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_fixed_range_is_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(DelayRange::fixed(30).sample(&mut rng), Duration::from_millis(30));
    }

    #[test]
    fn test_sample_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DelayRange::new(40, 70);
        for _ in 0..200 {
            let ms = range.sample(&mut rng).as_millis();
            assert!((40..70).contains(&ms), "got {ms}");
        }
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DirectorConfig::from_yaml("seed: 9\ntiming:\n  pause: 250\n").unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.timing.pause, 250);
        assert_eq!(config.timing.keystroke, DelayRange::new(40, 70));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(DirectorConfig::from_yaml("").unwrap(), DirectorConfig::default());
    }
}
