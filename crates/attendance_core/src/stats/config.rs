//! Statistics engine parameters.
//!
//! # Invariants
//! - `0 < target_threshold < 1`.
//! - `average_from <= safe_from <= 100`.
//! - The projection target and the zone bands are independent: changing one
//!   never moves the other.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default target ratio used by "classes needed" projections.
pub const DEFAULT_TARGET_THRESHOLD: f64 = 0.75;
/// Default lower bound (inclusive, percent) of the safe zone.
pub const DEFAULT_SAFE_FROM: u32 = 75;
/// Default lower bound (inclusive, percent) of the average zone.
pub const DEFAULT_AVERAGE_FROM: u32 = 60;

/// Percent boundaries used to band an attendance percentage into zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneBands {
    pub safe_from: u32,
    pub average_from: u32,
}

impl Default for ZoneBands {
    fn default() -> Self {
        Self {
            safe_from: DEFAULT_SAFE_FROM,
            average_from: DEFAULT_AVERAGE_FROM,
        }
    }
}

/// Rejections for statistics engine parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsConfigError {
    ThresholdOutOfRange(f64),
    BandsOutOfOrder { safe_from: u32, average_from: u32 },
}

impl Display for StatsConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThresholdOutOfRange(value) => write!(
                f,
                "target threshold must be strictly between 0 and 1, got {value}"
            ),
            Self::BandsOutOfOrder {
                safe_from,
                average_from,
            } => write!(
                f,
                "zone bands must satisfy average_from <= safe_from <= 100, got average_from={average_from} safe_from={safe_from}"
            ),
        }
    }
}

impl Error for StatsConfigError {}

/// Validated statistics engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsConfig {
    target_threshold: f64,
    bands: ZoneBands,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            target_threshold: DEFAULT_TARGET_THRESHOLD,
            bands: ZoneBands::default(),
        }
    }
}

impl StatsConfig {
    /// Builds a configuration after range checks.
    pub fn new(target_threshold: f64, bands: ZoneBands) -> Result<Self, StatsConfigError> {
        if !(target_threshold > 0.0 && target_threshold < 1.0) {
            return Err(StatsConfigError::ThresholdOutOfRange(target_threshold));
        }
        if bands.average_from > bands.safe_from || bands.safe_from > 100 {
            return Err(StatsConfigError::BandsOutOfOrder {
                safe_from: bands.safe_from,
                average_from: bands.average_from,
            });
        }
        Ok(Self {
            target_threshold,
            bands,
        })
    }

    /// Default bands with a custom projection target.
    pub fn with_target(target_threshold: f64) -> Result<Self, StatsConfigError> {
        Self::new(target_threshold, ZoneBands::default())
    }

    pub fn target_threshold(&self) -> f64 {
        self.target_threshold
    }

    pub fn bands(&self) -> ZoneBands {
        self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::{StatsConfig, StatsConfigError, ZoneBands};

    #[test]
    fn defaults_match_documented_values() {
        let config = StatsConfig::default();
        assert_eq!(config.target_threshold(), 0.75);
        assert_eq!(config.bands().safe_from, 75);
        assert_eq!(config.bands().average_from, 60);
    }

    #[test]
    fn threshold_must_be_open_unit_interval() {
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                StatsConfig::with_target(bad),
                Err(StatsConfigError::ThresholdOutOfRange(_))
            ));
        }
        assert!(StatsConfig::with_target(0.8).is_ok());
    }

    #[test]
    fn target_and_bands_are_independent() {
        let config = StatsConfig::new(
            0.9,
            ZoneBands {
                safe_from: 80,
                average_from: 50,
            },
        )
        .unwrap();
        assert_eq!(config.target_threshold(), 0.9);
        assert_eq!(config.bands().safe_from, 80);
    }

    #[test]
    fn inverted_bands_are_rejected() {
        let err = StatsConfig::new(
            0.75,
            ZoneBands {
                safe_from: 50,
                average_from: 60,
            },
        )
        .unwrap_err();
        assert!(matches!(err, StatsConfigError::BandsOutOfOrder { .. }));
    }
}
