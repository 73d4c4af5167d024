//! Risk bands and the two-threshold categorizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Threshold configuration that cannot be used for banding.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("threshold {0} is not a finite number")]
    NotFinite(f64),

    #[error("threshold {0} is outside 0..=100 percent")]
    OutOfRange(f64),

    #[error("low threshold {low} is above high threshold {high}")]
    Inverted { low: f64, high: f64 },
}

/// Ordered risk band. `Low < Intermediate < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Intermediate,
    High,
}

/// Colours for the result card of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandStyle {
    pub background: &'static str,
    pub accent: &'static str,
}

impl RiskCategory {
    /// Short label as shown on the result card and in exports.
    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Intermediate => "Intermediate",
            RiskCategory::High => "High",
        }
    }

    /// Guidance text shown under the predicted percentage.
    pub fn message(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low estimated risk of intra-abdominal hemorrhage in IPN.",
            RiskCategory::Intermediate => {
                "Intermediate risk of intra-abdominal hemorrhage. Monitoring recommended."
            }
            RiskCategory::High => {
                "High risk of intra-abdominal hemorrhage. Consider CTA, vascular evaluation, \
                 and timely intervention."
            }
        }
    }

    pub fn style(self) -> BandStyle {
        match self {
            RiskCategory::Low => BandStyle {
                background: "#e8f5e9",
                accent: "#43a047",
            },
            RiskCategory::Intermediate => BandStyle {
                background: "#fff8e1",
                accent: "#ffa000",
            },
            RiskCategory::High => BandStyle {
                background: "#ffebee",
                accent: "#e53935",
            },
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pair of band boundaries on the percent scale, `0 <= low <= high <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    low: f64,
    high: f64,
}

impl Thresholds {
    pub const DEFAULT_LOW: f64 = 10.0;
    pub const DEFAULT_HIGH: f64 = 50.0;

    /// Validate a threshold pair. Never reorders or clamps.
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigurationError> {
        for t in [low, high] {
            if !t.is_finite() {
                return Err(ConfigurationError::NotFinite(t));
            }
            if !(0.0..=100.0).contains(&t) {
                return Err(ConfigurationError::OutOfRange(t));
            }
        }
        if low > high {
            return Err(ConfigurationError::Inverted { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Band for a percentage. A value equal to a threshold falls in the higher band.
    pub fn categorize(&self, percent: f64) -> RiskCategory {
        if percent < self.low {
            RiskCategory::Low
        } else if percent < self.high {
            RiskCategory::Intermediate
        } else {
            RiskCategory::High
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: Self::DEFAULT_LOW,
            high: Self::DEFAULT_HIGH,
        }
    }
}

impl<'de> Deserialize<'de> for Thresholds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            low: f64,
            high: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Thresholds::new(raw.low, raw.high).map_err(serde::de::Error::custom)
    }
}

/// Validate `(low, high)` and band `percent` in one step.
pub fn categorize(percent: f64, low: f64, high: f64) -> Result<RiskCategory, ConfigurationError> {
    Ok(Thresholds::new(low, high)?.categorize(percent))
}
