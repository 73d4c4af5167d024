use serde::Serialize;

use crate::band::{RiskCategory, Thresholds};

/// Class-1 probability, always inside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Probability(f64);

impl Probability {
    /// Clamp a finite raw model output into `[0, 1]`.
    ///
    /// Returns `None` for NaN, which has no position on the scale.
    pub fn clamped(raw: f64) -> Option<Self> {
        if raw.is_nan() {
            None
        } else {
            Some(Self(raw.clamp(0.0, 1.0)))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Same value on the percent scale.
    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

/// Outcome of one prediction. Built fresh per request and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    probability: Probability,
    percent: f64,
    category: RiskCategory,
    low_threshold: f64,
    high_threshold: f64,
}

impl RiskAssessment {
    pub fn new(probability: Probability, thresholds: &Thresholds) -> Self {
        let percent = probability.percent();
        Self {
            probability,
            percent,
            category: thresholds.categorize(percent),
            low_threshold: thresholds.low(),
            high_threshold: thresholds.high(),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability.value()
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn category(&self) -> RiskCategory {
        self.category
    }

    pub fn low_threshold(&self) -> f64 {
        self.low_threshold
    }

    pub fn high_threshold(&self) -> f64 {
        self.high_threshold
    }
}
