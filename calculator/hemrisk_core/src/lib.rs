//! Core types for the IPN hemorrhage risk calculator.
//!
//! This crate holds the pure parts of the prediction pipeline: validation
//! of the seven patient inputs into a model-ordered feature vector, the
//! clamped probability type and the two-threshold risk categorizer.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod assessment;
pub mod band;
pub mod feature;
pub mod session;

pub use assessment::{Probability, RiskAssessment};
pub use band::{categorize, BandStyle, ConfigurationError, RiskCategory, Thresholds};
pub use feature::{
    Feature, FeatureVector, PatientFeatures, RawPatientFeatures, ValidationError, FEATURE_COUNT,
};
pub use session::{InvalidSessionId, SessionId};
