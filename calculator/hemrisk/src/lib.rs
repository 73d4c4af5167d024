//! IPN hemorrhage risk calculator.
//!
//! Estimates the probability of clinically significant intra-abdominal
//! hemorrhage in infected pancreatic necrosis from seven clinical inputs,
//! assigns a Low / Intermediate / High band and exports the result as CSV
//! or PDF. [`RiskService`] ties the pieces together; the `hemrisk` binary
//! is a thin command-line front end over it.

pub mod config;
pub mod service;

pub use config::{Config, ConfigError, ModelSettings, ThresholdSettings, DEFAULT_CONFIG_FILE};
pub use service::{PredictRequest, PredictResponse, RiskError, RiskService, ThresholdOverride};
