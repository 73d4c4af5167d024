//! Shared fixtures for the hemrisk integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hemrisk::{Config, PredictRequest, RiskService};
use hemrisk_core::{Feature, FeatureVector, RawPatientFeatures, SessionId, FEATURE_COUNT};
use hemrisk_model::{Classifier, ModelError};

/// Classifier that always answers with the same raw value and counts calls.
#[derive(Debug)]
pub struct FixedClassifier {
    value: f64,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedClassifier {
    fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Service with default configuration over a fixed-output classifier.
pub fn service_with(value: f64) -> (RiskService, Arc<FixedClassifier>) {
    let classifier = Arc::new(FixedClassifier::new(value));
    let service = RiskService::with_classifier(Config::default(), classifier.clone())
        .expect("default configuration is valid");
    (service, classifier)
}

/// Raw inputs from whole numbers in model column order.
pub fn raw(values: [i64; FEATURE_COUNT]) -> RawPatientFeatures {
    let mut raw = RawPatientFeatures::default();
    for (feature, value) in Feature::ALL.into_iter().zip(values) {
        raw.set(feature, value as f64);
    }
    raw
}

pub fn request(values: [i64; FEATURE_COUNT]) -> PredictRequest {
    PredictRequest::new(session("S-0A1B2C3D"), raw(values))
}

pub fn session(id: &str) -> SessionId {
    id.parse().expect("valid session id")
}

/// Single organ failure, MDRO-positive pus culture, age 58.
pub const SAMPLE_PATIENT: [i64; FEATURE_COUNT] = [1, 0, 1, 0, 58, 4, 27];

/// Demo stacking ensemble shipped under `demos/`.
pub fn demo_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join("ipn_stack.json")
}

/// Demo configuration shipped under `demos/`.
pub fn demo_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join("hemrisk.toml")
}
