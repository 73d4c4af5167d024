use hemrisk_core::{FeatureVector, Probability};

use crate::backend::{Classifier, ModelError};

/// Ask `classifier` for the positive-class probability and clamp it to `[0, 1]`.
pub fn score(
    classifier: &dyn Classifier,
    features: &FeatureVector,
) -> Result<Probability, ModelError> {
    let raw = classifier.predict_proba(features)?;
    if !(0.0..=1.0).contains(&raw) {
        log::debug!(
            "model '{}' returned {raw} outside [0, 1], clamping",
            classifier.name()
        );
    }
    Probability::clamped(raw).ok_or_else(|| {
        ModelError::Inference(format!("model '{}' returned NaN", classifier.name()))
    })
}
