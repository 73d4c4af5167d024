//! Classifier trait and error types for model inference

use hemrisk_core::FeatureVector;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or running a model
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Model artifact {} is unavailable: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ModelError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ModelError::Unavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the artifact itself could not be obtained.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ModelError::Unavailable { .. })
    }
}

/// A binary classifier that reports the probability of the positive class.
///
/// Implementations are never mutated after construction and may be shared
/// between threads.
pub trait Classifier: Send + Sync {
    /// Raw positive-class probability for a single feature row.
    ///
    /// The value is not required to lie in `[0, 1]`; callers go through
    /// [`score`](crate::scorer::score) which clamps it.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError>;

    /// Identifier used in logs.
    fn name(&self) -> &str;
}
