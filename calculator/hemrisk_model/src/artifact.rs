//! On-disk model artifact: metadata plus an estimator tree, stored as JSON.

use hemrisk_core::{Feature, FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::{Classifier, ModelError};
use crate::estimator::Estimator;

/// Semantic version for models
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ModelVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(format!("Invalid version format: {s}"));
        }
        let major = parts[0]
            .parse()
            .map_err(|_| format!("Invalid major version: {}", parts[0]))?;
        let minor = parts[1]
            .parse()
            .map_err(|_| format!("Invalid minor version: {}", parts[1]))?;
        let patch = parts[2]
            .parse()
            .map_err(|_| format!("Invalid patch version: {}", parts[2]))?;
        Ok(Self::new(major, minor, patch))
    }
}

impl TryFrom<String> for ModelVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ModelVersion::parse(&value)
    }
}

impl From<ModelVersion> for String {
    fn from(v: ModelVersion) -> Self {
        v.to_string()
    }
}

impl std::fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A trained binary classifier as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: ModelVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Column order the model was fit on. Checked against [`Feature::ALL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Canonical training column names in model input order.
    pub fn expected_columns() -> Vec<&'static str> {
        Feature::ALL.iter().map(|f| f.column()).collect()
    }

    /// Parse and validate an artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(json)
            .map_err(|e| ModelError::InvalidArtifact(format!("malformed JSON: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read, parse and validate an artifact file.
    ///
    /// Every failure, including a file that parses but cannot safely be
    /// used, is reported as [`ModelError::Unavailable`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ModelError::unavailable(path, e))?;
        let artifact = Self::from_json(&json).map_err(|e| match e {
            ModelError::InvalidArtifact(reason) => ModelError::unavailable(path, reason),
            other => other,
        })?;
        log::info!(
            "loaded model '{}' v{} from {} ({})",
            artifact.name,
            artifact.version,
            path.display(),
            artifact.estimator.summary()
        );
        Ok(artifact)
    }

    /// Check column order and estimator structure.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(names) = &self.feature_names {
            let expected = Self::expected_columns();
            if names.len() != expected.len() || names.iter().zip(&expected).any(|(a, b)| a != b) {
                return Err(ModelError::InvalidArtifact(format!(
                    "model was fit on columns [{}], expected [{}]",
                    names.join(", "),
                    expected.join(", ")
                )));
            }
        }
        self.estimator.validate(FEATURE_COUNT)
    }
}

impl Classifier for ModelArtifact {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.estimator.predict_proba(features.as_slice())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
