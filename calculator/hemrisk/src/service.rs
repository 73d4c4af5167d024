//! Request pipeline: validate → score → categorize → report.
//!
//! [`RiskService`] is built once per process and shared by reference with
//! every request. Its only shared state is the read-only model held in the
//! [`ModelCache`]; each request gets its own [`PredictResponse`].

use chrono::NaiveDateTime;
use hemrisk_core::{
    ConfigurationError, PatientFeatures, RawPatientFeatures, RiskAssessment, SessionId,
    Thresholds, ValidationError,
};
use hemrisk_model::{score, Classifier, ModelCache, ModelError};
use hemrisk_report::{AssetStatus, PdfLayout, ReportError, ReportRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;

/// Errors a single prediction request can end with. None of them affect
/// later requests.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid thresholds: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("{0}")]
    ModelUnavailable(ModelError),
    #[error("{0}")]
    Inference(ModelError),
    #[error("{0}")]
    Report(#[from] ReportError),
}

impl From<ModelError> for RiskError {
    fn from(err: ModelError) -> Self {
        if err.is_unavailable() {
            RiskError::ModelUnavailable(err)
        } else {
            RiskError::Inference(err)
        }
    }
}

/// Per-request threshold overrides; unset values come from the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub session_id: SessionId,
    pub features: RawPatientFeatures,
    #[serde(default)]
    pub thresholds: ThresholdOverride,
}

impl PredictRequest {
    pub fn new(session_id: SessionId, features: RawPatientFeatures) -> Self {
        Self {
            session_id,
            features,
            thresholds: ThresholdOverride::default(),
        }
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.thresholds = ThresholdOverride {
            low: Some(low),
            high: Some(high),
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    pub session_id: SessionId,
    pub features: PatientFeatures,
    pub assessment: RiskAssessment,
}

pub struct RiskService {
    config: Config,
    thresholds: Thresholds,
    models: ModelCache,
}

impl RiskService {
    /// Service that loads the model from `config.model.path` on first use.
    pub fn new(config: Config) -> Result<Self, RiskError> {
        let models = ModelCache::new(&config.model.path);
        Self::with_cache(config, models)
    }

    /// Service backed by an already constructed classifier.
    pub fn with_classifier(
        config: Config,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, RiskError> {
        Self::with_cache(config, ModelCache::preloaded(classifier))
    }

    fn with_cache(config: Config, models: ModelCache) -> Result<Self, RiskError> {
        let thresholds = config.thresholds.validated()?;
        Ok(Self {
            config,
            thresholds,
            models,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Loaded classifier (loading it if this is the first call).
    pub fn classifier(&self) -> Result<Arc<dyn Classifier>, RiskError> {
        Ok(self.models.get()?)
    }

    fn resolve_thresholds(&self, request: &ThresholdOverride) -> Result<Thresholds, RiskError> {
        if request.low.is_none() && request.high.is_none() {
            return Ok(self.thresholds);
        }
        Ok(Thresholds::new(
            request.low.unwrap_or(self.thresholds.low()),
            request.high.unwrap_or(self.thresholds.high()),
        )?)
    }

    /// Run one prediction. Inputs and thresholds are checked before the
    /// model is touched.
    pub fn handle_predict_request(
        &self,
        request: &PredictRequest,
    ) -> Result<PredictResponse, RiskError> {
        let features = PatientFeatures::try_from(&request.features).map_err(|e| {
            log::debug!("rejected request from {}: {e}", request.session_id);
            e
        })?;
        let thresholds = self.resolve_thresholds(&request.thresholds)?;

        let classifier = self.classifier()?;
        let probability = score(classifier.as_ref(), &features.to_vector())?;
        let assessment = RiskAssessment::new(probability, &thresholds);
        log::info!(
            "session {}: {:.1}% ({})",
            request.session_id,
            assessment.percent(),
            assessment.category()
        );

        Ok(PredictResponse {
            session_id: request.session_id.clone(),
            features,
            assessment,
        })
    }

    pub fn report(&self, response: &PredictResponse, timestamp: NaiveDateTime) -> ReportRecord {
        ReportRecord::assemble(
            &response.session_id,
            timestamp,
            &response.features,
            &response.assessment,
            &self.config.report.labels,
        )
    }

    pub fn export_csv(
        &self,
        response: &PredictResponse,
        timestamp: NaiveDateTime,
    ) -> Result<Vec<u8>, RiskError> {
        Ok(self.report(response, timestamp).to_csv()?)
    }

    pub fn export_pdf(&self, response: &PredictResponse, timestamp: NaiveDateTime) -> Vec<u8> {
        self.report(response, timestamp)
            .to_pdf(&self.config.report, &PdfLayout::default())
    }

    /// Presence of the configured explanation images.
    pub fn explanation_assets(&self) -> Vec<AssetStatus> {
        self.config.assets.check()
    }
}
