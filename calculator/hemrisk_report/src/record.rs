//! Flat key/value report of one prediction.

use chrono::NaiveDateTime;
use hemrisk_core::{Feature, PatientFeatures, RiskAssessment, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pdf::{self, PdfLayout};

/// Format of the `Timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Display labels for the seven features. Unset entries use
/// [`Feature::default_label`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organ_failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pancreatic_fistula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdro_infection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloodstream_infection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of_duration_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset_to_intervention_days: Option<String>,
}

impl FeatureLabels {
    fn slot(&mut self, feature: Feature) -> &mut Option<String> {
        match feature {
            Feature::OrganFailure => &mut self.organ_failure,
            Feature::PancreaticFistula => &mut self.pancreatic_fistula,
            Feature::MdroInfection => &mut self.mdro_infection,
            Feature::BloodstreamInfection => &mut self.bloodstream_infection,
            Feature::Age => &mut self.age,
            Feature::OfDurationDays => &mut self.of_duration_days,
            Feature::OnsetToInterventionDays => &mut self.onset_to_intervention_days,
        }
    }

    pub fn label(&self, feature: Feature) -> &str {
        let custom = match feature {
            Feature::OrganFailure => &self.organ_failure,
            Feature::PancreaticFistula => &self.pancreatic_fistula,
            Feature::MdroInfection => &self.mdro_infection,
            Feature::BloodstreamInfection => &self.bloodstream_infection,
            Feature::Age => &self.age,
            Feature::OfDurationDays => &self.of_duration_days,
            Feature::OnsetToInterventionDays => &self.onset_to_intervention_days,
        };
        custom.as_deref().unwrap_or_else(|| feature.default_label())
    }

    pub fn with_label(mut self, feature: Feature, label: impl Into<String>) -> Self {
        *self.slot(feature) = Some(label.into());
        self
    }
}

/// Report titles and naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub institution: String,
    pub title: String,
    pub file_stem: String,
    pub labels: FeatureLabels,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            institution: "Xiangya Hospital".into(),
            title: "IPN Hemorrhage Risk Report".into(),
            file_stem: "IPN_hemorrhage_report".into(),
            labels: FeatureLabels::default(),
        }
    }
}

/// Ordered `(key, value)` pairs describing one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    session_id: SessionId,
    fields: Vec<(String, String)>,
}

impl ReportRecord {
    /// Assemble the record. The timestamp is supplied by the caller so the
    /// output depends on the arguments only.
    pub fn assemble(
        session_id: &SessionId,
        timestamp: NaiveDateTime,
        features: &PatientFeatures,
        assessment: &RiskAssessment,
        labels: &FeatureLabels,
    ) -> Self {
        let mut fields = vec![
            ("Session ID".to_string(), session_id.to_string()),
            (
                "Timestamp".to_string(),
                timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ),
            (
                "Probability".to_string(),
                format!("{:.4}", assessment.probability()),
            ),
            ("Risk (%)".to_string(), format!("{:.1}", assessment.percent())),
            (
                "Risk category".to_string(),
                assessment.category().label().to_string(),
            ),
            (
                "Low threshold (%)".to_string(),
                format!("{:.1}", assessment.low_threshold()),
            ),
            (
                "High threshold (%)".to_string(),
                format!("{:.1}", assessment.high_threshold()),
            ),
        ];
        fields.extend(
            features
                .iter()
                .map(|(feature, value)| (labels.label(feature).to_string(), value.to_string())),
        );
        Self {
            session_id: session_id.clone(),
            fields,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Header row followed by a single data row.
    pub fn to_csv(&self) -> Result<Vec<u8>, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(self.keys())?;
        writer.write_record(self.fields.iter().map(|(_, v)| v.as_str()))?;
        writer.flush()?;
        writer.into_inner().map_err(|e| ReportError::Io(e.into_error()))
    }

    /// Single-document PDF with a two-line title and one `Key: Value` line per field.
    pub fn to_pdf(&self, settings: &ReportSettings, layout: &PdfLayout) -> Vec<u8> {
        let title = [settings.institution.as_str(), settings.title.as_str()];
        let lines: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        pdf::render(&title, &lines, layout)
    }

    /// Download name such as `IPN_hemorrhage_report_S-1A2B3C4D.pdf`.
    pub fn file_name(&self, settings: &ReportSettings, extension: &str) -> String {
        format!("{}_{}.{}", settings.file_stem, self.session_id, extension)
    }
}
