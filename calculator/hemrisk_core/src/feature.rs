//! Patient feature definitions and the feature vector builder.
//!
//! The seven inputs are always handled in the column order the classifier
//! was fit on. [`Feature::ALL`] is that order; every conversion to a
//! [`FeatureVector`] goes through it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 7;

/// Errors raised while turning raw inputs into [`PatientFeatures`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// The value could not be read as a number at all.
    #[error("{feature}: '{value}' is not a number")]
    NotNumeric {
        /// Offending field.
        feature: Feature,
        /// Raw text as supplied.
        value: String,
    },

    /// A numeric value with a fractional part (or NaN/infinity).
    #[error("{feature}: {value} is not a whole number")]
    NotIntegral {
        /// Offending field.
        feature: Feature,
        /// Value as supplied.
        value: f64,
    },

    /// Whole number outside the field's domain.
    #[error("{feature}: {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        /// Offending field.
        feature: Feature,
        /// Value as supplied.
        value: i64,
        /// Lowest accepted value.
        min: i64,
        /// Highest accepted value.
        max: i64,
    },

    /// A field was not supplied.
    #[error("{0}: value is required")]
    Missing(Feature),
}

/// One model input, in model column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Organ failure: none (0), single (1), multiple (2).
    OrganFailure,
    /// Pancreatic fistula present.
    PancreaticFistula,
    /// Multi-drug-resistant organism in pus culture.
    MdroInfection,
    /// Bloodstream infection.
    BloodstreamInfection,
    /// Age in years.
    Age,
    /// Duration of organ failure, days.
    OfDurationDays,
    /// Interval from disease onset to intervention, days.
    OnsetToInterventionDays,
}

impl Feature {
    /// Every feature, in the column order of the trained model.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::OrganFailure,
        Feature::PancreaticFistula,
        Feature::MdroInfection,
        Feature::BloodstreamInfection,
        Feature::Age,
        Feature::OfDurationDays,
        Feature::OnsetToInterventionDays,
    ];

    /// Position of this feature in the model input row.
    pub fn index(self) -> usize {
        match self {
            Feature::OrganFailure => 0,
            Feature::PancreaticFistula => 1,
            Feature::MdroInfection => 2,
            Feature::BloodstreamInfection => 3,
            Feature::Age => 4,
            Feature::OfDurationDays => 5,
            Feature::OnsetToInterventionDays => 6,
        }
    }

    /// Stable snake_case key used in JSON input and configuration.
    pub fn key(self) -> &'static str {
        match self {
            Feature::OrganFailure => "organ_failure",
            Feature::PancreaticFistula => "pancreatic_fistula",
            Feature::MdroInfection => "mdro_infection",
            Feature::BloodstreamInfection => "bloodstream_infection",
            Feature::Age => "age",
            Feature::OfDurationDays => "of_duration_days",
            Feature::OnsetToInterventionDays => "onset_to_intervention_days",
        }
    }

    /// Column name in the training data set.
    pub fn column(self) -> &'static str {
        match self {
            Feature::OrganFailure => "OF_num",
            Feature::PancreaticFistula => "pancreatic_fis",
            Feature::MdroInfection => "pan_MDRO",
            Feature::BloodstreamInfection => "blood_inf",
            Feature::Age => "age",
            Feature::OfDurationDays => "OF_time",
            Feature::OnsetToInterventionDays => "time_sur",
        }
    }

    /// Default human-readable label.
    pub fn default_label(self) -> &'static str {
        match self {
            Feature::OrganFailure => "Organ failure",
            Feature::PancreaticFistula => "Pancreatic fistula",
            Feature::MdroInfection => "Pus MDRO infection",
            Feature::BloodstreamInfection => "Bloodstream infection",
            Feature::Age => "Age",
            Feature::OfDurationDays => "OF duration (days)",
            Feature::OnsetToInterventionDays => "Onset-to-intervention (days)",
        }
    }

    /// Accepted values, inclusive.
    pub fn range(self) -> RangeInclusive<i64> {
        match self {
            Feature::OrganFailure => 0..=2,
            Feature::PancreaticFistula | Feature::MdroInfection | Feature::BloodstreamInfection => {
                0..=1
            }
            Feature::Age => 0..=120,
            Feature::OfDurationDays | Feature::OnsetToInterventionDays => 0..=365,
        }
    }

    /// Value pre-filled in the input form.
    pub fn form_default(self) -> i64 {
        match self {
            Feature::Age => 60,
            _ => 0,
        }
    }

    /// Check a whole number against the domain.
    pub fn check(self, value: i64) -> Result<i64, ValidationError> {
        let range = self.range();
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfRange {
                feature: self,
                value,
                min: *range.start(),
                max: *range.end(),
            })
        }
    }

    /// Coerce a float to a whole number in the domain. `2.0` is accepted, `2.5` is not.
    pub fn coerce(self, value: f64) -> Result<i64, ValidationError> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(ValidationError::NotIntegral {
                feature: self,
                value,
            });
        }
        // float-to-int casts saturate, so huge whole numbers land out of range
        self.check(value as i64)
    }

    /// Parse text as entered in a form field or on the command line.
    pub fn parse(self, text: &str) -> Result<i64, ValidationError> {
        let trimmed = text.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return self.check(v);
        }
        match trimmed.parse::<f64>() {
            Ok(v) => self.coerce(v),
            Err(_) => Err(ValidationError::NotNumeric {
                feature: self,
                value: text.to_string(),
            }),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Validated patient inputs. Construct through [`PatientFeatures::new`] or
/// one of the `TryFrom` conversions; all fields are then inside their domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PatientFeatures {
    organ_failure: u8,
    pancreatic_fistula: u8,
    mdro_infection: u8,
    bloodstream_infection: u8,
    age: u16,
    of_duration_days: u16,
    onset_to_intervention_days: u16,
}

impl PatientFeatures {
    /// Validate and build from whole numbers given in model column order.
    pub fn new(
        organ_failure: i64,
        pancreatic_fistula: i64,
        mdro_infection: i64,
        bloodstream_infection: i64,
        age: i64,
        of_duration_days: i64,
        onset_to_intervention_days: i64,
    ) -> Result<Self, ValidationError> {
        Self::from_values([
            organ_failure,
            pancreatic_fistula,
            mdro_infection,
            bloodstream_infection,
            age,
            of_duration_days,
            onset_to_intervention_days,
        ])
    }

    /// Validate and build from an array in model column order.
    pub fn from_values(values: [i64; FEATURE_COUNT]) -> Result<Self, ValidationError> {
        let mut checked = [0i64; FEATURE_COUNT];
        for (feature, value) in Feature::ALL.into_iter().zip(values) {
            checked[feature.index()] = feature.check(value)?;
        }
        // ranges above guarantee these casts are lossless
        Ok(Self {
            organ_failure: checked[0] as u8,
            pancreatic_fistula: checked[1] as u8,
            mdro_infection: checked[2] as u8,
            bloodstream_infection: checked[3] as u8,
            age: checked[4] as u16,
            of_duration_days: checked[5] as u16,
            onset_to_intervention_days: checked[6] as u16,
        })
    }

    /// Value of a single feature.
    pub fn get(&self, feature: Feature) -> i64 {
        match feature {
            Feature::OrganFailure => i64::from(self.organ_failure),
            Feature::PancreaticFistula => i64::from(self.pancreatic_fistula),
            Feature::MdroInfection => i64::from(self.mdro_infection),
            Feature::BloodstreamInfection => i64::from(self.bloodstream_infection),
            Feature::Age => i64::from(self.age),
            Feature::OfDurationDays => i64::from(self.of_duration_days),
            Feature::OnsetToInterventionDays => i64::from(self.onset_to_intervention_days),
        }
    }

    /// `(feature, value)` pairs in model column order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, i64)> + '_ {
        Feature::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Single-row numeric record for the classifier.
    pub fn to_vector(&self) -> FeatureVector {
        let mut row = [0.0; FEATURE_COUNT];
        for (feature, value) in self.iter() {
            row[feature.index()] = value as f64;
        }
        FeatureVector(row)
    }
}

impl<'de> Deserialize<'de> for PatientFeatures {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPatientFeatures::deserialize(deserializer)?;
        PatientFeatures::try_from(&raw).map_err(serde::de::Error::custom)
    }
}

/// Unvalidated inputs as they arrive from a form or JSON document.
///
/// Numbers are kept as `f64` so that `60.0` and `60` are treated alike;
/// anything fractional is rejected during conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPatientFeatures {
    pub organ_failure: Option<f64>,
    pub pancreatic_fistula: Option<f64>,
    pub mdro_infection: Option<f64>,
    pub bloodstream_infection: Option<f64>,
    pub age: Option<f64>,
    pub of_duration_days: Option<f64>,
    pub onset_to_intervention_days: Option<f64>,
}

impl RawPatientFeatures {
    /// Every field set to its [`Feature::form_default`].
    pub fn form_defaults() -> Self {
        let mut raw = Self::default();
        for feature in Feature::ALL {
            raw.set(feature, feature.form_default() as f64);
        }
        raw
    }

    /// Raw slot for a feature.
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::OrganFailure => self.organ_failure,
            Feature::PancreaticFistula => self.pancreatic_fistula,
            Feature::MdroInfection => self.mdro_infection,
            Feature::BloodstreamInfection => self.bloodstream_infection,
            Feature::Age => self.age,
            Feature::OfDurationDays => self.of_duration_days,
            Feature::OnsetToInterventionDays => self.onset_to_intervention_days,
        }
    }

    /// Set a raw slot.
    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::OrganFailure => &mut self.organ_failure,
            Feature::PancreaticFistula => &mut self.pancreatic_fistula,
            Feature::MdroInfection => &mut self.mdro_infection,
            Feature::BloodstreamInfection => &mut self.bloodstream_infection,
            Feature::Age => &mut self.age,
            Feature::OfDurationDays => &mut self.of_duration_days,
            Feature::OnsetToInterventionDays => &mut self.onset_to_intervention_days,
        };
        *slot = Some(value);
    }
}

impl TryFrom<&RawPatientFeatures> for PatientFeatures {
    type Error = ValidationError;

    fn try_from(raw: &RawPatientFeatures) -> Result<Self, Self::Error> {
        let mut values = [0i64; FEATURE_COUNT];
        for feature in Feature::ALL {
            let value = raw.get(feature).ok_or(ValidationError::Missing(feature))?;
            values[feature.index()] = feature.coerce(value)?;
        }
        PatientFeatures::from_values(values)
    }
}

impl TryFrom<[f64; FEATURE_COUNT]> for PatientFeatures {
    type Error = ValidationError;

    fn try_from(values: [f64; FEATURE_COUNT]) -> Result<Self, Self::Error> {
        let mut whole = [0i64; FEATURE_COUNT];
        for (feature, value) in Feature::ALL.into_iter().zip(values) {
            whole[feature.index()] = feature.coerce(value)?;
        }
        PatientFeatures::from_values(whole)
    }
}

/// Fixed-width numeric row handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
