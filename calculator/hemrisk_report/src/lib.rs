//! Report export for the IPN hemorrhage risk calculator
//!
//! Turns a finished prediction into a flat [`ReportRecord`] and renders it
//! as CSV or PDF bytes. Also checks the static explanation images the
//! front end shows beside the result.

pub mod assets;
pub mod pdf;
pub mod record;

pub use assets::{AssetStatus, ExplanationAssets, MissingAssetWarning};
pub use pdf::PdfLayout;
pub use record::{FeatureLabels, ReportError, ReportRecord, ReportSettings, TIMESTAMP_FORMAT};
