//! Pre-rendered SHAP explanation images shown next to the result.
//!
//! The images are displayed verbatim by the front end. A missing file only
//! produces a warning; it never fails a request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationAssets {
    /// SHAP summary plot for the base learners.
    pub base_learners: PathBuf,
    /// SHAP summary plot for the final stacking model.
    pub stacking_model: PathBuf,
}

impl Default for ExplanationAssets {
    fn default() -> Self {
        Self {
            base_learners: PathBuf::from("summary_plot.png"),
            stacking_model: PathBuf::from("overall_shap.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetStatus {
    pub caption: &'static str,
    pub path: PathBuf,
    pub present: bool,
}

/// Non-fatal notice that an explanation image is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingAssetWarning {
    pub caption: &'static str,
    pub path: PathBuf,
}

impl fmt::Display for MissingAssetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        write!(f, "{name} not found.")
    }
}

impl ExplanationAssets {
    /// Resolve relative asset paths against `base`.
    pub fn relative_to(&self, base: &Path) -> Self {
        Self {
            base_learners: base.join(&self.base_learners),
            stacking_model: base.join(&self.stacking_model),
        }
    }

    /// Status of each image, base learners first.
    pub fn check(&self) -> Vec<AssetStatus> {
        [
            ("SHAP — Base learners", &self.base_learners),
            ("SHAP — Final stacking model", &self.stacking_model),
        ]
        .into_iter()
        .map(|(caption, path)| {
            let present = path.is_file();
            if !present {
                log::warn!("explanation image {} not found", path.display());
            }
            AssetStatus {
                caption,
                path: path.clone(),
                present,
            }
        })
        .collect()
    }

    /// Warnings for the missing images. Checks the files once.
    pub fn warnings(&self) -> Vec<MissingAssetWarning> {
        self.check().iter().filter_map(AssetStatus::warning).collect()
    }
}

impl AssetStatus {
    /// Warning for this image if it is absent.
    pub fn warning(&self) -> Option<MissingAssetWarning> {
        (!self.present).then(|| MissingAssetWarning {
            caption: self.caption,
            path: self.path.clone(),
        })
    }
}
