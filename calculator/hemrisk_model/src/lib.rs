//! Model loading and scoring for the IPN hemorrhage risk calculator
//!
//! The trained classifier is consumed only through the [`Classifier`]
//! trait. [`ModelArtifact`] is the bundled implementation, read from a JSON
//! file describing a stacking ensemble; [`ModelCache`] keeps one loaded
//! instance for the life of the process.

pub mod artifact;
pub mod backend;
pub mod cache;
pub mod estimator;
pub mod scorer;

pub use artifact::{ModelArtifact, ModelVersion};
pub use backend::{Classifier, ModelError};
pub use cache::ModelCache;
pub use estimator::{Estimator, TreeNode};
pub use scorer::score;
