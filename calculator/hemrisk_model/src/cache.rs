//! Load-once holder for the classifier.
//!
//! A [`ModelCache`] is created once when the service starts and shared by
//! reference with every request. The first successful load is kept for the
//! lifetime of the cache; a failed load stores nothing, so one bad request
//! cannot leave a broken handle behind.

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::ModelArtifact;
use crate::backend::{Classifier, ModelError};

pub struct ModelCache {
    path: PathBuf,
    model: OnceCell<Arc<dyn Classifier>>,
}

impl ModelCache {
    /// Cache that will load the artifact at `path` on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceCell::new(),
        }
    }

    /// Cache that already holds `classifier`; nothing is read from disk.
    pub fn preloaded(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            path: PathBuf::new(),
            model: OnceCell::with_value(classifier),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Shared classifier, loading it on the first call.
    pub fn get(&self) -> Result<Arc<dyn Classifier>, ModelError> {
        if let Some(model) = self.model.get() {
            log::debug!("model cache hit for '{}'", model.name());
            return Ok(Arc::clone(model));
        }
        let model = self.model.get_or_try_init(|| {
            ModelArtifact::load(&self.path).map(|m| Arc::new(m) as Arc<dyn Classifier>)
        })?;
        Ok(Arc::clone(model))
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
