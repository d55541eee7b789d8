//! Init-once model handle.
//!
//! The first successful load is kept for the life of the process and handed
//! out as a shared, read-only `Arc`. A failed load leaves the slot empty, so
//! the next request tries again (for example after the archive is dropped in).
//! Loads are serialized, so concurrent first requests extract and parse the
//! artifact once.

use super::Regressor;
use super::artifact::ModelArtifact;
use crate::error::{ForecastError, Result};
use std::sync::{Arc, Mutex, OnceLock};

/// Thread-safe shared model handle.
pub type SharedModel = Arc<dyn Regressor>;

/// Lazily loaded, never replaced model slot.
pub struct ModelCache {
    artifact: Option<ModelArtifact>,
    slot: OnceLock<SharedModel>,
    loading: Mutex<()>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("artifact", &self.artifact)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ModelCache {
    /// A cache that loads `artifact` on first use.
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Some(artifact),
            slot: OnceLock::new(),
            loading: Mutex::new(()),
        }
    }

    /// A cache that already holds `model` and never touches the filesystem.
    pub fn preloaded(model: SharedModel) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(model);
        Self {
            artifact: None,
            slot,
            loading: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The model, if it has already been loaded. Never touches the disk.
    pub fn loaded(&self) -> Option<SharedModel> {
        self.slot.get().map(Arc::clone)
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }

    /// Return the cached model, loading it on the first call.
    pub fn get_or_load(&self) -> Result<SharedModel> {
        if let Some(model) = self.loaded() {
            return Ok(model);
        }
        // A panicked loader leaves nothing behind in the slot, so the guard is still usable.
        let _guard = self
            .loading
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(model) = self.loaded() {
            return Ok(model);
        }
        let artifact = self
            .artifact
            .as_ref()
            .ok_or_else(|| ForecastError::artifact("no model artifact configured"))?;
        let loaded: SharedModel = Arc::new(artifact.load()?);
        Ok(Arc::clone(self.slot.get_or_init(|| loaded)))
    }
}
