//! HTTP surface: the server-rendered form, a JSON prediction endpoint and a
//! health check, built on axum.

pub mod pages;
pub mod server;

pub use pages::{FormSubmission, PageContext, PageRenderer};
pub use server::{SharedGateway, router, run};

use crate::config::FormDefaults;
use crate::error::{ForecastError, Result};
use crate::forecast::{Forecast, Forecaster};
use crate::form::SaleInput;
use crate::model::{ModelCache, SharedModel};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// State shared by every request handler.
#[derive(Debug)]
pub struct GatewayState {
    models: Arc<ModelCache>,
    defaults: FormDefaults,
    pages: PageRenderer,
    started_at: DateTime<Utc>,
}

impl GatewayState {
    /// Fails only if the page templates do not compile.
    pub fn new(models: ModelCache, defaults: FormDefaults) -> Result<Self> {
        Ok(Self {
            models: Arc::new(models),
            defaults,
            pages: PageRenderer::new()?,
            started_at: Utc::now(),
        })
    }

    pub fn defaults(&self) -> &FormDefaults {
        &self.defaults
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    pub fn pages(&self) -> &PageRenderer {
        &self.pages
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// The shared model. The first load (file read, maybe zip extraction)
    /// runs on the blocking pool, off the async workers.
    pub async fn model(&self) -> Result<SharedModel> {
        if let Some(model) = self.models.loaded() {
            return Ok(model);
        }
        let models = Arc::clone(&self.models);
        tokio::task::spawn_blocking(move || models.get_or_load())
            .await
            .map_err(|e| ForecastError::model(format!("model load task failed: {}", e)))?
    }

    /// Load the model if needed, then forecast.
    pub async fn forecast(&self, input: &SaleInput) -> Result<Forecast> {
        let model = self.model().await?;
        Forecaster::new(model).forecast(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelArtifact;
    use crate::model::ensemble::{Node, Tree, TreeEnsemble};
    use tempfile::TempDir;

    fn lazy_gateway(dir: &TempDir) -> GatewayState {
        let cache = ModelCache::new(ModelArtifact::new(
            dir.path().join("model.json"),
            dir.path().join("model.zip"),
        ));
        GatewayState::new(cache, FormDefaults::default()).unwrap()
    }

    #[tokio::test]
    async fn test_model_loads_once_across_requests() {
        let dir = TempDir::new().unwrap();
        let model = TreeEnsemble::new("served", 1.0, vec![Tree::new(vec![Node::leaf(0, 0.5)])]);
        std::fs::write(
            dir.path().join("model.json"),
            serde_json::to_string(&model).unwrap(),
        )
        .unwrap();

        let gw = lazy_gateway(&dir);
        assert!(!gw.models().is_loaded());
        let first = gw.model().await.unwrap();
        assert!(gw.models().is_loaded());
        let second = gw.model().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "served");
    }

    #[tokio::test]
    async fn test_forecast_reports_missing_model() {
        let dir = TempDir::new().unwrap();
        let gw = lazy_gateway(&dir);
        let input = FormSubmission::from_defaults(gw.defaults())
            .to_sale_input()
            .unwrap();
        let err = gw.forecast(&input).await.unwrap_err();
        assert!(matches!(err, ForecastError::Artifact(_)));
        assert!(!gw.models().is_loaded());
    }
}
