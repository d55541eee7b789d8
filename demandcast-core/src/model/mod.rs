//! Model runtime.
//!
//! The [`Regressor`] trait is the seam between feature assembly and whatever
//! produces the log-scale quantity. The shipped implementation is a
//! gradient-boosted tree ensemble ([`TreeEnsemble`]) loaded from a JSON
//! artifact, optionally packed in a zip archive ([`ModelArtifact`]) and kept
//! for the life of the process by [`ModelCache`].

pub mod artifact;
pub mod cache;
pub mod ensemble;

pub use artifact::ModelArtifact;
pub use cache::{ModelCache, SharedModel};
pub use ensemble::{Node, Split, Tree, TreeEnsemble};

use crate::error::Result;
use crate::features::FeatureRecord;

/// A model that predicts `ln(1 + quantity)` for one feature record.
pub trait Regressor: Send + Sync {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Model version string, empty if unknown.
    fn version(&self) -> &str {
        ""
    }

    /// Predict on the log scale. Callers apply `exp_m1` to get a quantity.
    fn predict_log(&self, record: &FeatureRecord) -> Result<f64>;
}

/// A regressor that always returns the same log-scale value.
///
/// Useful for wiring tests and demos without a trained artifact.
#[derive(Debug, Clone)]
pub struct FixedRegressor {
    name: String,
    log_output: f64,
}

impl FixedRegressor {
    pub fn new(log_output: f64) -> Self {
        Self {
            name: "fixed".to_string(),
            log_output,
        }
    }

    /// A regressor whose inverse-transformed output is exactly `quantity`.
    pub fn with_quantity(quantity: f64) -> Self {
        Self::new(quantity.ln_1p())
    }
}

impl Regressor for FixedRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_log(&self, _record: &FeatureRecord) -> Result<f64> {
        Ok(self.log_output)
    }
}
