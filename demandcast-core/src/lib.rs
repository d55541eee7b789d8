//! # demandcast-core: e-commerce sales quantity forecasting
//!
//! Turns a handful of form inputs (product, price and currency, country, date
//! and hour, customer type) into the 18-column feature record a trained
//! gradient-boosted model expects, runs the model, and presents the result.
//!
//! - [`form`]: choice lists and the validated [`SaleInput`]
//! - [`features`]: currency normalization, calendar features, customer and
//!   product defaults, and the record assembler
//! - [`model`]: the [`Regressor`] seam, the tree ensemble, zip artifacts and
//!   the init-once [`ModelCache`]
//! - [`forecast`]: one prediction end to end
//! - [`presentation`]: demand buckets, progress, and the fixed copy
//! - [`gateway`]: axum web form and JSON API
//! - [`config`]: figment-layered configuration

pub mod config;
pub mod error;
pub mod features;
pub mod forecast;
pub mod form;
pub mod gateway;
pub mod model;
pub mod presentation;

pub use config::{ForecastConfig, FormDefaults, ModelConfig, ServerConfig, load_config};
pub use error::{ForecastError, Result};
pub use features::{AssembledFeatures, FeatureRecord, PriceNotice, assemble};
pub use forecast::{Forecast, Forecaster};
pub use form::{Currency, CustomerType, SaleInput};
pub use gateway::{GatewayState, SharedGateway};
pub use model::{FixedRegressor, ModelArtifact, ModelCache, Regressor, SharedModel, TreeEnsemble};
pub use presentation::DemandLevel;
