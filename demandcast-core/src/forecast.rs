//! One prediction, end to end: assemble, predict, inverse-transform, present.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureRecord, PriceNotice, assemble};
use crate::form::SaleInput;
use crate::model::SharedModel;
use crate::presentation::{DemandLevel, progress_fraction};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything shown to the user after pressing "Predict".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Predicted units, `exp(log_prediction) - 1`.
    pub quantity: f64,
    /// Raw model output on the log scale.
    pub log_prediction: f64,
    pub demand: DemandLevel,
    /// Progress bar fill in `[0.0, 1.0]`.
    pub progress: f64,
    /// The exact row the model saw.
    pub record: FeatureRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<PriceNotice>,
}

/// Runs forecasts against a shared model.
#[derive(Clone)]
pub struct Forecaster {
    model: SharedModel,
}

impl std::fmt::Debug for Forecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forecaster")
            .field("model", &self.model.name())
            .finish()
    }
}

impl Forecaster {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Predict the sales quantity for one set of form inputs.
    pub fn forecast(&self, input: &SaleInput) -> Result<Forecast> {
        let assembled = assemble(input)?;
        let log_prediction = self.model.predict_log(&assembled.record)?;
        if !log_prediction.is_finite() {
            return Err(ForecastError::model(format!(
                "{} returned a non-finite prediction",
                self.model.name()
            )));
        }
        let quantity = log_prediction.exp_m1();
        let demand = DemandLevel::from_quantity(quantity);

        info!(
            model = self.model.name(),
            stock_code = %assembled.record.stock_code,
            quantity,
            demand = demand.as_str(),
            "Forecast complete"
        );

        Ok(Forecast {
            quantity,
            log_prediction,
            demand,
            progress: progress_fraction(quantity),
            record: assembled.record,
            notice: assembled.notice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Currency, CustomerType};
    use crate::model::{FixedRegressor, Regressor};
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct BrokenRegressor;

    impl Regressor for BrokenRegressor {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict_log(&self, _record: &FeatureRecord) -> Result<f64> {
            Err(ForecastError::model("weights corrupted"))
        }
    }

    fn reference_input() -> SaleInput {
        SaleInput {
            product_code: "85123A".into(),
            unit_price: 2.55,
            currency: Currency::Gbp,
            exchange_rate: None,
            country: "united kingdom".into(),
            sale_date: NaiveDate::from_ymd_opt(2011, 12, 1).unwrap(),
            hour: 8,
            customer_type: CustomerType::Guest,
        }
    }

    #[test]
    fn test_inverse_transform_and_bucket() {
        let log = 2.5_f64;
        let forecaster = Forecaster::new(Arc::new(FixedRegressor::new(log)));
        let forecast = forecaster.forecast(&reference_input()).unwrap();
        assert_eq!(forecast.log_prediction, log);
        assert_eq!(forecast.quantity, log.exp_m1());
        assert_eq!(forecast.demand, DemandLevel::Medium);
        assert!((forecast.progress - log.exp_m1() / 100.0).abs() < 1e-12);
        assert_eq!(forecast.record.invoice_day_of_week, 3);
        assert_eq!(forecast.record.recency, 30);
        assert!(forecast.notice.is_none());
    }

    #[test]
    fn test_high_demand_caps_progress() {
        let forecaster = Forecaster::new(Arc::new(FixedRegressor::with_quantity(180.0)));
        let forecast = forecaster.forecast(&reference_input()).unwrap();
        assert_eq!(forecast.demand, DemandLevel::High);
        assert_eq!(forecast.progress, 1.0);
    }

    #[test]
    fn test_notice_is_carried() {
        let forecaster = Forecaster::new(Arc::new(FixedRegressor::new(1.0)));
        let input = SaleInput {
            currency: Currency::Eur,
            exchange_rate: Some("abc".into()),
            ..reference_input()
        };
        let forecast = forecaster.forecast(&input).unwrap();
        assert!(forecast.notice.unwrap().is_warning());
    }

    #[test]
    fn test_model_errors_propagate() {
        let forecaster = Forecaster::new(Arc::new(BrokenRegressor));
        let err = forecaster.forecast(&reference_input()).unwrap_err();
        assert!(matches!(err, ForecastError::Model(_)));
    }

    #[test]
    fn test_non_finite_prediction_is_rejected() {
        let forecaster = Forecaster::new(Arc::new(FixedRegressor::new(f64::INFINITY)));
        assert!(forecaster.forecast(&reference_input()).is_err());
    }

    #[test]
    fn test_forecast_serializes_record_columns() {
        let forecaster = Forecaster::new(Arc::new(FixedRegressor::new(0.5)));
        let forecast = forecaster.forecast(&reference_input()).unwrap();
        let json = serde_json::to_value(&forecast).unwrap();
        assert_eq!(json["demand"], "low");
        assert_eq!(json["record"]["InvoiceQuarter"], 4);
        assert!(json.get("notice").is_none());
    }
}
