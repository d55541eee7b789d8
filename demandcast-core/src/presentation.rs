//! Presentation derivations and the fixed copy shown around a prediction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity at which the progress bar is full.
pub const PROGRESS_FULL_AT: f64 = 100.0;
/// Quantities below this are low demand.
pub const MEDIUM_DEMAND_FROM: f64 = 10.0;
/// Quantities at or above this are high demand.
pub const HIGH_DEMAND_FROM: f64 = 50.0;

pub const APP_TITLE: &str = "🛒E-Commerce Sales Forecasting App";

pub const INTRO: &str = "This app predicts the expected sales quantity for a product based on your input. \
Only a few fields are required. All other features are handled automatically for you!";

pub const DEFAULTS_NOTE: &str = "ℹ️ Note: Some features are set to average/default values for a smooth user experience. \
For more accurate predictions, connect to your database for real customer/product stats.";

pub const TIPS: [&str; 3] = [
    "Use real product codes and prices for your business.",
    "Sale date should be the actual date of transaction.",
    "For advanced use, connect your app to your product/customer database.",
];

pub const LIMITATIONS: [&str; 4] = [
    "Trained on 2010-2011 e-commerce data (mostly UK sales).",
    "May be less accurate for other countries or recent years.",
    "Does not account for promotions, holidays, or external events.",
    "Best for products/customers similar to the training data.",
];

pub const DISCLAIMER: &str = "Disclaimer: Results are for informational purposes. \
For real-world deployment, please validate the model on your own data.";

/// Demand bucket for a predicted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl DemandLevel {
    pub fn from_quantity(quantity: f64) -> Self {
        if quantity < MEDIUM_DEMAND_FROM {
            DemandLevel::Low
        } else if quantity < HIGH_DEMAND_FROM {
            DemandLevel::Medium
        } else {
            DemandLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DemandLevel::Low => "Low Demand",
            DemandLevel::Medium => "Medium Demand",
            DemandLevel::High => "High Demand",
        }
    }

    /// Label with its traffic-light marker.
    pub fn badge(&self) -> &'static str {
        match self {
            DemandLevel::Low => "🔴 Low Demand",
            DemandLevel::Medium => "🟡 Medium Demand",
            DemandLevel::High => "🟢 High Demand",
        }
    }

    /// Lower-case identifier, used as a CSS class.
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::Low => "low",
            DemandLevel::Medium => "medium",
            DemandLevel::High => "high",
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fraction of the progress bar to fill, in `[0.0, 1.0]`.
pub fn progress_fraction(quantity: f64) -> f64 {
    (quantity / PROGRESS_FULL_AT).clamp(0.0, 1.0)
}

/// Quantity as displayed: two decimals.
pub fn format_quantity(quantity: f64) -> String {
    format!("{:.2}", quantity)
}

/// Plain-language reading of the predicted quantity.
pub fn explanation(quantity: f64) -> String {
    format!(
        "This {} is the expected number of units you are likely to sell for the given product and transaction details. \
For example, if the predicted quantity is 8.5, it means you can expect to sell around 8 or 9 units in this scenario.",
        format_quantity(quantity)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_boundaries() {
        assert_eq!(DemandLevel::from_quantity(9.99), DemandLevel::Low);
        assert_eq!(DemandLevel::from_quantity(10.0), DemandLevel::Medium);
        assert_eq!(DemandLevel::from_quantity(49.99), DemandLevel::Medium);
        assert_eq!(DemandLevel::from_quantity(50.0), DemandLevel::High);
        assert_eq!(DemandLevel::from_quantity(-0.5), DemandLevel::Low);
    }

    #[test]
    fn test_badges() {
        assert_eq!(DemandLevel::Low.badge(), "🔴 Low Demand");
        assert_eq!(DemandLevel::Medium.badge(), "🟡 Medium Demand");
        assert_eq!(DemandLevel::High.badge(), "🟢 High Demand");
        assert_eq!(DemandLevel::High.to_string(), "High Demand");
        assert_eq!(serde_json::to_string(&DemandLevel::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_progress_is_bounded() {
        assert_eq!(progress_fraction(0.0), 0.0);
        assert_eq!(progress_fraction(25.0), 0.25);
        assert_eq!(progress_fraction(100.0), 1.0);
        assert_eq!(progress_fraction(250.0), 1.0);
        assert_eq!(progress_fraction(-0.4), 0.0);
    }

    #[test]
    fn test_explanation_uses_two_decimals() {
        let text = explanation(8.456);
        assert!(text.starts_with("This 8.46 is the expected number of units"));
        assert_eq!(format_quantity(12.0), "12.00");
    }
}
