//! Form input model.
//!
//! The choice lists offered by the form, and [`SaleInput`], the validated
//! boundary type every surface (web form, JSON API, CLI) converts into
//! before anything is assembled.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel choice meaning "not in the list, enter it yourself".
pub const OTHER_CHOICE: &str = "other";

/// Product codes (SKUs) offered in the product selector.
pub const PRODUCT_CODES: [&str; 5] = ["85123A", "85099B", "22423", "47566", "20725"];

/// Countries offered in the country selector, lower-cased as the model was trained.
pub const COUNTRIES: [&str; 10] = [
    "united kingdom",
    "france",
    "germany",
    "spain",
    "netherlands",
    "switzerland",
    "portugal",
    "italy",
    "norway",
    OTHER_CHOICE,
];

/// Currency the user typed the unit price in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "PKR")]
    Pkr,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "Other")]
    Other,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Gbp,
        Currency::Pkr,
        Currency::Usd,
        Currency::Eur,
        Currency::Other,
    ];

    /// Short code shown next to amounts.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Pkr => "PKR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Other => "Other",
        }
    }

    /// Label shown in the currency selector.
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP (British Pound)",
            Currency::Pkr => "PKR (Pakistani Rupee)",
            Currency::Usd => "USD (US Dollar)",
            Currency::Eur => "EUR (Euro)",
            Currency::Other => "Other",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    /// Accepts the code or the selector label, case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Unknown currency: '{}'. Use one of: GBP, PKR, USD, EUR, Other",
                    wanted
                )
            })
    }
}

/// Whether the buyer is a registered customer or checked out as a guest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    #[default]
    Registered,
    Guest,
}

impl CustomerType {
    pub const ALL: [CustomerType; 2] = [CustomerType::Registered, CustomerType::Guest];

    pub fn label(&self) -> &'static str {
        match self {
            CustomerType::Registered => "Registered",
            CustomerType::Guest => "Guest",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registered" => Ok(CustomerType::Registered),
            "guest" => Ok(CustomerType::Guest),
            other => Err(format!(
                "Unknown customer type: '{}'. Use 'registered' or 'guest'",
                other
            )),
        }
    }
}

/// Resolve the product selector: picking "other" means the free-text code is used.
pub fn resolve_product_code(selected: &str, custom: &str) -> String {
    if selected.trim().eq_ignore_ascii_case(OTHER_CHOICE) {
        custom.trim().to_string()
    } else {
        selected.trim().to_string()
    }
}

/// Normalize a country to the lower-case spelling used by the selector.
pub fn normalize_country(country: &str) -> String {
    country.trim().to_lowercase()
}

/// Everything the user supplies for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleInput {
    /// Product code; any non-empty string, not checked against a catalog.
    pub product_code: String,
    /// Price per unit in `currency`.
    pub unit_price: f64,
    #[serde(default)]
    pub currency: Currency,
    /// Raw exchange rate text, "1 GBP = rate units of `currency`".
    /// JSON numbers are accepted and kept as their text form.
    #[serde(default, deserialize_with = "deserialize_rate")]
    pub exchange_rate: Option<String>,
    pub country: String,
    pub sale_date: NaiveDate,
    pub hour: u32,
    #[serde(default)]
    pub customer_type: CustomerType,
}

/// Keep whatever the client sent as rate text. Parsing happens later and an
/// unusable rate only produces a warning.
fn deserialize_rate<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }))
}

impl SaleInput {
    /// Check the constraints the form widgets would otherwise enforce.
    pub fn validate(&self) -> Result<()> {
        if self.product_code.trim().is_empty() {
            return Err(ForecastError::invalid_input("product code cannot be empty"));
        }
        if !self.unit_price.is_finite() || self.unit_price <= 0.0 {
            return Err(ForecastError::invalid_input(format!(
                "unit price must be a positive number, got {}",
                self.unit_price
            )));
        }
        if self.hour > 23 {
            return Err(ForecastError::invalid_input(format!(
                "hour must be between 0 and 23, got {}",
                self.hour
            )));
        }
        let country = normalize_country(&self.country);
        if !COUNTRIES.contains(&country.as_str()) {
            return Err(ForecastError::invalid_input(format!(
                "unknown country '{}'; choose one of the listed countries or 'other'",
                self.country.trim()
            )));
        }
        Ok(())
    }
}
