//! Unit price normalization into the base currency.

use crate::form::Currency;
use serde::{Deserialize, Serialize};

/// Currency the model was trained on.
pub const BASE_CURRENCY: Currency = Currency::Gbp;

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
}

/// What happened to the price on its way into the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceNotice {
    /// The price was divided by a valid rate.
    Converted { rate: f64, base_price: f64 },
    /// A rate was typed but could not be used; the raw price stands in as GBP.
    InvalidRate { raw: String },
    /// No rate was given for a foreign currency; the raw price stands in as GBP.
    MissingRate { currency: Currency },
}

impl PriceNotice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            PriceNotice::Converted { .. } => NoticeLevel::Success,
            PriceNotice::InvalidRate { .. } => NoticeLevel::Warning,
            PriceNotice::MissingRate { .. } => NoticeLevel::Info,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level() == NoticeLevel::Warning
    }

    pub fn message(&self) -> String {
        match self {
            PriceNotice::Converted { base_price, .. } => format!(
                "Converted Unit Price for model: {:.4} {}",
                base_price,
                BASE_CURRENCY.code()
            ),
            PriceNotice::InvalidRate { .. } => format!(
                "Please enter a valid exchange rate (number). Using input price as {}.",
                BASE_CURRENCY.code()
            ),
            PriceNotice::MissingRate { .. } => format!(
                "No exchange rate entered. Price will be used as {}.",
                BASE_CURRENCY.code()
            ),
        }
    }
}

/// A unit price expressed in the base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPrice {
    pub base_price: f64,
    pub notice: Option<PriceNotice>,
}

/// Parse an exchange rate, accepting only finite positive numbers.
pub fn parse_rate(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
}

/// Convert `price` (in `currency`) into the base currency.
///
/// `rate` is "1 GBP = rate units of `currency`". Blank rates count as
/// absent, and rates are ignored entirely for the base currency.
pub fn normalize_price(price: f64, currency: Currency, rate: Option<&str>) -> NormalizedPrice {
    if currency == BASE_CURRENCY {
        return NormalizedPrice {
            base_price: price,
            notice: None,
        };
    }

    let raw = match rate.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw,
        None => {
            return NormalizedPrice {
                base_price: price,
                notice: Some(PriceNotice::MissingRate { currency }),
            };
        }
    };

    match parse_rate(raw) {
        Some(rate) => {
            let base_price = price / rate;
            NormalizedPrice {
                base_price,
                notice: Some(PriceNotice::Converted { rate, base_price }),
            }
        }
        None => {
            tracing::warn!(rate = raw, currency = %currency, "Unusable exchange rate, using input price as base currency");
            NormalizedPrice {
                base_price: price,
                notice: Some(PriceNotice::InvalidRate {
                    raw: raw.to_string(),
                }),
            }
        }
    }
}
