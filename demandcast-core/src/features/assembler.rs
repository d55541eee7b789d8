//! Turns a [`SaleInput`] into a complete [`FeatureRecord`].

use super::currency::{PriceNotice, normalize_price};
use super::profiles::{PRODUCT_DEFAULTS, customer_profile};
use super::record::FeatureRecord;
use super::temporal::TemporalFeatures;
use crate::error::Result;
use crate::form::{SaleInput, normalize_country};

/// The assembled record plus anything the user should be told about it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledFeatures {
    pub record: FeatureRecord,
    pub notice: Option<PriceNotice>,
}

/// Validate `input` and build the record the model expects.
///
/// The only error is [`ForecastError::InvalidInput`](crate::ForecastError::InvalidInput);
/// an unusable exchange rate is reported through `notice` instead.
pub fn assemble(input: &SaleInput) -> Result<AssembledFeatures> {
    input.validate()?;

    let price = normalize_price(
        input.unit_price,
        input.currency,
        input.exchange_rate.as_deref(),
    );
    let unit_price = price.base_price;
    let when = TemporalFeatures::derive(input.sale_date, input.hour);
    let customer = customer_profile(input.customer_type);

    let record = FeatureRecord {
        stock_code: input.product_code.trim().to_string(),
        unit_price,
        country: normalize_country(&input.country),
        invoice_year: when.year,
        invoice_month: when.month,
        invoice_day: when.day,
        invoice_day_of_week: when.day_of_week,
        invoice_hour: when.hour,
        invoice_week_of_year: when.week_of_year,
        invoice_quarter: when.quarter,
        is_weekend: u8::from(when.is_weekend),
        recency: customer.recency,
        frequency: customer.frequency,
        monetary: customer.monetary(unit_price),
        product_total_quantity: PRODUCT_DEFAULTS.total_quantity,
        product_average_unit_price: unit_price,
        product_sales_count: PRODUCT_DEFAULTS.sales_count,
        is_guest: u8::from(customer.is_guest),
    };

    tracing::debug!(
        stock_code = %record.stock_code,
        unit_price = record.unit_price,
        customer = %input.customer_type,
        "Assembled feature record"
    );

    Ok(AssembledFeatures {
        record,
        notice: price.notice,
    })
}
