//! The single-row feature record consumed by the model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names in the order the model expects them.
pub const FEATURE_COLUMNS: [&str; 18] = [
    "StockCode",
    "UnitPrice",
    "Country",
    "InvoiceYear",
    "InvoiceMonth",
    "InvoiceDay",
    "InvoiceDayOfWeek",
    "InvoiceHour",
    "InvoiceWeekOfYear",
    "InvoiceQuarter",
    "IsWeekend",
    "Recency",
    "Frequency",
    "Monetary",
    "ProductTotalQuantity",
    "ProductAverageUnitPrice",
    "ProductSalesCount",
    "IsGuest",
];

/// Columns the model treats as categories rather than numbers.
pub const CATEGORICAL_COLUMNS: [&str; 2] = ["StockCode", "Country"];

/// Whether a column is categorical or numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

/// Kind of the column at `index` in [`FEATURE_COLUMNS`], if it exists.
pub fn column_kind(index: usize) -> Option<ColumnKind> {
    FEATURE_COLUMNS.get(index).map(|name| {
        if CATEGORICAL_COLUMNS.contains(name) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Numeric
        }
    })
}

/// One cell of the record, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Categorical(String),
    Numeric(f64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Categorical(s) => Some(s),
            FeatureValue::Numeric(_) => None,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            FeatureValue::Categorical(_) => ColumnKind::Categorical,
            FeatureValue::Numeric(_) => ColumnKind::Numeric,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Categorical(s) => f.write_str(s),
            FeatureValue::Numeric(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            FeatureValue::Numeric(v) => write!(f, "{}", v),
        }
    }
}

/// A complete model input row. Built by
/// [`assemble`](crate::features::assemble), never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureRecord {
    pub stock_code: String,
    pub unit_price: f64,
    pub country: String,
    pub invoice_year: i32,
    pub invoice_month: u32,
    pub invoice_day: u32,
    pub invoice_day_of_week: u32,
    pub invoice_hour: u32,
    pub invoice_week_of_year: u32,
    pub invoice_quarter: u32,
    pub is_weekend: u8,
    pub recency: u32,
    pub frequency: u32,
    pub monetary: f64,
    pub product_total_quantity: u32,
    pub product_average_unit_price: f64,
    pub product_sales_count: u32,
    pub is_guest: u8,
}

impl FeatureRecord {
    /// Cell values in [`FEATURE_COLUMNS`] order.
    pub fn values(&self) -> [FeatureValue; 18] {
        use FeatureValue::{Categorical, Numeric};
        [
            Categorical(self.stock_code.clone()),
            Numeric(self.unit_price),
            Categorical(self.country.clone()),
            Numeric(f64::from(self.invoice_year)),
            Numeric(f64::from(self.invoice_month)),
            Numeric(f64::from(self.invoice_day)),
            Numeric(f64::from(self.invoice_day_of_week)),
            Numeric(f64::from(self.invoice_hour)),
            Numeric(f64::from(self.invoice_week_of_year)),
            Numeric(f64::from(self.invoice_quarter)),
            Numeric(f64::from(self.is_weekend)),
            Numeric(f64::from(self.recency)),
            Numeric(f64::from(self.frequency)),
            Numeric(self.monetary),
            Numeric(f64::from(self.product_total_quantity)),
            Numeric(self.product_average_unit_price),
            Numeric(f64::from(self.product_sales_count)),
            Numeric(f64::from(self.is_guest)),
        ]
    }

    /// `(column name, value)` pairs in model order.
    pub fn columns(&self) -> Vec<(&'static str, FeatureValue)> {
        FEATURE_COLUMNS.into_iter().zip(self.values()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FeatureRecord {
        FeatureRecord {
            stock_code: "85123A".into(),
            unit_price: 2.55,
            country: "united kingdom".into(),
            invoice_year: 2011,
            invoice_month: 12,
            invoice_day: 1,
            invoice_day_of_week: 3,
            invoice_hour: 8,
            invoice_week_of_year: 48,
            invoice_quarter: 4,
            is_weekend: 0,
            recency: 30,
            frequency: 1,
            monetary: 2.55,
            product_total_quantity: 100,
            product_average_unit_price: 2.55,
            product_sales_count: 10,
            is_guest: 1,
        }
    }

    #[test]
    fn test_serde_names_match_columns() {
        let json = serde_json::to_value(record()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), FEATURE_COLUMNS.len());
        for name in FEATURE_COLUMNS {
            assert!(obj.contains_key(name), "missing column {name}");
        }
    }

    #[test]
    fn test_columns_are_tagged() {
        let cols = record().columns();
        assert_eq!(cols.len(), 18);
        for (name, value) in &cols {
            let expected = if CATEGORICAL_COLUMNS.contains(name) {
                ColumnKind::Categorical
            } else {
                ColumnKind::Numeric
            };
            assert_eq!(value.kind(), expected, "column {name}");
        }
        assert_eq!(cols[0].1.as_category(), Some("85123A"));
        assert_eq!(cols[6].1.as_f64(), Some(3.0));
        assert_eq!(cols[17].1.as_f64(), Some(1.0));
    }

    #[test]
    fn test_column_kind_lookup() {
        assert_eq!(column_kind(0), Some(ColumnKind::Categorical));
        assert_eq!(column_kind(1), Some(ColumnKind::Numeric));
        assert_eq!(column_kind(2), Some(ColumnKind::Categorical));
        assert_eq!(column_kind(18), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FeatureValue::Numeric(30.0).to_string(), "30");
        assert_eq!(FeatureValue::Numeric(2.55).to_string(), "2.55");
        assert_eq!(FeatureValue::Categorical("france".into()).to_string(), "france");
    }
}
