//! Default customer and product statistics.
//!
//! The model was trained with per-customer RFM figures and per-product
//! aggregates. The form does not ask for them, so each customer segment maps
//! to a fixed profile and products share one set of averages.

use crate::form::CustomerType;

/// Stand-in RFM figures for one customer segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerProfile {
    /// Days since the last purchase.
    pub recency: u32,
    /// Number of past purchases.
    pub frequency: u32,
    /// Monetary value as a multiple of the unit price.
    pub monetary_multiplier: f64,
    pub is_guest: bool,
}

impl CustomerProfile {
    pub fn monetary(&self, unit_price: f64) -> f64 {
        unit_price * self.monetary_multiplier
    }
}

/// Segment lookup table. Adding a segment means adding a row here.
const CUSTOMER_PROFILES: [(CustomerType, CustomerProfile); 2] = [
    (
        CustomerType::Guest,
        CustomerProfile {
            recency: 30,
            frequency: 1,
            monetary_multiplier: 1.0,
            is_guest: true,
        },
    ),
    (
        CustomerType::Registered,
        CustomerProfile {
            recency: 10,
            frequency: 5,
            monetary_multiplier: 5.0,
            is_guest: false,
        },
    ),
];

/// Profile for a customer segment.
pub fn customer_profile(customer: CustomerType) -> CustomerProfile {
    CUSTOMER_PROFILES
        .iter()
        .find(|(kind, _)| *kind == customer)
        .map(|(_, profile)| *profile)
        .unwrap_or(CUSTOMER_PROFILES[0].1)
}

/// Product-level aggregates used for every product code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductDefaults {
    pub total_quantity: u32,
    pub sales_count: u32,
}

pub const PRODUCT_DEFAULTS: ProductDefaults = ProductDefaults {
    total_quantity: 100,
    sales_count: 10,
};
