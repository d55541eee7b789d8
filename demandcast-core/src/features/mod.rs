//! Feature assembly: everything between the raw form fields and the model row.
//!
//! Currency normalization, calendar derivation, and the customer/product
//! defaulting table are pure functions; [`assemble`] stitches them into one
//! [`FeatureRecord`] per request.

pub mod assembler;
pub mod currency;
pub mod profiles;
pub mod record;
pub mod temporal;

pub use assembler::{AssembledFeatures, assemble};
pub use currency::{BASE_CURRENCY, NoticeLevel, NormalizedPrice, PriceNotice, normalize_price};
pub use profiles::{CustomerProfile, PRODUCT_DEFAULTS, ProductDefaults, customer_profile};
pub use record::{
    CATEGORICAL_COLUMNS, ColumnKind, FEATURE_COLUMNS, FeatureRecord, FeatureValue, column_kind,
};
pub use temporal::{TemporalFeatures, quarter_of};
