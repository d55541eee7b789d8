//! Calendar features derived from the sale date and hour.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar breakdown of one sale timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub hour: u32,
    /// ISO 8601 week number, 1..=53.
    pub week_of_year: u32,
    pub quarter: u32,
    pub is_weekend: bool,
}

impl TemporalFeatures {
    pub fn derive(date: NaiveDate, hour: u32) -> Self {
        let day_of_week = date.weekday().num_days_from_monday();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week,
            hour,
            week_of_year: date.iso_week().week(),
            quarter: quarter_of(date.month()),
            is_weekend: day_of_week >= 5,
        }
    }
}

/// Quarter (1..=4) of a 1-based month.
pub fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}
