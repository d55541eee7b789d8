//! Terminal rendering of a forecast.

use demandcast_core::Forecast;
use demandcast_core::features::NoticeLevel;
use demandcast_core::presentation::{self, DISCLAIMER};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

/// A text progress bar, `fraction` clamped to `[0, 1]`.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        fraction.clamp(0.0, 1.0) * 100.0
    )
}

/// The full report printed after a prediction.
pub fn render(forecast: &Forecast) -> String {
    let mut out = String::new();

    if let Some(notice) = &forecast.notice {
        let marker = match notice.level() {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Warning => "⚠",
        };
        let _ = writeln!(out, "{} {}\n", marker, notice.message());
    }

    let _ = writeln!(
        out,
        "Predicted Sales Quantity: {}",
        presentation::format_quantity(forecast.quantity)
    );
    let _ = writeln!(out, "{}", progress_bar(forecast.progress, BAR_WIDTH));
    let _ = writeln!(out, "Demand Level: {}\n", forecast.demand.badge());
    let _ = writeln!(out, "{}\n", presentation::explanation(forecast.quantity));

    let _ = writeln!(out, "Inputs Used for Prediction:");
    let columns = forecast.record.columns();
    let name_width = columns.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in columns {
        let _ = writeln!(out, "  {:<width$}  {}", name, value, width = name_width);
    }

    let _ = writeln!(out, "\n{}", presentation::DEFAULTS_NOTE);
    let _ = write!(out, "\n{}", DISCLAIMER);
    out
}
