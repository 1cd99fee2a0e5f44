//! Display formatting for BAC values and durations.

use chrono::Duration;

/// BAC to three decimals; negative or non-finite values show as zero
pub fn format_bac(bac: f64) -> String {
    if !bac.is_finite() || bac < 0.0 {
        return "0.000".into();
    }
    format!("{:.3}", bac)
}

/// "1h 41m", "15m", "2h"; non-positive durations are "0m"
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    if total_minutes <= 0 {
        return "0m".into();
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    match (hours, minutes) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
