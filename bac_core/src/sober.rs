//! Projection of the instant BAC returns to zero.

use chrono::{DateTime, Duration, Utc};

/// Linear projection of when `bac` reaches zero, assuming no further drinking
///
/// A non-positive BAC returns `now` itself: "already sober" is the only
/// sentinel. A projection past the representable range clamps to
/// `DateTime::<Utc>::MAX_UTC`.
pub fn sober_at(bac: f64, metabolism_rate_per_hour: f64, now: DateTime<Utc>) -> DateTime<Utc> {
    if !bac.is_finite() || bac <= 0.0 {
        return now;
    }
    if !metabolism_rate_per_hour.is_finite() || metabolism_rate_per_hour <= 0.0 {
        tracing::warn!(
            "Invalid metabolism rate {}, cannot project sober time",
            metabolism_rate_per_hour
        );
        return now;
    }

    let minutes = minutes_to_sober(bac, metabolism_rate_per_hour);
    match Duration::try_minutes(minutes).and_then(|d| now.checked_add_signed(d)) {
        Some(at) => at,
        None => {
            tracing::warn!(
                "Sober time for BAC {} at rate {} is out of range, clamping",
                bac,
                metabolism_rate_per_hour
            );
            DateTime::<Utc>::MAX_UTC
        }
    }
}

/// Whole minutes (rounded up) until `bac` is eliminated, saturating at `i64::MAX`
pub fn minutes_to_sober(bac: f64, metabolism_rate_per_hour: f64) -> i64 {
    if !(bac > 0.0 && metabolism_rate_per_hour > 0.0) {
        return 0;
    }
    ((bac / metabolism_rate_per_hour) * 60.0).ceil() as i64
}
