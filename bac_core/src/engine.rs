//! BAC estimation engine.
//!
//! This module turns a profile plus a drink log (or an estimate) into a
//! [`BacSnapshot`]:
//! - Live mode: every drink decays on its own clock and the non-negative
//!   per-drink contributions are summed
//! - Estimate mode: one bulk dose evaluated after the reported hours
//! - The aggregate passes the sanity envelope, then is classified and
//!   projected to a sober time
//!
//! Everything here is a pure function of its arguments and `now`.

use crate::{
    classify::classify, decay, sober, validate, BacSnapshot, DrinkEvent, Metabolism,
    TrackingMode, TrackingSession, UserProfile,
};
use chrono::{DateTime, Utc};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Sum of independent per-drink contributions at `now`
///
/// A fully metabolized drink contributes exactly 0; it never offsets a more
/// recent one. Entries without a timestamp or with a non-positive drink
/// count are skipped.
pub fn aggregate_live(
    profile: &UserProfile,
    drinks: &[DrinkEvent],
    now: DateTime<Utc>,
    metabolism: Metabolism,
) -> f64 {
    let rate = metabolism.rate_per_hour();

    let total: f64 = drinks
        .iter()
        .filter_map(|drink| {
            let Some(timestamp) = drink.timestamp else {
                tracing::warn!("Skipping drink {} with no timestamp", drink.id);
                return None;
            };
            if !drink.standard_drinks.is_finite() || drink.standard_drinks <= 0.0 {
                tracing::warn!(
                    "Skipping drink {} with invalid standard drink count {}",
                    drink.id,
                    drink.standard_drinks
                );
                return None;
            }

            let hours_elapsed = (now - timestamp).num_milliseconds() as f64 / MS_PER_HOUR;
            Some(decay::contribution(
                drink.standard_drinks,
                profile.weight_lbs,
                profile.gender,
                hours_elapsed,
                rate,
            ))
        })
        .sum();

    total.max(0.0)
}

/// Single bulk dose evaluated `estimate_hours` after drinking started
pub fn aggregate_estimate(
    profile: &UserProfile,
    estimate_drinks: f64,
    estimate_hours: f64,
    metabolism: Metabolism,
) -> f64 {
    if !estimate_hours.is_finite() {
        return 0.0;
    }
    decay::contribution(
        estimate_drinks,
        profile.weight_lbs,
        profile.gender,
        estimate_hours,
        metabolism.rate_per_hour(),
    )
    .max(0.0)
}

/// Sanity-check, classify and project an aggregate BAC
fn build_snapshot(raw_bac: f64, metabolism: Metabolism, now: DateTime<Utc>) -> BacSnapshot {
    let value = validate::sanitize_bac(raw_bac);
    if value == 0.0 {
        return BacSnapshot::zero(now);
    }

    BacSnapshot {
        value,
        level: classify(value),
        sober_at: Some(sober::sober_at(value, metabolism.rate_per_hour(), now)),
        computed_at: now,
    }
}

/// Out-of-range profiles never reach the decay model
fn usable_profile(profile: &UserProfile) -> bool {
    match validate::validate_profile(profile) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Profile rejected, reporting zero BAC: {}", e);
            false
        }
    }
}

/// BAC from a live drink log at `now`
///
/// An invalid profile yields a zero snapshot.
pub fn compute_live_bac(
    profile: &UserProfile,
    drinks: &[DrinkEvent],
    now: DateTime<Utc>,
    metabolism: Metabolism,
) -> BacSnapshot {
    if !usable_profile(profile) {
        return BacSnapshot::zero(now);
    }
    let raw = aggregate_live(profile, drinks, now, metabolism);
    build_snapshot(raw, metabolism, now)
}

/// BAC from a one-shot estimate of drinks consumed over hours
///
/// Inputs outside the validator's bounds yield a zero snapshot.
pub fn compute_estimate_bac(
    profile: &UserProfile,
    estimate_drinks: f64,
    estimate_hours: f64,
    now: DateTime<Utc>,
    metabolism: Metabolism,
) -> BacSnapshot {
    if !usable_profile(profile) {
        return BacSnapshot::zero(now);
    }
    if let Err(e) = validate::validate_estimate(estimate_drinks, estimate_hours) {
        tracing::warn!("Estimate rejected, reporting zero BAC: {}", e);
        return BacSnapshot::zero(now);
    }
    let raw = aggregate_estimate(profile, estimate_drinks, estimate_hours, metabolism);
    build_snapshot(raw, metabolism, now)
}

/// Evaluate whichever mode the session is in, using its metabolism preset
///
/// A live session without a start time, or an estimate session missing
/// either scalar, is degenerate and yields a zero snapshot.
pub fn compute_session_bac(
    profile: &UserProfile,
    session: &TrackingSession,
    now: DateTime<Utc>,
) -> BacSnapshot {
    match session.mode {
        TrackingMode::Live => {
            if session.start_time.is_none() || session.drinks.is_empty() {
                return BacSnapshot::zero(now);
            }
            compute_live_bac(profile, &session.drinks, now, session.metabolism)
        }
        TrackingMode::Estimate => match (session.estimate_drinks, session.estimate_hours) {
            (Some(drinks), Some(hours)) => {
                compute_estimate_bac(profile, drinks, hours, now, session.metabolism)
            }
            _ => BacSnapshot::zero(now),
        },
    }
}
