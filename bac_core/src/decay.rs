//! Widmark-derived absorption/elimination model for a single alcohol dose.

use crate::{Gender, Metabolism};

pub const LBS_TO_KG: f64 = 0.453592;
pub const MALE_BODY_WATER: f64 = 0.68;
pub const FEMALE_BODY_WATER: f64 = 0.55;
pub const GRAMS_PER_STANDARD_DRINK: f64 = 14.0;

/// Body-water fraction for the Widmark distribution volume
pub fn body_water_fraction(gender: Gender) -> f64 {
    match gender {
        Gender::Male => MALE_BODY_WATER,
        Gender::Female => FEMALE_BODY_WATER,
    }
}

/// BAC right after absorbing `standard_drinks`, before any elimination
pub fn peak_bac(standard_drinks: f64, weight_lbs: f64, gender: Gender) -> f64 {
    let weight_kg = weight_lbs * LBS_TO_KG;
    let alcohol_grams = standard_drinks * GRAMS_PER_STANDARD_DRINK;
    (alcohol_grams / (weight_kg * body_water_fraction(gender) * 1000.0)) * 100.0
}

/// Instantaneous BAC contribution of one dose after `hours_elapsed`
///
/// Elimination is linear at `metabolism_rate_per_hour` and the result is
/// floored at zero. Degenerate weights yield 0 with a warning.
pub fn contribution(
    standard_drinks: f64,
    weight_lbs: f64,
    gender: Gender,
    hours_elapsed: f64,
    metabolism_rate_per_hour: f64,
) -> f64 {
    if !weight_lbs.is_finite() || weight_lbs <= 0.0 {
        tracing::warn!("Invalid weight {} for BAC calculation, treating as 0", weight_lbs);
        return 0.0;
    }
    if !standard_drinks.is_finite() || standard_drinks <= 0.0 {
        return 0.0;
    }

    let peak = peak_bac(standard_drinks, weight_lbs, gender);
    let eliminated = metabolism_rate_per_hour * hours_elapsed.max(0.0);

    (peak - eliminated).max(0.0)
}

/// Standard drinks spread over `hours` that land exactly on `target_bac`
///
/// Inverts the peak/elimination model: the dose must cover the target plus
/// everything eliminated during the window. Floored at zero.
pub fn drinks_for_target(
    target_bac: f64,
    weight_lbs: f64,
    gender: Gender,
    hours: f64,
    metabolism: Metabolism,
) -> f64 {
    if !weight_lbs.is_finite() || weight_lbs <= 0.0 {
        tracing::warn!("Invalid weight {} for drink planning, treating as 0", weight_lbs);
        return 0.0;
    }
    if !target_bac.is_finite() || !hours.is_finite() {
        return 0.0;
    }

    let bac_to_reach = target_bac + metabolism.rate_per_hour() * hours.max(0.0);
    // Drinks that raise BAC by exactly 1.0
    let drinks_per_unit_bac = 1.0 / peak_bac(1.0, weight_lbs, gender);

    (bac_to_reach * drinks_per_unit_bac).max(0.0)
}
