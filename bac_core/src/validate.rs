//! Input bounds checks and post-hoc sanity checks on engine output.
//!
//! Every user-supplied value passes through here before it reaches the
//! decay model. Rejections are structured [`ValidationError`]s, never panics.

use crate::error::{Bound, ComputationAnomaly, ValidationError, ValidationResult};
use crate::{Gender, UserProfile};

pub const MIN_WEIGHT_LBS: f64 = 50.0;
pub const MAX_WEIGHT_LBS: f64 = 500.0;
pub const MAX_VOLUME_OZ: f64 = 100.0;
pub const MAX_ABV_PERCENT: f64 = 100.0;
/// Plausibility guard, not a physical limit
pub const MAX_ESTIMATE_DRINKS: f64 = 50.0;
pub const MAX_ESTIMATE_HOURS: f64 = 72.0;
/// Largest BAC the engine will hand to a display
pub const MAX_PLAUSIBLE_BAC: f64 = 0.5;

/// Parse a free-form numeric field
pub fn parse_number(field: &'static str, input: &str) -> ValidationResult<f64> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NonNumeric {
            field,
            input: input.to_string(),
        }),
    }
}

pub fn validate_weight(weight_lbs: f64) -> ValidationResult {
    if weight_lbs.is_nan() {
        return Err(ValidationError::NonNumeric {
            field: "Weight",
            input: weight_lbs.to_string(),
        });
    }
    if weight_lbs < MIN_WEIGHT_LBS {
        return Err(ValidationError::WeightOutOfRange {
            weight: weight_lbs,
            bound: Bound::AtLeast(MIN_WEIGHT_LBS),
        });
    }
    if weight_lbs > MAX_WEIGHT_LBS {
        return Err(ValidationError::WeightOutOfRange {
            weight: weight_lbs,
            bound: Bound::AtMost(MAX_WEIGHT_LBS),
        });
    }
    Ok(())
}

pub fn validate_profile(profile: &UserProfile) -> ValidationResult {
    validate_weight(profile.weight_lbs)
}

/// Build a profile from raw setup-form input
pub fn validate_profile_input(gender: Option<&str>, weight: &str) -> ValidationResult<UserProfile> {
    let gender = gender
        .and_then(Gender::parse)
        .ok_or(ValidationError::MissingGender)?;
    let weight_lbs = parse_number("Weight", weight)?;

    let profile = UserProfile { gender, weight_lbs };
    validate_profile(&profile)?;
    Ok(profile)
}

/// Check a custom drink's volume and ABV
pub fn validate_drink_input(volume_oz: f64, abv_percent: f64) -> ValidationResult {
    if volume_oz.is_nan() || volume_oz <= 0.0 {
        return Err(ValidationError::VolumeOutOfRange {
            volume_oz,
            bound: Bound::GreaterThan(0.0),
        });
    }
    if volume_oz > MAX_VOLUME_OZ {
        return Err(ValidationError::VolumeOutOfRange {
            volume_oz,
            bound: Bound::AtMost(MAX_VOLUME_OZ),
        });
    }
    if abv_percent.is_nan() || abv_percent <= 0.0 {
        return Err(ValidationError::AbvOutOfRange {
            abv_percent,
            bound: Bound::GreaterThan(0.0),
        });
    }
    if abv_percent > MAX_ABV_PERCENT {
        return Err(ValidationError::AbvOutOfRange {
            abv_percent,
            bound: Bound::AtMost(MAX_ABV_PERCENT),
        });
    }
    Ok(())
}

/// Check a saved custom drink, including its name
pub fn validate_custom_drink(name: &str, volume_oz: f64, abv_percent: f64) -> ValidationResult {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    validate_drink_input(volume_oz, abv_percent)
}

/// Check one-shot estimate inputs
pub fn validate_estimate(drinks: f64, hours: f64) -> ValidationResult {
    if drinks.is_nan() || drinks < 0.0 {
        return Err(ValidationError::EstimateDrinksOutOfRange {
            drinks,
            bound: Bound::AtLeast(0.0),
        });
    }
    if drinks > MAX_ESTIMATE_DRINKS {
        return Err(ValidationError::EstimateDrinksOutOfRange {
            drinks,
            bound: Bound::AtMost(MAX_ESTIMATE_DRINKS),
        });
    }
    validate_hours(hours)
}

fn validate_hours(hours: f64) -> ValidationResult {
    if hours.is_nan() || hours < 0.0 {
        return Err(ValidationError::EstimateHoursOutOfRange {
            hours,
            bound: Bound::AtLeast(0.0),
        });
    }
    if hours > MAX_ESTIMATE_HOURS {
        return Err(ValidationError::EstimateHoursOutOfRange {
            hours,
            bound: Bound::AtMost(MAX_ESTIMATE_HOURS),
        });
    }
    Ok(())
}

/// Check drink-planner inputs: a reachable target BAC and a drinking window
pub fn validate_target(target_bac: f64, hours: f64) -> ValidationResult {
    if target_bac.is_nan() || target_bac <= 0.0 {
        return Err(ValidationError::TargetBacOutOfRange {
            target_bac,
            bound: Bound::GreaterThan(0.0),
        });
    }
    if target_bac > MAX_PLAUSIBLE_BAC {
        return Err(ValidationError::TargetBacOutOfRange {
            target_bac,
            bound: Bound::AtMost(MAX_PLAUSIBLE_BAC),
        });
    }
    validate_hours(hours)
}

/// Post-hoc envelope check: finite, >= 0 and <= 0.5
pub fn check_bac(value: f64) -> Result<f64, ComputationAnomaly> {
    if value.is_finite() && (0.0..=MAX_PLAUSIBLE_BAC).contains(&value) {
        Ok(value)
    } else {
        Err(ComputationAnomaly {
            value,
            max: MAX_PLAUSIBLE_BAC,
        })
    }
}

/// Apply [`check_bac`], replacing an anomalous value with the safe zero
pub fn sanitize_bac(value: f64) -> f64 {
    match check_bac(value) {
        Ok(value) => value,
        Err(anomaly) => {
            tracing::error!("{}; resetting to 0", anomaly);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationCode;

    #[test]
    fn test_weight_bounds_inclusive() {
        assert!(validate_weight(50.0).is_ok());
        assert!(validate_weight(500.0).is_ok());
        assert!(validate_weight(180.0).is_ok());
    }

    #[test]
    fn test_weight_out_of_range_echoes_bound() {
        let err = validate_weight(-10.0).unwrap_err();
        assert_eq!(err.code(), ValidationCode::WeightOutOfRange);
        assert!(err.to_string().contains("at least 50"));

        let err = validate_weight(501.0).unwrap_err();
        assert_eq!(err.code(), ValidationCode::WeightOutOfRange);
        assert!(err.to_string().contains("at most 500"));
    }

    #[test]
    fn test_profile_input_rejects_non_numeric_weight() {
        let err = validate_profile_input(Some("male"), "abc").unwrap_err();
        assert_eq!(err.code(), ValidationCode::NonNumeric);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_profile_input_rejects_negative_weight() {
        let err = validate_profile_input(Some("female"), "-10").unwrap_err();
        assert_eq!(err.code(), ValidationCode::WeightOutOfRange);
    }

    #[test]
    fn test_profile_input_requires_gender() {
        let err = validate_profile_input(None, "150").unwrap_err();
        assert_eq!(err, ValidationError::MissingGender);
        let err = validate_profile_input(Some("robot"), "150").unwrap_err();
        assert_eq!(err, ValidationError::MissingGender);
    }

    #[test]
    fn test_profile_input_accepts_valid() {
        let profile = validate_profile_input(Some("Male"), " 180 ").unwrap();
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.weight_lbs, 180.0);
    }

    #[test]
    fn test_drink_input_ranges() {
        assert!(validate_drink_input(12.0, 5.0).is_ok());
        assert!(validate_drink_input(100.0, 100.0).is_ok());

        assert_eq!(
            validate_drink_input(0.0, 5.0).unwrap_err().code(),
            ValidationCode::VolumeOutOfRange
        );
        assert_eq!(
            validate_drink_input(100.5, 5.0).unwrap_err().code(),
            ValidationCode::VolumeOutOfRange
        );
        assert_eq!(
            validate_drink_input(12.0, 0.0).unwrap_err().code(),
            ValidationCode::AbvOutOfRange
        );
        assert_eq!(
            validate_drink_input(12.0, 101.0).unwrap_err().code(),
            ValidationCode::AbvOutOfRange
        );
        assert_eq!(
            validate_drink_input(f64::NAN, 5.0).unwrap_err().code(),
            ValidationCode::VolumeOutOfRange
        );
    }

    #[test]
    fn test_custom_drink_needs_name() {
        assert_eq!(
            validate_custom_drink("  ", 12.0, 5.0).unwrap_err(),
            ValidationError::MissingName
        );
        assert!(validate_custom_drink("IPA", 16.0, 6.5).is_ok());
    }

    #[test]
    fn test_estimate_ranges() {
        assert!(validate_estimate(0.0, 0.0).is_ok());
        assert!(validate_estimate(50.0, 72.0).is_ok());
        assert_eq!(
            validate_estimate(-1.0, 2.0).unwrap_err().code(),
            ValidationCode::EstimateDrinksOutOfRange
        );
        assert_eq!(
            validate_estimate(51.0, 2.0).unwrap_err().code(),
            ValidationCode::EstimateDrinksOutOfRange
        );
        assert_eq!(
            validate_estimate(4.0, 73.0).unwrap_err().code(),
            ValidationCode::EstimateHoursOutOfRange
        );
    }

    #[test]
    fn test_sanity_envelope() {
        assert_eq!(check_bac(0.0), Ok(0.0));
        assert_eq!(check_bac(0.5), Ok(0.5));
        assert!(check_bac(0.51).is_err());
        assert!(check_bac(-0.001).is_err());
        assert!(check_bac(f64::NAN).is_err());
        assert!(check_bac(f64::INFINITY).is_err());
    }

    #[test]
    fn test_sanitize_resets_anomaly_to_zero() {
        assert_eq!(sanitize_bac(0.6), 0.0);
        assert_eq!(sanitize_bac(f64::NAN), 0.0);
        assert_eq!(sanitize_bac(0.042), 0.042);
    }

    #[test]
    fn test_target_ranges() {
        assert!(validate_target(0.08, 3.0).is_ok());
        assert!(validate_target(0.5, 0.0).is_ok());
        assert_eq!(
            validate_target(0.0, 3.0).unwrap_err().code(),
            ValidationCode::TargetBacOutOfRange
        );
        assert_eq!(
            validate_target(0.6, 3.0).unwrap_err().code(),
            ValidationCode::TargetBacOutOfRange
        );
        assert_eq!(
            validate_target(0.06, 80.0).unwrap_err().code(),
            ValidationCode::EstimateHoursOutOfRange
        );
    }
}
