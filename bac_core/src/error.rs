//! Error types for the bac_core library.

use serde::Serialize;
use std::fmt;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a validator check: the accepted value, or a structured rejection
pub type ValidationResult<T = ()> = std::result::Result<T, ValidationError>;

/// Core error type for bac_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected profile or drink input
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Session store error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Stable machine-readable code for a validation rejection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    WeightOutOfRange,
    NonNumeric,
    MissingGender,
    VolumeOutOfRange,
    AbvOutOfRange,
    EstimateDrinksOutOfRange,
    EstimateHoursOutOfRange,
    TargetBacOutOfRange,
    MissingName,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::WeightOutOfRange => "WEIGHT_OUT_OF_RANGE",
            ValidationCode::NonNumeric => "NON_NUMERIC",
            ValidationCode::MissingGender => "MISSING_GENDER",
            ValidationCode::VolumeOutOfRange => "VOLUME_OUT_OF_RANGE",
            ValidationCode::AbvOutOfRange => "ABV_OUT_OF_RANGE",
            ValidationCode::EstimateDrinksOutOfRange => "ESTIMATE_DRINKS_OUT_OF_RANGE",
            ValidationCode::EstimateHoursOutOfRange => "ESTIMATE_HOURS_OUT_OF_RANGE",
            ValidationCode::TargetBacOutOfRange => "TARGET_BAC_OUT_OF_RANGE",
            ValidationCode::MissingName => "MISSING_NAME",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A violated range limit, rendered into the rejection message
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    GreaterThan(f64),
    AtMost(f64),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::AtLeast(v) => write!(f, "must be at least {}", v),
            Bound::GreaterThan(v) => write!(f, "must be greater than {}", v),
            Bound::AtMost(v) => write!(f, "must be at most {}", v),
        }
    }
}

/// Out-of-range or malformed profile/drink input
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a valid number (got {input:?})")]
    NonNumeric { field: &'static str, input: String },

    #[error("Weight {bound} lbs (got {weight})")]
    WeightOutOfRange { weight: f64, bound: Bound },

    #[error("Please select a valid gender")]
    MissingGender,

    #[error("Volume {bound} oz (got {volume_oz})")]
    VolumeOutOfRange { volume_oz: f64, bound: Bound },

    #[error("ABV {bound}% (got {abv_percent})")]
    AbvOutOfRange { abv_percent: f64, bound: Bound },

    #[error("Number of drinks {bound} (got {drinks})")]
    EstimateDrinksOutOfRange { drinks: f64, bound: Bound },

    #[error("Hours {bound} (got {hours})")]
    EstimateHoursOutOfRange { hours: f64, bound: Bound },

    #[error("Target BAC {bound} (got {target_bac})")]
    TargetBacOutOfRange { target_bac: f64, bound: Bound },

    #[error("Please enter a drink name")]
    MissingName,
}

impl ValidationError {
    pub fn code(&self) -> ValidationCode {
        match self {
            ValidationError::NonNumeric { .. } => ValidationCode::NonNumeric,
            ValidationError::WeightOutOfRange { .. } => ValidationCode::WeightOutOfRange,
            ValidationError::MissingGender => ValidationCode::MissingGender,
            ValidationError::VolumeOutOfRange { .. } => ValidationCode::VolumeOutOfRange,
            ValidationError::AbvOutOfRange { .. } => ValidationCode::AbvOutOfRange,
            ValidationError::EstimateDrinksOutOfRange { .. } => {
                ValidationCode::EstimateDrinksOutOfRange
            }
            ValidationError::EstimateHoursOutOfRange { .. } => {
                ValidationCode::EstimateHoursOutOfRange
            }
            ValidationError::TargetBacOutOfRange { .. } => ValidationCode::TargetBacOutOfRange,
            ValidationError::MissingName => ValidationCode::MissingName,
        }
    }
}

/// A computed BAC fell outside the plausible envelope
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("BAC {value} is outside the sanity envelope [0, {max}]")]
pub struct ComputationAnomaly {
    pub value: f64,
    pub max: f64,
}
