//! Core domain types for the BAC estimation engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - The user profile consumed by every calculation
//! - Drink events and the tracking session that orders them
//! - Metabolism presets
//! - The computed BAC snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::ImpairmentLevel;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex, which selects the body-water fraction
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse user input ("male", "F", ...). Returns None for anything else.
    pub fn parse(s: &str) -> Option<Gender> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Profile supplied by the setup flow; immutable for one calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub gender: Gender,
    pub weight_lbs: f64,
}

// ============================================================================
// Metabolism
// ============================================================================

/// Standard elimination rate, BAC percentage points per hour
pub const STANDARD_METABOLISM_RATE: f64 = 0.015;

/// Elimination rate preset, chosen per evaluation
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Metabolism {
    #[default]
    Standard,
    /// Half the standard rate, covering individuals who eliminate slowly
    Slow,
}

impl Metabolism {
    pub fn from_slow_flag(slow: bool) -> Self {
        if slow {
            Metabolism::Slow
        } else {
            Metabolism::Standard
        }
    }

    pub fn rate_per_hour(self) -> f64 {
        match self {
            Metabolism::Standard => STANDARD_METABOLISM_RATE,
            Metabolism::Slow => STANDARD_METABOLISM_RATE / 2.0,
        }
    }
}

// ============================================================================
// Drink Types
// ============================================================================

/// One logged drink. Never mutated after creation.
///
/// `timestamp` is optional only because drink logs arrive from an external
/// store; an entry without one is skipped by the aggregator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkEvent {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub standard_drinks: f64,
    #[serde(default)]
    pub volume_oz: Option<f64>,
    #[serde(default)]
    pub abv_percent: Option<f64>,
}

impl DrinkEvent {
    /// A single standard drink logged at `at`
    pub fn standard(at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Standard Drink".into(),
            timestamp: Some(at),
            standard_drinks: 1.0,
            volume_oz: None,
            abv_percent: None,
        }
    }

    /// A drink of the given volume and strength logged at `at`
    pub fn from_volume(
        name: impl Into<String>,
        volume_oz: f64,
        abv_percent: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Some(at),
            standard_drinks: crate::units::standard_drinks_for(volume_oz, abv_percent),
            volume_oz: Some(volume_oz),
            abv_percent: Some(abv_percent),
        }
    }
}

/// A named drink the user saved for reuse
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomDrink {
    pub name: String,
    pub volume_oz: f64,
    pub abv_percent: f64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Which calculation a session feeds
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    #[default]
    Live,
    Estimate,
}

/// The drink log and mode inputs for one tracking session
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackingSession {
    #[serde(default)]
    pub mode: TrackingMode,
    /// Instant of the first drink in live mode
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Insertion order is consumption order
    #[serde(default)]
    pub drinks: Vec<DrinkEvent>,
    #[serde(default)]
    pub estimate_drinks: Option<f64>,
    #[serde(default)]
    pub estimate_hours: Option<f64>,
    #[serde(default)]
    pub metabolism: Metabolism,
    /// Set once any observed snapshot reaches the legal limit; cleared only by `clear`
    #[serde(default)]
    pub has_been_impaired: bool,
    #[serde(default)]
    pub peak_bac: f64,
}

// ============================================================================
// Output
// ============================================================================

/// A freshly computed BAC reading. Never stored as a source of truth.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BacSnapshot {
    /// BAC in percent, always >= 0
    pub value: f64,
    pub level: ImpairmentLevel,
    /// Projected instant of reaching zero; None when already zero
    pub sober_at: Option<DateTime<Utc>>,
    pub computed_at: DateTime<Utc>,
}

impl BacSnapshot {
    /// The safe default: sober, nothing to wait for
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            value: 0.0,
            level: ImpairmentLevel::Sober,
            sober_at: None,
            computed_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_rate_is_half_standard() {
        assert_eq!(
            Metabolism::Slow.rate_per_hour() * 2.0,
            Metabolism::Standard.rate_per_hour()
        );
        assert_eq!(Metabolism::from_slow_flag(true), Metabolism::Slow);
        assert_eq!(Metabolism::from_slow_flag(false), Metabolism::Standard);
    }

    #[test]
    fn test_parse_gender() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse(" f "), Some(Gender::Female));
        assert_eq!(Gender::parse("other"), None);
    }

    #[test]
    fn test_drink_without_timestamp_deserializes() {
        let json = r#"{"id":"6f1b0c1e-2a43-4d8a-9d52-8f0e6c3f2b11","standard_drinks":1.0}"#;
        let drink: DrinkEvent = serde_json::from_str(json).unwrap();
        assert!(drink.timestamp.is_none());
        assert_eq!(drink.name, "");
    }

    #[test]
    fn test_from_volume_derives_standard_drinks() {
        let drink = DrinkEvent::from_volume("Beer", 12.0, 5.0, Utc::now());
        assert!((drink.standard_drinks - 1.0).abs() < 0.01);
        assert_eq!(drink.volume_oz, Some(12.0));
    }

    #[test]
    fn test_session_defaults_to_live() {
        let session: TrackingSession = serde_json::from_str("{}").unwrap();
        assert_eq!(session.mode, TrackingMode::Live);
        assert!(session.drinks.is_empty());
        assert_eq!(session.metabolism, Metabolism::Standard);
    }
}
