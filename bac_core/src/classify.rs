//! Impairment classification of a BAC value.

use serde::{Deserialize, Serialize};

/// Legal driving limit in most US jurisdictions
pub const LEGAL_LIMIT: f64 = 0.08;

/// Upper (exclusive) bound of the MILD band
pub const MILD_LIMIT: f64 = 0.03;

/// Discrete impairment level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ImpairmentLevel {
    Sober,
    Mild,
    Impaired,
    Intoxicated,
}

impl ImpairmentLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ImpairmentLevel::Sober => "Sober",
            ImpairmentLevel::Mild => "Mild",
            ImpairmentLevel::Impaired => "Impaired",
            ImpairmentLevel::Intoxicated => "Intoxicated",
        }
    }

    /// Fixed advisory text for this level
    pub fn message(&self) -> &'static str {
        match self {
            ImpairmentLevel::Sober => "You are sober. Stay safe!",
            ImpairmentLevel::Mild => {
                "Slight euphoria and talkativeness. Coordination may be slightly impaired."
            }
            ImpairmentLevel::Impaired => {
                "Impaired judgment and coordination. DO NOT drive or operate machinery."
            }
            ImpairmentLevel::Intoxicated => {
                "Legally intoxicated. Severe impairment. Seek assistance if needed."
            }
        }
    }

    pub fn is_over_legal_limit(&self) -> bool {
        *self == ImpairmentLevel::Intoxicated
    }
}

/// Map a BAC value to its level. Total: every input maps to exactly one level.
///
/// Zero, negative and NaN inputs are SOBER.
pub fn classify(bac: f64) -> ImpairmentLevel {
    if bac.is_nan() || bac <= 0.0 {
        ImpairmentLevel::Sober
    } else if bac < MILD_LIMIT {
        ImpairmentLevel::Mild
    } else if bac < LEGAL_LIMIT {
        ImpairmentLevel::Impaired
    } else {
        ImpairmentLevel::Intoxicated
    }
}

/// Named target levels offered by the drink planner
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetLevel {
    Light,
    Moderate,
    Strong,
}

impl TargetLevel {
    pub const ALL: [TargetLevel; 3] = [TargetLevel::Light, TargetLevel::Moderate, TargetLevel::Strong];

    pub fn bac(self) -> f64 {
        match self {
            TargetLevel::Light => 0.03,
            TargetLevel::Moderate => 0.06,
            TargetLevel::Strong => 0.09,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetLevel::Light => "Light",
            TargetLevel::Moderate => "Moderate",
            TargetLevel::Strong => "Strong",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "light" => Some(TargetLevel::Light),
            "moderate" => Some(TargetLevel::Moderate),
            "strong" => Some(TargetLevel::Strong),
            _ => None,
        }
    }
}
