//! Built-in catalog of common drinks.
//!
//! Presets carry a volume and ABV; the standard-drink count is always derived
//! through the unit converter rather than stored.

use crate::{units, validate, DrinkEvent};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

/// A named drink with typical serving size and strength
#[derive(Clone, Debug, PartialEq)]
pub struct DrinkPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub volume_oz: f64,
    pub abv_percent: f64,
}

impl DrinkPreset {
    pub fn standard_drinks(&self) -> f64 {
        units::standard_drinks_for(self.volume_oz, self.abv_percent)
    }

    /// A drink event for this preset logged at `at`
    pub fn to_event(&self, at: DateTime<Utc>) -> DrinkEvent {
        DrinkEvent::from_volume(self.name, self.volume_oz, self.abv_percent, at)
    }
}

/// The preset logged when the user asks for "a drink" without details
pub const DEFAULT_PRESET_ID: &str = "beer";

static PRESETS: Lazy<Vec<DrinkPreset>> = Lazy::new(|| {
    vec![
        preset("beer", "Beer", 12.0, 5.0),
        preset("light_beer", "Light Beer", 12.0, 4.2),
        preset("wine", "Wine", 5.0, 12.0),
        preset("shot", "Shot", 1.5, 40.0),
        preset("mixed_drink", "Mixed Drink", 4.0, 15.0),
        preset("cocktail", "Cocktail", 3.0, 20.0),
        preset("hard_seltzer", "Hard Seltzer", 12.0, 5.0),
        preset("malt_liquor", "Malt Liquor", 12.0, 7.0),
        preset("craft_beer", "Craft Beer", 12.0, 7.0),
        preset("champagne", "Champagne", 5.0, 12.0),
    ]
});

fn preset(id: &'static str, name: &'static str, volume_oz: f64, abv_percent: f64) -> DrinkPreset {
    DrinkPreset {
        id,
        name,
        volume_oz,
        abv_percent,
    }
}

/// All presets, in display order
pub fn presets() -> &'static [DrinkPreset] {
    &PRESETS
}

/// Look up a preset by id or display name, case-insensitively
pub fn find_preset(key: &str) -> Option<&'static DrinkPreset> {
    let key = key.trim().to_lowercase().replace([' ', '-'], "_");
    PRESETS
        .iter()
        .find(|p| p.id == key || p.name.to_lowercase().replace(' ', "_") == key)
}

/// Check every preset against the custom-drink validator
///
/// Returns a list of problems (empty when valid).
pub fn validate_presets(presets: &[DrinkPreset]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for p in presets {
        if !seen.insert(p.id) {
            errors.push(format!("Duplicate preset id: {}", p.id));
        }
        if let Err(e) = validate::validate_custom_drink(p.name, p.volume_oz, p.abv_percent) {
            errors.push(format!("Preset {}: {}", p.id, e));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert_eq!(presets().len(), 10);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = validate_presets(presets());
        assert!(errors.is_empty(), "Preset validation errors: {:?}", errors);
    }

    #[test]
    fn test_duplicate_ids_detected() {
        let dupes = vec![
            preset("beer", "Beer", 12.0, 5.0),
            preset("beer", "Other Beer", 16.0, 5.0),
            preset("bad", "Bad", 0.0, 5.0),
        ];
        let errors = validate_presets(&dupes);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_find_preset_is_forgiving() {
        assert_eq!(find_preset("BEER").map(|p| p.id), Some("beer"));
        assert_eq!(find_preset("Light Beer").map(|p| p.id), Some("light_beer"));
        assert_eq!(find_preset("hard-seltzer").map(|p| p.id), Some("hard_seltzer"));
        assert!(find_preset("moonshine").is_none());
    }

    #[test]
    fn test_canonical_presets_are_one_standard_drink() {
        for id in ["beer", "wine", "shot"] {
            let p = find_preset(id).unwrap();
            assert!((p.standard_drinks() - 1.0).abs() < 0.01, "{} off", id);
        }
    }

    #[test]
    fn test_to_event_carries_volume() {
        let event = find_preset(DEFAULT_PRESET_ID).unwrap().to_event(Utc::now());
        assert_eq!(event.name, "Beer");
        assert_eq!(event.volume_oz, Some(12.0));
        assert!(event.timestamp.is_some());
    }
}
