//! Volume/strength to standard-drink conversion.

/// Pure ethanol in one US standard drink, in fluid ounces
pub const STANDARD_DRINK_OZ: f64 = 0.6;

/// Convert a drink's volume and ABV into a standard-drink count
///
/// Returns 0 for non-finite or non-positive inputs; never fails.
pub fn standard_drinks_for(volume_oz: f64, abv_percent: f64) -> f64 {
    if !volume_oz.is_finite() || !abv_percent.is_finite() {
        return 0.0;
    }
    if volume_oz <= 0.0 || abv_percent <= 0.0 {
        return 0.0;
    }
    (volume_oz * abv_percent / 100.0) / STANDARD_DRINK_OZ
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within_one_percent(actual: f64, expected: f64) -> bool {
        ((actual - expected) / expected).abs() <= 0.01
    }

    #[test]
    fn test_canonical_standard_drinks() {
        assert!(within_one_percent(standard_drinks_for(12.0, 5.0), 1.0));
        assert!(within_one_percent(standard_drinks_for(5.0, 12.0), 1.0));
        assert!(within_one_percent(standard_drinks_for(1.5, 40.0), 1.0));
    }

    #[test]
    fn test_double_shot() {
        assert!(within_one_percent(standard_drinks_for(3.0, 40.0), 2.0));
    }

    #[test]
    fn test_degenerate_inputs_yield_zero() {
        assert_eq!(standard_drinks_for(0.0, 5.0), 0.0);
        assert_eq!(standard_drinks_for(12.0, 0.0), 0.0);
        assert_eq!(standard_drinks_for(-12.0, 5.0), 0.0);
        assert_eq!(standard_drinks_for(12.0, -5.0), 0.0);
        assert_eq!(standard_drinks_for(f64::NAN, 5.0), 0.0);
        assert_eq!(standard_drinks_for(12.0, f64::INFINITY), 0.0);
    }
}
