//! # Validation Module
//!
//! Precondition checks for the order-item pricing calculator.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Preconditions                              │
//! │                                                                         │
//! │  1. purchase_price_gbp      > 0                                         │
//! │  2. needed_quantity         > 0                                         │
//! │  3. unit_total_weight_g     > 0                                         │
//! │  4. cargo_cost_per_kg_gbp   > 0                                         │
//! │  5. gbp_rate_avg_bdt        > 0                                         │
//! │  6. offer_price_mode        ∈ { purchase, total }                       │
//! │                                                                         │
//! │  Every rule runs; ALL failures are reported, in this order.             │
//! │  profit_rate is unconstrained (0 and negative margins are allowed).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use landed_core::types::PricingInput;
//! use landed_core::validation::validate_pricing_input;
//!
//! let input = PricingInput::from_numbers("purchase", 10.0, 5.0, 20.0, 500.0, 2.0, 150.0);
//! assert!(validate_pricing_input(&input).ok);
//!
//! let empty = validate_pricing_input(&PricingInput::default());
//! assert!(!empty.ok);
//! assert_eq!(empty.reasons.len(), 5);
//! ```

use crate::error::ValidationError;
use crate::types::{OfferPriceMode, PricingFields, PricingInput, ValidatedPricing, Validation};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a coerced number is strictly positive.
///
/// ## Example
/// ```rust
/// use landed_core::validation::validate_positive;
///
/// assert!(validate_positive("needed_quantity", 1.0).is_ok());
/// assert!(validate_positive("needed_quantity", 0.0).is_err());
/// ```
pub fn validate_positive(field: &'static str, value: f64) -> ValidationResult<()> {
    // Written as !(v > 0) so NaN fails too
    if !(value > 0.0) {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(())
}

/// Validates resolved mode text and returns the mode it names.
///
/// The text is expected in [`PricingFields`] form: already defaulted,
/// trimmed and lower-cased. Empty text here came from a blank value and is
/// invalid.
pub fn validate_offer_price_mode(text: &str) -> ValidationResult<OfferPriceMode> {
    if text.is_empty() {
        return Err(ValidationError::Invalid {
            field: "offer_price_mode",
        });
    }
    text.parse::<OfferPriceMode>()
}

// =============================================================================
// Record Validators
// =============================================================================

/// Runs every pricing rule against coerced fields.
///
/// On success the fields are wrapped in a [`ValidatedPricing`], the input
/// type of [`crate::pricing::compute_offer`]. On failure every violated
/// rule is returned, in rule order.
pub fn check(fields: PricingFields) -> Result<ValidatedPricing, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positives = [
        ("purchase_price_gbp", fields.purchase_price_gbp),
        ("needed_quantity", fields.needed_quantity),
        ("unit_total_weight_g", fields.unit_total_weight_g),
        ("cargo_cost_per_kg_gbp", fields.cargo_cost_per_kg_gbp),
        ("gbp_rate_avg_bdt", fields.gbp_rate_avg_bdt),
    ];
    for (field, value) in positives {
        if let Err(e) = validate_positive(field, value) {
            errors.push(e);
        }
    }

    let mode = match validate_offer_price_mode(&fields.offer_price_mode) {
        Ok(mode) => Some(mode),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match mode {
        Some(mode) if errors.is_empty() => Ok(ValidatedPricing { mode, fields }),
        _ => Err(errors),
    }
}

/// Validates a loose pricing record.
///
/// Coercion never fails: malformed numbers become 0 and are then reported
/// by their positivity rule.
pub fn validate_pricing_input(input: &PricingInput) -> Validation {
    match check(input.resolve()) {
        Ok(_) => Validation {
            ok: true,
            reasons: Vec::new(),
        },
        Err(errors) => Validation {
            ok: false,
            reasons: errors.iter().map(ToString::to_string).collect(),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> PricingInput {
        PricingInput::from_numbers("purchase", 10.0, 5.0, 20.0, 500.0, 2.0, 150.0)
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("x", 0.01).is_ok());
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", -1.0).is_err());
        assert!(validate_positive("x", f64::NAN).is_err());
    }

    #[test]
    fn test_valid_record_passes() {
        let v = validate_pricing_input(&valid_input());
        assert!(v.ok);
        assert!(v.reasons.is_empty());
    }

    #[test]
    fn test_empty_record_reports_all_positivity_rules() {
        let v = validate_pricing_input(&PricingInput::default());
        assert!(!v.ok);
        assert_eq!(
            v.reasons,
            vec![
                "purchase_price_gbp must be > 0",
                "needed_quantity must be > 0",
                "unit_total_weight_g must be > 0",
                "cargo_cost_per_kg_gbp must be > 0",
                "gbp_rate_avg_bdt must be > 0",
            ]
        );
    }

    #[test]
    fn test_invalid_mode_is_reported_last() {
        let mut input = valid_input();
        input.offer_price_mode = Some(json!("landed"));
        input.needed_quantity = Some(json!(0));

        let v = validate_pricing_input(&input);
        assert!(!v.ok);
        assert_eq!(
            v.reasons,
            vec!["needed_quantity must be > 0", "offer_price_mode is invalid"]
        );
    }

    #[test]
    fn test_mode_variants_accepted() {
        for mode in [json!("  Purchase "), json!("TOTAL"), json!(""), json!(null), json!(false)] {
            let mut input = valid_input();
            input.offer_price_mode = Some(mode.clone());
            assert!(validate_pricing_input(&input).ok, "mode {mode} should pass");
        }

        let mut input = valid_input();
        input.offer_price_mode = None;
        assert!(validate_pricing_input(&input).ok);
    }

    #[test]
    fn test_whitespace_mode_is_invalid() {
        for blank in ["   ", "\t", " \n "] {
            let mut input = valid_input();
            input.offer_price_mode = Some(json!(blank));
            let v = validate_pricing_input(&input);
            assert!(!v.ok);
            assert_eq!(v.reasons, vec!["offer_price_mode is invalid"]);
        }
    }

    #[test]
    fn test_numeric_mode_is_invalid() {
        let mut input = valid_input();
        input.offer_price_mode = Some(json!(1));
        let v = validate_pricing_input(&input);
        assert_eq!(v.reasons, vec!["offer_price_mode is invalid"]);
    }

    #[test]
    fn test_unparseable_numbers_fail_positivity() {
        let mut input = valid_input();
        input.gbp_rate_avg_bdt = Some(json!("n/a"));
        input.purchase_price_gbp = Some(json!([10]));

        let v = validate_pricing_input(&input);
        assert_eq!(
            v.reasons,
            vec!["purchase_price_gbp must be > 0", "gbp_rate_avg_bdt must be > 0"]
        );
    }

    #[test]
    fn test_profit_rate_is_unconstrained() {
        let mut input = valid_input();
        input.profit_rate = Some(json!(-35));
        assert!(validate_pricing_input(&input).ok);

        input.profit_rate = Some(json!("garbage"));
        assert!(validate_pricing_input(&input).ok);
    }

    #[test]
    fn test_check_carries_normalized_mode() {
        let mut input = valid_input();
        input.offer_price_mode = Some(json!(" Total"));
        let validated = check(input.resolve()).unwrap();
        assert_eq!(validated.mode(), OfferPriceMode::Total);
        assert_eq!(validated.fields().purchase_price_gbp, 10.0);
    }
}
