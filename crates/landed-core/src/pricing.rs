//! # Pricing Module
//!
//! The order-item offer calculator: per-unit and per-order figures in GBP
//! and BDT under the two pricing modes.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate(input)                                                       │
//! │      │                                                                  │
//! │      ├── validation::check(input.resolve())                             │
//! │      │        │                                                         │
//! │      │        ├── Err(reasons) ──► { ok: false, reasons, output: null } │
//! │      │        │                                                         │
//! │      │        └── Ok(validated)                                         │
//! │      │                 │                                                │
//! │      └──────► compute_offer(&validated) ──► { ok: true, [], output }    │
//! │                                                                         │
//! │  Shared:   cargo/unit (GBP) = round2(kg × cargo/kg)                     │
//! │            purchase/unit (BDT), cargo/unit (BDT) = round0(GBP × rate)   │
//! │                                                                         │
//! │  Purchase: product = round2(purchase × (1+p))   total = product + cargo │
//! │  Total:    total = round2((purchase + cargo) × (1+p))  product = t - c  │
//! │                                                                         │
//! │  Order:    offered_total_bdt, purchase_total_bdt, profit, profit %      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use landed_core::pricing::calculate;
//! use landed_core::types::PricingInput;
//!
//! let input = PricingInput::from_numbers("purchase", 10.0, 5.0, 20.0, 500.0, 2.0, 150.0);
//! let outcome = calculate(&input);
//!
//! let output = outcome.output.unwrap();
//! assert_eq!(output.offered_total_bdt, 9750.0);
//! assert_eq!(output.profit_pct_effective, 18.18);
//! ```

use tracing::debug;

use crate::money::{as_pct, Currency};
use crate::types::{OfferPriceMode, PricingInput, PricingOutcome, PricingResult, ValidatedPricing};
use crate::validation::check;
use crate::GRAMS_PER_KG;

// =============================================================================
// Offer Computer
// =============================================================================

/// Per-unit offer figures produced by one pricing mode.
#[derive(Debug, Clone, Copy, PartialEq)]
struct UnitOffer {
    product_gbp: f64,
    total_gbp: f64,
    product_bdt: f64,
    total_bdt: f64,
}

/// Computes every offered and final figure for a validated record.
///
/// Deterministic and side-effect free. GBP figures are finalized before
/// they are converted, so every quantity crosses the FX rate once.
pub fn compute_offer(validated: &ValidatedPricing) -> PricingResult {
    let gbp = Currency::Gbp;
    let bdt = Currency::Bdt;
    let f = validated.fields();
    let rate = f.gbp_rate_avg_bdt;

    let unit_weight_kg = f.unit_total_weight_g / GRAMS_PER_KG;
    let cargo_per_unit_gbp = gbp.round(unit_weight_kg * f.cargo_cost_per_kg_gbp);
    let purchase_per_unit_bdt = gbp.convert(f.purchase_price_gbp, bdt, rate);
    let cargo_per_unit_bdt = gbp.convert(cargo_per_unit_gbp, bdt, rate);

    let markup = 1.0 + as_pct(f.profit_rate);

    let unit = match validated.mode() {
        OfferPriceMode::Purchase => {
            let product_gbp = gbp.round(f.purchase_price_gbp * markup);
            let total_gbp = gbp.round(product_gbp + cargo_per_unit_gbp);
            let product_bdt = gbp.convert(product_gbp, bdt, rate);
            let total_bdt = bdt.round(product_bdt + cargo_per_unit_bdt);
            UnitOffer {
                product_gbp,
                total_gbp,
                product_bdt,
                total_bdt,
            }
        }
        OfferPriceMode::Total => {
            let base_total_gbp = gbp.round(f.purchase_price_gbp + cargo_per_unit_gbp);
            let total_gbp = gbp.round(base_total_gbp * markup);
            let product_gbp = gbp.round(total_gbp - cargo_per_unit_gbp);
            let total_bdt = gbp.convert(total_gbp, bdt, rate);
            let product_bdt = bdt.round(total_bdt - cargo_per_unit_bdt);
            UnitOffer {
                product_gbp,
                total_gbp,
                product_bdt,
                total_bdt,
            }
        }
    };

    let offered_total_bdt = bdt.round(unit.total_bdt * f.needed_quantity);
    let purchase_total_bdt =
        bdt.round((purchase_per_unit_bdt + cargo_per_unit_bdt) * f.needed_quantity);
    let profit_bdt = bdt.round(offered_total_bdt - purchase_total_bdt);
    let profit_pct_effective = if purchase_total_bdt > 0.0 {
        gbp.round((profit_bdt / purchase_total_bdt) * 100.0)
    } else {
        0.0
    };

    PricingResult {
        mode: validated.mode(),
        unit_weight_kg: gbp.round(unit_weight_kg),
        cargo_per_unit_gbp,
        purchase_per_unit_bdt,
        cargo_per_unit_bdt,
        offered_product_unit_gbp: unit.product_gbp,
        offered_total_unit_gbp: unit.total_gbp,
        offered_product_unit_bdt: unit.product_bdt,
        offered_total_unit_bdt: unit.total_bdt,
        offered_total_bdt,
        purchase_total_bdt,
        profit_bdt,
        profit_pct_effective,
    }
}

// =============================================================================
// Facade
// =============================================================================

/// Validates and prices one order-item record.
///
/// This is the entry point callers should use. Invalid input is reported
/// as data (`ok: false` plus every reason) and never reaches the computer.
pub fn calculate(input: &PricingInput) -> PricingOutcome {
    match check(input.resolve()) {
        Ok(validated) => PricingOutcome {
            ok: true,
            reasons: Vec::new(),
            output: Some(compute_offer(&validated)),
        },
        Err(errors) => {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            debug!(?reasons, "Pricing input rejected");
            PricingOutcome {
                ok: false,
                reasons,
                output: None,
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================


// =============================================================================
// Property Tests
// =============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn positive() -> impl Strategy<Value = f64> {
        (1u32..=1_000_000u32).prop_map(|n| n as f64 / 100.0)
    }

    fn mode() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("purchase"), Just("total")]
    }

    /// Any non-positive gated field is reported and blocks the output.
    #[test]
    fn prop_positivity_gating() {
        let fields = [
            "purchase_price_gbp",
            "needed_quantity",
            "unit_total_weight_g",
            "cargo_cost_per_kg_gbp",
            "gbp_rate_avg_bdt",
        ];
        proptest!(|(
            idx in 0usize..5,
            bad in -1000i32..=0,
            m in mode(),
            price in positive(),
            qty in positive(),
        )| {
            let mut input = PricingInput::from_numbers(m, price, qty, 15.0, 250.0, 3.0, 140.0);
            let field = fields[idx];
            let bad = json!(bad);
            match field {
                "purchase_price_gbp" => input.purchase_price_gbp = Some(bad),
                "needed_quantity" => input.needed_quantity = Some(bad),
                "unit_total_weight_g" => input.unit_total_weight_g = Some(bad),
                "cargo_cost_per_kg_gbp" => input.cargo_cost_per_kg_gbp = Some(bad),
                _ => input.gbp_rate_avg_bdt = Some(bad),
            }

            let outcome = calculate(&input);
            prop_assert!(!outcome.ok);
            prop_assert!(outcome.output.is_none());
            let expected = format!("{field} must be > 0");
            prop_assert!(outcome.reasons.contains(&expected));
        });
    }

    /// Mode text differing only in case and surrounding whitespace is accepted.
    #[test]
    fn prop_mode_normalization() {
        proptest!(|(
            m in mode(),
            upper_mask in any::<u8>(),
            lead in 0usize..4,
            trail in 0usize..4,
        )| {
            let cased: String = m
                .chars()
                .enumerate()
                .map(|(i, c)| if upper_mask & (1 << (i % 8)) != 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            let text = format!("{}{}{}", " ".repeat(lead), cased, "\t".repeat(trail));

            let mut input = PricingInput::from_numbers(m, 10.0, 1.0, 10.0, 100.0, 5.0, 150.0);
            input.offer_price_mode = Some(json!(text));

            let outcome = calculate(&input);
            prop_assert!(outcome.ok);
            prop_assert_eq!(outcome.output.unwrap().mode.as_str(), m);
        });
    }

    /// Valid input always prices, finitely, and the same way twice.
    #[test]
    fn prop_valid_input_is_finite_and_idempotent() {
        proptest!(|(
            m in mode(),
            price in positive(),
            qty in positive(),
            profit in -100i32..=300,
            weight in positive(),
            cargo in positive(),
            rate in positive(),
        )| {
            let input = PricingInput::from_numbers(m, price, qty, profit as f64, weight, cargo, rate);

            let first = calculate(&input);
            let second = calculate(&input);
            prop_assert_eq!(&first, &second);

            let r = first.output.unwrap();
            prop_assert!(r.profit_pct_effective.is_finite());
            prop_assert!(r.offered_total_bdt.is_finite());
            prop_assert_eq!(r.offered_total_bdt.fract(), 0.0);
            prop_assert_eq!(r.purchase_total_bdt.fract(), 0.0);
            prop_assert_eq!(r.profit_bdt, r.offered_total_bdt - r.purchase_total_bdt);
        });
    }
}
