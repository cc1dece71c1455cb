//! # Pricing Types
//!
//! Records flowing into and out of the order-item pricing calculator.
//!
//! ## Type Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PricingInput          loose record, every field optional,              │
//! │  (serde_json::Value)   any JSON type                                    │
//! │        │                                                                │
//! │        │ resolve()      coercion, once, at the boundary                 │
//! │        ▼                                                                │
//! │  PricingFields         plain f64s + normalized mode text                │
//! │        │                                                                │
//! │        │ validation::check()                                            │
//! │        ▼                                                                │
//! │  ValidatedPricing      only constructible when every rule passed        │
//! │        │                                                                │
//! │        │ pricing::compute_offer()                                       │
//! │        ▼                                                                │
//! │  PricingResult         rounded figures, field names = storage schema   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce::{is_falsy, normalize_key, parse_number_or_default};
use crate::error::ValidationError;

// =============================================================================
// Offer Price Mode
// =============================================================================

/// Where the profit margin is applied when building an offer.
///
/// ```text
/// Purchase:  (purchase × (1 + p)) + cargo      margin on product only
/// Total:     (purchase + cargo) × (1 + p)      margin on landed cost
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OfferPriceMode {
    /// Profit applied to the purchase price before cargo is added.
    #[default]
    Purchase,
    /// Profit applied to purchase + cargo.
    Total,
}

impl OfferPriceMode {
    /// Normalizes mode text: trimmed and lower-cased.
    ///
    /// Empty text means `Purchase`. The default applies before trimming, so
    /// text that is only whitespace is invalid.
    ///
    /// ## Example
    /// ```rust
    /// use landed_core::types::OfferPriceMode;
    ///
    /// assert_eq!(OfferPriceMode::normalize("  Purchase "), Some(OfferPriceMode::Purchase));
    /// assert_eq!(OfferPriceMode::normalize("TOTAL"), Some(OfferPriceMode::Total));
    /// assert_eq!(OfferPriceMode::normalize(""), Some(OfferPriceMode::Purchase));
    /// assert_eq!(OfferPriceMode::normalize("   "), None);
    /// assert_eq!(OfferPriceMode::normalize("landed"), None);
    /// ```
    pub fn normalize(text: &str) -> Option<Self> {
        let text = if text.is_empty() {
            OfferPriceMode::default().as_str()
        } else {
            text
        };
        match text.trim().to_lowercase().as_str() {
            "purchase" => Some(OfferPriceMode::Purchase),
            "total" => Some(OfferPriceMode::Total),
            _ => None,
        }
    }

    /// Storage form of the mode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OfferPriceMode::Purchase => "purchase",
            OfferPriceMode::Total => "total",
        }
    }
}

impl fmt::Display for OfferPriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferPriceMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferPriceMode::normalize(s).ok_or(ValidationError::Invalid {
            field: "offer_price_mode",
        })
    }
}

// =============================================================================
// Pricing Input
// =============================================================================

/// A loose order-item pricing record, as stored or posted by a client.
///
/// Any subset of fields may be missing and any field may hold any JSON
/// type; nothing is interpreted until [`PricingInput::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_price_mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price_gbp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needed_quantity: Option<Value>,
    /// Percentage: 15 means 15%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_rate: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_total_weight_g: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_cost_per_kg_gbp: Option<Value>,
    /// BDT per GBP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gbp_rate_avg_bdt: Option<Value>,
}

impl PricingInput {
    /// Builds a fully populated record from already-typed numbers.
    pub fn from_numbers(
        offer_price_mode: &str,
        purchase_price_gbp: f64,
        needed_quantity: f64,
        profit_rate: f64,
        unit_total_weight_g: f64,
        cargo_cost_per_kg_gbp: f64,
        gbp_rate_avg_bdt: f64,
    ) -> Self {
        PricingInput {
            offer_price_mode: Some(Value::from(offer_price_mode)),
            purchase_price_gbp: Some(Value::from(purchase_price_gbp)),
            needed_quantity: Some(Value::from(needed_quantity)),
            profit_rate: Some(Value::from(profit_rate)),
            unit_total_weight_g: Some(Value::from(unit_total_weight_g)),
            cargo_cost_per_kg_gbp: Some(Value::from(cargo_cost_per_kg_gbp)),
            gbp_rate_avg_bdt: Some(Value::from(gbp_rate_avg_bdt)),
        }
    }

    /// Coerces every field. Never fails: unusable numbers become 0.
    pub fn resolve(&self) -> PricingFields {
        let num = |v: &Option<Value>| parse_number_or_default(v.as_ref(), 0.0);

        // Unset modes take the default before trimming; blank text stays blank
        let offer_price_mode = if is_falsy(self.offer_price_mode.as_ref()) {
            OfferPriceMode::default().as_str().to_string()
        } else {
            normalize_key(self.offer_price_mode.as_ref())
        };

        PricingFields {
            offer_price_mode,
            purchase_price_gbp: num(&self.purchase_price_gbp),
            needed_quantity: num(&self.needed_quantity),
            profit_rate: num(&self.profit_rate),
            unit_total_weight_g: num(&self.unit_total_weight_g),
            cargo_cost_per_kg_gbp: num(&self.cargo_cost_per_kg_gbp),
            gbp_rate_avg_bdt: num(&self.gbp_rate_avg_bdt),
        }
    }
}

/// A [`PricingInput`] after coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingFields {
    /// Trimmed, lower-cased mode text; `"purchase"` when not set.
    pub offer_price_mode: String,
    pub purchase_price_gbp: f64,
    pub needed_quantity: f64,
    pub profit_rate: f64,
    pub unit_total_weight_g: f64,
    pub cargo_cost_per_kg_gbp: f64,
    pub gbp_rate_avg_bdt: f64,
}

/// Pricing fields that passed every validation rule.
///
/// The only way to obtain one is [`crate::validation::check`], so the offer
/// computer can never see input that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPricing {
    pub(crate) mode: OfferPriceMode,
    pub(crate) fields: PricingFields,
}

impl ValidatedPricing {
    /// The normalized pricing mode.
    #[inline]
    pub fn mode(&self) -> OfferPriceMode {
        self.mode
    }

    /// The coerced numeric fields.
    #[inline]
    pub fn fields(&self) -> &PricingFields {
        &self.fields
    }
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of validating a pricing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Validation {
    pub ok: bool,
    /// One message per failed rule, in rule order.
    pub reasons: Vec<String>,
}

/// Offered and final figures for one order item.
///
/// GBP fields carry 2 decimals, BDT fields are whole taka. Field names are
/// persisted verbatim next to the order item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub mode: OfferPriceMode,
    pub unit_weight_kg: f64,
    pub cargo_per_unit_gbp: f64,
    pub purchase_per_unit_bdt: f64,
    pub cargo_per_unit_bdt: f64,
    pub offered_product_unit_gbp: f64,
    pub offered_total_unit_gbp: f64,
    pub offered_product_unit_bdt: f64,
    pub offered_total_unit_bdt: f64,
    pub offered_total_bdt: f64,
    pub purchase_total_bdt: f64,
    pub profit_bdt: f64,
    pub profit_pct_effective: f64,
}

/// What the pricing facade returns.
///
/// `output` is `null` exactly when `ok` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingOutcome {
    pub ok: bool,
    pub reasons: Vec<String>,
    pub output: Option<PricingResult>,
}

// =============================================================================
// Unit Tests
// =============================================================================
