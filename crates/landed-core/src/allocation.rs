//! # Allocation Module
//!
//! Money figures for one shipment allocation row: how much of an order
//! item travelled in a shipment, what it cost landed, what it earned.
//!
//! ## Allocation Costing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shipment (rates, cargo/kg)    Pricing mode config    Allocation row    │
//! │            │                          │                     │           │
//! │            └──────────────┬───────────┴─────────────────────┘           │
//! │                           ▼                                             │
//! │                 compute_allocation_amounts                              │
//! │                           │                                             │
//! │   weights:   unit_total = product + package                             │
//! │              allocated / shipped = unit_total × qty                     │
//! │                                                                         │
//! │   product:   GBP = round2(shipped_qty × buy)  ─► BDT (product or avg)   │
//! │   cargo:     GBP = round2(shipped_wt × cargo/kg) ─► BDT (cargo or avg)  │
//! │   revenue:   GBP quote ─► sell unit × qty ─► BDT (revenue rate source)  │
//! │              BDT quote ─► final unit × qty, or landed × (1 + p)         │
//! │   profit:    revenue − product cost      (PRODUCT_ONLY)                 │
//! │              revenue − landed cost       (anything else)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that `profit_rate` here is a fraction (`0.2` = 20%), the way the
//! allocation sheet stores it, unlike the percentage used by the order-item
//! calculator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce::coerce_text;
use crate::money::{round0, round2};

// =============================================================================
// Pricing Mode Configuration
// =============================================================================

/// Currency an order item is quoted in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
pub enum QuoteCurrency {
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "BDT")]
    Bdt,
    /// Unrecognized or blank; such rows earn no revenue.
    #[default]
    Unknown,
}

impl QuoteCurrency {
    /// Parses the sheet vocabulary (`GBP`, `BDT`); case-sensitive.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "GBP" => QuoteCurrency::Gbp,
            "BDT" => QuoteCurrency::Bdt,
            _ => QuoteCurrency::Unknown,
        }
    }
}

/// Which costs the profit figure is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfitBase {
    /// Profit = revenue − product cost.
    ProductOnly,
    /// Profit = revenue − (product + cargo) cost. Also the fallback.
    #[default]
    ProductPlusCargo,
}

impl ProfitBase {
    /// Parses the sheet vocabulary; anything but `PRODUCT_ONLY` is landed.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "PRODUCT_ONLY" => ProfitBase::ProductOnly,
            _ => ProfitBase::ProductPlusCargo,
        }
    }
}

/// Which exchange rates convert product and cargo costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionRule {
    /// Product at `gbp_rate_product`, cargo at `gbp_rate_cargo`.
    SeparateRates,
    /// Everything at `gbp_avg_rate`. Also the fallback.
    #[default]
    AvgRate,
}

impl ConversionRule {
    /// Parses the sheet vocabulary; anything but `SEPARATE_RATES` is average.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "SEPARATE_RATES" => ConversionRule::SeparateRates,
            _ => ConversionRule::AvgRate,
        }
    }
}

/// Rate used to convert GBP revenue into BDT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Product,
    Cargo,
    #[default]
    Avg,
}

impl RateSource {
    /// Parses the sheet vocabulary, case-insensitively; unknown is `Avg`.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "product" => RateSource::Product,
            "cargo" => RateSource::Cargo,
            _ => RateSource::Avg,
        }
    }
}

// Catalog cells are hand-typed, so they deserialize through `parse`
// rather than by exact variant name.
fn catalog_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(coerce_text(Some(&raw)))
}

macro_rules! deserialize_via_parse {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    catalog_text(deserializer).map(|text| <$ty>::parse(&text))
                }
            }
        )+
    };
}

deserialize_via_parse!(QuoteCurrency, ProfitBase, ConversionRule, RateSource);

/// A row of the pricing-modes catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct PricingModeConfig {
    pub pricing_mode_id: String,
    pub currency: QuoteCurrency,
    pub profit_base: ProfitBase,
    pub conversion_rule: ConversionRule,
    pub rate_source_revenue: RateSource,
}

// =============================================================================
// Inputs
// =============================================================================

/// Exchange rates and cargo tariff of one shipment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ShipmentRates {
    pub gbp_avg_rate: f64,
    pub gbp_rate_product: f64,
    pub gbp_rate_cargo: f64,
    pub cargo_cost_per_kg: f64,
}

impl ShipmentRates {
    fn product_rate(&self, rule: ConversionRule) -> f64 {
        match rule {
            ConversionRule::SeparateRates => self.gbp_rate_product,
            ConversionRule::AvgRate => self.gbp_avg_rate,
        }
    }

    fn cargo_rate(&self, rule: ConversionRule) -> f64 {
        match rule {
            ConversionRule::SeparateRates => self.gbp_rate_cargo,
            ConversionRule::AvgRate => self.gbp_avg_rate,
        }
    }

    /// Revenue rate; a zero product/cargo rate falls back to the average.
    fn revenue_rate(&self, source: RateSource) -> f64 {
        let chosen = match source {
            RateSource::Product => self.gbp_rate_product,
            RateSource::Cargo => self.gbp_rate_cargo,
            RateSource::Avg => self.gbp_avg_rate,
        };
        if chosen != 0.0 {
            chosen
        } else {
            self.gbp_avg_rate
        }
    }
}

/// One allocation row joined with its order item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct AllocationInput {
    pub allocated_qty: f64,
    pub shipped_qty: f64,
    /// kg per unit.
    pub unit_product_weight: f64,
    /// kg per unit.
    pub unit_package_weight: f64,
    pub buy_price_gbp: f64,
    /// Fraction, e.g. 0.2 for 20%.
    pub profit_rate: f64,
    /// Agreed GBP unit price, overriding the markup when set.
    pub final_unit_gbp: Option<f64>,
    /// Agreed BDT unit price, overriding the markup when set.
    pub final_unit_bdt: Option<f64>,
}

/// Rounded figures written back to the allocation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AllocationAmounts {
    pub unit_total_weight: f64,
    pub allocated_weight: f64,
    pub shipped_weight: f64,
    pub buy_price_gbp: f64,
    pub product_cost_gbp: f64,
    pub product_cost_bdt: f64,
    pub cargo_cost_gbp: f64,
    pub cargo_cost_bdt: f64,
    pub revenue_bdt: f64,
    pub total_cost_bdt: f64,
    pub profit_bdt: f64,
}

// =============================================================================
// Calculation
// =============================================================================

/// Computes the money figures for one allocation row.
///
/// GBP amounts are rounded to 2dp, BDT amounts to whole taka.
pub fn compute_allocation_amounts(
    alloc: &AllocationInput,
    shipment: &ShipmentRates,
    mode: &PricingModeConfig,
) -> AllocationAmounts {
    let unit_total_weight = alloc.unit_product_weight + alloc.unit_package_weight;
    let allocated_weight = unit_total_weight * alloc.allocated_qty;
    let shipped_weight = unit_total_weight * alloc.shipped_qty;

    let product_cost_gbp = round2(alloc.shipped_qty * alloc.buy_price_gbp);
    let product_cost_bdt = round0(product_cost_gbp * shipment.product_rate(mode.conversion_rule));

    let cargo_cost_gbp = round2(shipped_weight * shipment.cargo_cost_per_kg);
    let cargo_cost_bdt = round0(cargo_cost_gbp * shipment.cargo_rate(mode.conversion_rule));

    let total_cost_bdt = round0(product_cost_bdt + cargo_cost_bdt);
    let markup = 1.0 + alloc.profit_rate;

    let revenue_bdt = match mode.currency {
        QuoteCurrency::Gbp => {
            let sell_unit_gbp = match alloc.final_unit_gbp.filter(|v| v.is_finite()) {
                Some(agreed) => round2(agreed),
                None => round2(alloc.buy_price_gbp * markup),
            };
            let product_revenue_gbp = round2(alloc.shipped_qty * sell_unit_gbp);
            round0(product_revenue_gbp * shipment.revenue_rate(mode.rate_source_revenue))
        }
        QuoteCurrency::Bdt => match alloc.final_unit_bdt.filter(|v| v.is_finite()) {
            Some(agreed) => round0(alloc.shipped_qty * agreed),
            None => round0(total_cost_bdt * markup),
        },
        QuoteCurrency::Unknown => 0.0,
    };

    let profit_bdt = match mode.profit_base {
        ProfitBase::ProductOnly => round0(revenue_bdt - product_cost_bdt),
        ProfitBase::ProductPlusCargo => round0(revenue_bdt - total_cost_bdt),
    };

    AllocationAmounts {
        unit_total_weight,
        allocated_weight,
        shipped_weight,
        buy_price_gbp: round2(alloc.buy_price_gbp),
        product_cost_gbp,
        product_cost_bdt,
        cargo_cost_gbp,
        cargo_cost_bdt,
        revenue_bdt,
        total_cost_bdt,
        profit_bdt,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
