//! # Money Module
//!
//! Rounding rules for the two currencies the import desk deals in.
//!
//! ## Two Currencies, Two Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GBP (supplier side)          BDT (customer side)                       │
//! │  ───────────────────          ───────────────────                       │
//! │  2 decimal places (pence)     whole taka, no fractional unit            │
//! │  round2(x)                    round0(x)                                 │
//! │                                                                         │
//! │  Purchase price ──► round2 ──► × FX rate ──► round0 ──► customer price  │
//! │                                                                         │
//! │  Every GBP figure is finalized BEFORE it is converted, so each          │
//! │  quantity crosses the FX boundary exactly once.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tie Handling
//! Amounts are carried as `f64` because the stored records are plain JSON
//! numbers, and the rounding has to agree with what the rest of the system
//! already persisted:
//!
//! - `round2` looks at the *exact* binary value of the float. `1.005` is
//!   stored as `1.00499999999999989...`, so it rounds to `1.00`; only exact
//!   ties such as `0.125` round away from zero (`0.13`).
//! - `round0` rounds exact halves toward positive infinity:
//!   `2.5 → 3`, `-2.5 → -2`.
//!
//! ## Usage
//! ```rust
//! use landed_core::money::{round0, round2, Currency};
//!
//! assert_eq!(round2(1.005), 1.0);
//! assert_eq!(round2(0.125), 0.13);
//! assert_eq!(round0(2.5), 3.0);
//! assert_eq!(round0(-2.5), -2.0);
//! assert_eq!(Currency::Bdt.round(1949.5), 1950.0);
//! ```

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coerce::finite_or;

// =============================================================================
// Rounding Primitives
// =============================================================================

/// Rounds to 2 decimal places (GBP).
///
/// Non-finite input rounds to 0.
pub fn round2(x: f64) -> f64 {
    let x = finite_or(x, 0.0);

    // Beyond Decimal's range every f64 is already an integer.
    let Some(exact) = Decimal::from_f64_retain(x) else {
        return x;
    };

    let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Going through text gives the nearest f64 to the 2dp decimal, same as
    // reading the amount back from storage.
    let value = rounded.to_string().parse::<f64>().unwrap_or(x);
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Rounds to the nearest integer (BDT), halves toward +∞.
///
/// Non-finite input rounds to 0.
pub fn round0(x: f64) -> f64 {
    let x = finite_or(x, 0.0);
    let floor = x.floor();
    // x - floor is exact for every finite f64
    let value = if x - floor >= 0.5 { floor + 1.0 } else { floor };
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Converts a percentage to a fraction: `15 → 0.15`.
#[inline]
pub fn as_pct(x: f64) -> f64 {
    finite_or(x, 0.0) / 100.0
}

// =============================================================================
// Currency
// =============================================================================

/// A currency handled by the desk, carrying its rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// British pound, 2 decimal places.
    Gbp,
    /// Bangladeshi taka, whole units.
    Bdt,
}

impl Currency {
    /// Number of decimal places amounts in this currency carry.
    pub const fn decimals(&self) -> u32 {
        match self {
            Currency::Gbp => 2,
            Currency::Bdt => 0,
        }
    }

    /// Rounds an amount with this currency's rule.
    #[inline]
    pub fn round(&self, x: f64) -> f64 {
        match self {
            Currency::Gbp => round2(x),
            Currency::Bdt => round0(x),
        }
    }

    /// Converts a finalized amount in this currency into `target`.
    ///
    /// `rate` is units of BDT per GBP. Converting to the same currency only
    /// rounds.
    pub fn convert(&self, amount: f64, target: Currency, rate: f64) -> f64 {
        match (self, target) {
            (Currency::Gbp, Currency::Bdt) => target.round(amount * rate),
            (Currency::Bdt, Currency::Gbp) if rate != 0.0 => target.round(amount / rate),
            (Currency::Bdt, Currency::Gbp) => 0.0,
            _ => target.round(amount),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Gbp => write!(f, "GBP"),
            Currency::Bdt => write!(f, "BDT"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
