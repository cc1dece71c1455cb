//! # landed-core: Pure Pricing Logic for Landed
//!
//! This crate holds every business rule of the import-reselling back office
//! as pure functions with no I/O. Callers hand in loose records and get
//! rounded money figures back.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Landed Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Sheet / Web front end / landed-cli (JSON in, out)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ loose records (serde_json::Value)      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ landed-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  coerce  │ │  money   │ │validation│ │ pricing  │          │   │
//! │  │   │ Number() │ │ round2   │ │  rules   │ │  offers  │          │   │
//! │  │   │  rules   │ │ round0   │ │ reasons  │ │  facade  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │allocation│ │  rollup  │ │  status  │ │  claims  │          │   │
//! │  │   │ shipment │ │  order   │ │  roles   │ │  token   │          │   │
//! │  │   │  money   │ │ progress │ │  guards  │ │  flags   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`coerce`] - Loose-value coercion (numbers, text, flags)
//! - [`money`] - Rounding rules and currencies
//! - [`types`] - Pricing records and results
//! - [`validation`] - Pricing preconditions
//! - [`pricing`] - Offer computer and the `calculate` facade
//! - [`allocation`] - Per-shipment allocation amounts
//! - [`rollup`] - Order progress and totals
//! - [`status`] - Status transitions, roles and field guards
//! - [`claims`] - Token claims derived from user profiles
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, bit for bit
//! 2. **No I/O**: storage and delivery belong to the callers
//! 3. **Coerce Once**: loose values are coerced at the boundary, never deeper
//! 4. **Round Per Currency**: GBP to pennies, BDT to whole taka
//!
//! ## Example Usage
//!
//! ```rust
//! use landed_core::{calculate, PricingInput};
//!
//! let input = PricingInput::from_numbers("purchase", 10.0, 5.0, 20.0, 500.0, 2.0, 150.0);
//! let outcome = calculate(&input);
//!
//! assert!(outcome.ok);
//! let result = outcome.output.unwrap();
//! assert_eq!(result.offered_total_bdt, 9750.0);
//! assert_eq!(result.profit_pct_effective, 18.18);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod claims;
pub mod coerce;
pub mod error;
pub mod money;
pub mod pricing;
pub mod rollup;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Currency;
pub use pricing::{calculate, compute_offer};
pub use types::*;
pub use validation::validate_pricing_input;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Grams in a kilogram; weights are entered in grams, cargo is billed per kg.
pub const GRAMS_PER_KG: f64 = 1000.0;

/// Tolerance when comparing shipped and ordered quantities.
pub const QTY_EPSILON: f64 = 1e-9;
