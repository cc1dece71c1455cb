//! # Error Types
//!
//! Domain-specific error types for landed-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  landed-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Per-field input failures                       │
//! │                                                                         │
//! │  landed-cli errors (binary)                                            │
//! │  ├── ConfigError      - Bad config file / env override                 │
//! │  └── CliError         - Usage, I/O, JSON                               │
//! │                                                                         │
//! │  Pricing rejections are NOT errors: the facade reports them as data    │
//! │  (ok = false, reasons = [...]) built from ValidationError messages.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by rollup and policy checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// More units were shipped for an order item than were ordered.
    ///
    /// ## When This Occurs
    /// - Two shipments both carry the full quantity of one item
    /// - A shipped_qty was typed into the wrong allocation row
    #[error("Over-ship detected: {order_item_id} shipped={shipped} > ordered={ordered}")]
    OverShipment {
        order_item_id: String,
        shipped: f64,
        ordered: f64,
    },

    /// Status text does not name a known order/shipment status.
    #[error("Unknown {kind} status: '{value}'")]
    UnknownStatus { kind: &'static str, value: String },

    /// Role text does not name a known role.
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    /// The caller tried to write fields its role/status may not touch.
    #[error("{scope} fields are locked by status/role: {}", fields.join(", "))]
    FieldsLocked {
        scope: &'static str,
        fields: Vec<String>,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The `Display` text of each variant is the exact reason string reported
/// by the pricing facade, so it is part of the observable contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value must be strictly greater than zero.
    #[error("{field} must be > 0")]
    MustBePositive { field: &'static str },

    /// Value is not in the allowed set.
    #[error("{field} is invalid")]
    Invalid { field: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
