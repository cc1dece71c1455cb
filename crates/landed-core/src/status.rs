//! # Status Policy
//!
//! Order and shipment lifecycles, and what each role may change at each
//! point of them.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  draft ──► submitted ──► priced ◄──► under_review                       │
//! │                            │              │                             │
//! │                            └──► finalized ◄┘                            │
//! │                                    │   ▲                                │
//! │                                    ▼   │ (back to under_review)         │
//! │                               processing ◄──► partially_delivered       │
//! │                                    │                │                   │
//! │                                    └──► delivered ◄─┘                   │
//! │                                                                         │
//! │  Every non-terminal status may also move to cancelled.                  │
//! │  delivered and cancelled are terminal.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shipment Lifecycle
//! ```text
//! draft ──► in_transit ──► received ──► closed
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of a customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Submitted,
    Priced,
    UnderReview,
    Finalized,
    Processing,
    PartiallyDelivered,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Draft,
        OrderStatus::Submitted,
        OrderStatus::Priced,
        OrderStatus::UnderReview,
        OrderStatus::Finalized,
        OrderStatus::Processing,
        OrderStatus::PartiallyDelivered,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Submitted => "submitted",
            OrderStatus::Priced => "priced",
            OrderStatus::UnderReview => "under_review",
            OrderStatus::Finalized => "finalized",
            OrderStatus::Processing => "processing",
            OrderStatus::PartiallyDelivered => "partially_delivered",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step.
    pub fn next_statuses(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Draft => &[Submitted, Cancelled],
            Submitted => &[Priced, Cancelled],
            Priced => &[UnderReview, Finalized, Cancelled],
            UnderReview => &[Priced, Finalized, Cancelled],
            Finalized => &[Processing, UnderReview, Cancelled],
            Processing => &[PartiallyDelivered, Delivered, Cancelled],
            PartiallyDelivered => &[Processing, Delivered, Cancelled],
            Delivered => &[],
            Cancelled => &[],
        }
    }

    /// Whether `self → to` is a legal single step.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.next_statuses().contains(&to)
    }

    /// Whether the customer sees the order at all.
    pub fn is_customer_visible(&self) -> bool {
        !matches!(self, OrderStatus::Draft | OrderStatus::Submitted)
    }

    /// Whether the customer may still negotiate.
    pub fn is_customer_editable(&self) -> bool {
        matches!(self, OrderStatus::Priced | OrderStatus::UnderReview)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or(CoreError::UnknownStatus {
                kind: "order",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Shipment Status
// =============================================================================

/// Lifecycle status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Draft,
    InTransit,
    Received,
    Closed,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 5] = [
        ShipmentStatus::Draft,
        ShipmentStatus::InTransit,
        ShipmentStatus::Received,
        ShipmentStatus::Closed,
        ShipmentStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Draft => "draft",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Received => "received",
            ShipmentStatus::Closed => "closed",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn next_statuses(&self) -> &'static [ShipmentStatus] {
        use ShipmentStatus::*;
        match self {
            Draft => &[InTransit],
            InTransit => &[Received],
            Received => &[Closed],
            Closed => &[],
            Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, to: ShipmentStatus) -> bool {
        self.next_statuses().contains(&to)
    }

    /// Closed and cancelled shipments are read-only.
    pub fn is_locked(&self) -> bool {
        matches!(self, ShipmentStatus::Closed | ShipmentStatus::Cancelled)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ShipmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or(CoreError::UnknownStatus {
                kind: "shipment",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Text-Level Transition Checks
// =============================================================================

/// Checks an order transition given raw status text.
///
/// Blank, unknown or identical statuses are never a valid transition.
///
/// ## Example
/// ```rust
/// use landed_core::status::can_transition_order_status;
///
/// assert!(can_transition_order_status("Priced", " finalized "));
/// assert!(!can_transition_order_status("delivered", "processing"));
/// assert!(!can_transition_order_status("draft", "draft"));
/// ```
pub fn can_transition_order_status(from: &str, to: &str) -> bool {
    match (from.parse::<OrderStatus>(), to.parse::<OrderStatus>()) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Checks a shipment transition given raw status text.
pub fn can_transition_shipment_status(from: &str, to: &str) -> bool {
    match (from.parse::<ShipmentStatus>(), to.parse::<ShipmentStatus>()) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

// =============================================================================
// Roles & Capabilities
// =============================================================================

/// Application role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Ops,
    Sales,
    Customer,
    Investor,
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "ops" => Ok(Role::Ops),
            "sales" => Ok(Role::Sales),
            "customer" => Ok(Role::Customer),
            "investor" => Ok(Role::Investor),
            _ => Err(CoreError::UnknownRole(s.to_string())),
        }
    }
}

/// What a role may do with an order in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderCapabilities {
    pub can_view: bool,
    pub can_edit_header: bool,
    pub can_edit_items: bool,
    pub can_change_status: bool,
    pub can_edit_negotiation: bool,
    pub can_edit_needed_qty: bool,
    pub can_edit_purchase_price: bool,
    pub can_edit_profit_rate: bool,
    pub can_edit_offer_mode: bool,
    pub can_edit_offered_price: bool,
    pub can_edit_customer_counter: bool,
    pub can_edit_final_price: bool,
    pub can_soft_delete_item: bool,
    pub can_run_recompute: bool,
}

impl OrderCapabilities {
    pub fn for_role(role: Role, status: OrderStatus) -> Self {
        let is_admin = role == Role::Admin;
        let is_ops = role == Role::Ops;
        let is_customer = role == Role::Customer;

        let admin_locked = status == OrderStatus::Cancelled;
        let ops_active = status != OrderStatus::Cancelled;
        let customer_editable = status.is_customer_editable();

        let admin_write = is_admin && !admin_locked;
        let ops_write = is_ops && ops_active;
        let admin_can_price = is_admin
            && matches!(
                status,
                OrderStatus::Submitted
                    | OrderStatus::Priced
                    | OrderStatus::UnderReview
                    | OrderStatus::Finalized
            );
        let ops_can_edit_qty = is_ops
            && matches!(
                status,
                OrderStatus::Submitted
                    | OrderStatus::Priced
                    | OrderStatus::UnderReview
                    | OrderStatus::Finalized
                    | OrderStatus::Processing
                    | OrderStatus::PartiallyDelivered
            );

        OrderCapabilities {
            can_view: !is_customer || status.is_customer_visible(),
            can_edit_header: admin_write || ops_write,
            can_edit_items: admin_write || ops_write || (is_customer && customer_editable),
            can_change_status: is_admin,
            can_edit_negotiation: is_admin || (is_customer && customer_editable),
            can_edit_needed_qty: admin_write || ops_can_edit_qty,
            can_edit_purchase_price: admin_write,
            can_edit_profit_rate: admin_can_price,
            can_edit_offer_mode: admin_can_price,
            can_edit_offered_price: admin_can_price,
            can_edit_customer_counter: (is_customer && customer_editable) || admin_can_price,
            can_edit_final_price: admin_can_price,
            can_soft_delete_item: admin_write,
            can_run_recompute: (is_admin && ops_active) || is_ops,
        }
    }

    /// Guard for a single order-item field; `None` for fields with no guard.
    fn guard(&self, field: &str) -> Option<bool> {
        let allowed = match field {
            "needed_quantity" | "name" | "brand" | "image_url" => self.can_edit_needed_qty,
            // Derived from allocations, never typed in
            "delivered_quantity" => false,
            "purchase_price_gbp" => self.can_edit_purchase_price,
            "profit_rate" => self.can_edit_profit_rate,
            "offer_price_bdt_on_purchase" | "offer_price_bdt_on_total" => {
                self.can_edit_offered_price
            }
            "offer_price_mode" => self.can_edit_offer_mode,
            "offered_price_bdt" => self.can_edit_offered_price,
            "customer_counter_offer_price_bdt" => self.can_edit_customer_counter,
            "final_price_bdt" => self.can_edit_final_price,
            "is_deleted" | "deleted_at" | "deleted_by" | "delete_reason" => {
                self.can_soft_delete_item
            }
            _ => return None,
        };
        Some(allowed)
    }
}

/// What a role may do with a shipment in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShipmentCapabilities {
    pub can_view: bool,
    pub is_locked: bool,
    pub can_edit: bool,
    pub can_change_status: bool,
    pub can_edit_arrivals: bool,
}

impl ShipmentCapabilities {
    pub fn for_role(role: Role, status: ShipmentStatus) -> Self {
        let locked = status.is_locked();
        let ops_write = !locked && matches!(role, Role::Admin | Role::Ops);
        let admin_write = !locked && role == Role::Admin;

        ShipmentCapabilities {
            can_view: role != Role::Customer,
            is_locked: locked,
            can_edit: ops_write,
            can_change_status: admin_write,
            can_edit_arrivals: ops_write && status == ShipmentStatus::Received,
        }
    }

    fn guard(&self, field: &str) -> Option<bool> {
        let allowed = match field {
            "arrived_qty" | "damaged_qty" | "expired_qty" | "stolen_qty" | "other_qty"
            | "delivered_qty" => self.can_edit_arrivals,
            "needed_qty"
            | "unit_product_weight_g"
            | "unit_package_weight_g"
            | "unit_total_weight_g"
            | "received_weight_g"
            | "purchase_unit_gbp"
            | "total_value_gbp"
            | "product_code"
            | "barcode"
            | "item_name"
            | "image_url"
            | "order_refs" => self.can_edit,
            _ => return None,
        };
        Some(allowed)
    }
}

// =============================================================================
// Field Guards
// =============================================================================

fn blocked_fields<'a>(
    fields: impl IntoIterator<Item = &'a str>,
    guard: impl Fn(&str) -> Option<bool>,
) -> Vec<String> {
    fields
        .into_iter()
        .filter(|field| guard(field) == Some(false))
        .map(str::to_string)
        .collect()
}

/// Rejects an order-item write touching fields the role may not change.
///
/// Fields without a guard are let through.
pub fn assert_order_item_fields_editable<'a>(
    role: Role,
    status: OrderStatus,
    fields: impl IntoIterator<Item = &'a str>,
) -> CoreResult<()> {
    let cap = OrderCapabilities::for_role(role, status);
    let blocked = blocked_fields(fields, |f| cap.guard(f));
    if blocked.is_empty() {
        Ok(())
    } else {
        Err(CoreError::FieldsLocked {
            scope: "Order item",
            fields: blocked,
        })
    }
}

/// Rejects a shipment-item write touching fields the role may not change.
pub fn assert_shipment_item_fields_editable<'a>(
    role: Role,
    status: ShipmentStatus,
    fields: impl IntoIterator<Item = &'a str>,
) -> CoreResult<()> {
    let cap = ShipmentCapabilities::for_role(role, status);
    let blocked = blocked_fields(fields, |f| cap.guard(f));
    if blocked.is_empty() {
        Ok(())
    } else {
        Err(CoreError::FieldsLocked {
            scope: "Shipment item",
            fields: blocked,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
