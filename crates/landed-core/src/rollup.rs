//! # Order Rollup
//!
//! Re-derives an order's progress and money totals from its allocation rows.
//!
//! ## Rollup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order items (ordered qty)        allocation rows (qty + BDT amounts)   │
//! │            │                                  │                         │
//! │            └──────────────┬───────────────────┘                         │
//! │                           ▼                                             │
//! │              per item: allocated, shipped, remaining, status            │
//! │                           │                                             │
//! │                           ├── shipped > ordered? ──► OverShipment       │
//! │                           ▼                                             │
//! │              order totals (BDT rounded to whole taka)                   │
//! │                           │                                             │
//! │                           ▼                                             │
//! │              auto status (processing / partially_delivered only)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::round0;
use crate::status::OrderStatus;
use crate::QTY_EPSILON;

// =============================================================================
// Inputs
// =============================================================================

/// An order item as far as the rollup cares.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct OrderItemLine {
    pub order_item_id: String,
    pub ordered_quantity: f64,
}

/// An allocation row belonging to the order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct AllocationLine {
    pub order_item_id: String,
    pub allocated_qty: f64,
    pub shipped_qty: f64,
    pub revenue_bdt: f64,
    pub product_cost_bdt: f64,
    pub cargo_cost_bdt: f64,
    pub total_cost_bdt: f64,
    pub profit_bdt: f64,
}

// =============================================================================
// Outputs
// =============================================================================

/// Delivery progress of one order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    Partial,
    Delivered,
}

/// Tracking fields written back to one order item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemProgress {
    pub order_item_id: String,
    pub allocated_qty_total: f64,
    pub shipped_qty_total: f64,
    pub remaining_qty: f64,
    pub item_status: ItemStatus,
}

/// Totals written back to the order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub total_order_qty: f64,
    pub total_allocated_qty: f64,
    pub total_shipped_qty: f64,
    pub total_remaining_qty: f64,
    pub total_revenue_bdt: f64,
    pub total_product_cost_bdt: f64,
    pub total_cargo_cost_bdt: f64,
    pub total_total_cost_bdt: f64,
    pub total_profit_bdt: f64,
}

/// Everything a recompute writes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRollup {
    pub items: Vec<ItemProgress>,
    pub totals: OrderTotals,
    /// Set only when the order status should change.
    pub next_status: Option<OrderStatus>,
}

#[derive(Debug, Default)]
struct ItemAggregate {
    allocated: f64,
    shipped: f64,
    revenue_bdt: f64,
    product_cost_bdt: f64,
    cargo_cost_bdt: f64,
    total_cost_bdt: f64,
    profit_bdt: f64,
}

// =============================================================================
// Rollup
// =============================================================================

/// Classifies one item by shipped vs ordered quantity.
///
/// Anything short of the ordered quantity is partial; the tolerance only
/// applies to the over-shipment check.
pub fn item_status(shipped: f64, ordered: f64) -> ItemStatus {
    if shipped <= 0.0 {
        ItemStatus::NotStarted
    } else if shipped < ordered {
        ItemStatus::Partial
    } else {
        ItemStatus::Delivered
    }
}

/// Status an order should move to after a recompute, if any.
///
/// Only orders already being fulfilled move automatically.
pub fn auto_status(current: OrderStatus, totals: &OrderTotals) -> Option<OrderStatus> {
    if !matches!(
        current,
        OrderStatus::Processing | OrderStatus::PartiallyDelivered
    ) {
        return None;
    }

    let next = if totals.total_remaining_qty == 0.0 {
        OrderStatus::Delivered
    } else if totals.total_shipped_qty > 0.0 {
        OrderStatus::PartiallyDelivered
    } else {
        OrderStatus::Processing
    };

    (next != current).then_some(next)
}

/// Recomputes item progress, order totals and the auto status.
///
/// Allocations naming items outside `items` are ignored. An order without
/// items keeps its status. Fails with [`CoreError::OverShipment`] if any
/// item shipped more than it ordered.
pub fn rollup_order(
    current: OrderStatus,
    items: &[OrderItemLine],
    allocations: &[AllocationLine],
) -> CoreResult<OrderRollup> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let id = item.order_item_id.trim();
        if !id.is_empty() {
            index.insert(id, i);
        }
    }

    let mut aggs: Vec<ItemAggregate> = items.iter().map(|_| ItemAggregate::default()).collect();
    for alloc in allocations {
        let Some(&i) = index.get(alloc.order_item_id.trim()) else {
            warn!(order_item_id = %alloc.order_item_id, "Allocation for unknown order item ignored");
            continue;
        };
        let agg = &mut aggs[i];
        agg.allocated += alloc.allocated_qty;
        agg.shipped += alloc.shipped_qty;
        agg.revenue_bdt += alloc.revenue_bdt;
        agg.product_cost_bdt += alloc.product_cost_bdt;
        agg.cargo_cost_bdt += alloc.cargo_cost_bdt;
        agg.total_cost_bdt += alloc.total_cost_bdt;
        agg.profit_bdt += alloc.profit_bdt;
    }

    let mut totals = OrderTotals::default();
    let mut progress = Vec::with_capacity(items.len());

    for (item, agg) in items.iter().zip(&aggs) {
        let id = item.order_item_id.trim();
        if id.is_empty() {
            continue;
        }
        let ordered = item.ordered_quantity;

        if agg.shipped > ordered + QTY_EPSILON {
            return Err(CoreError::OverShipment {
                order_item_id: id.to_string(),
                shipped: agg.shipped,
                ordered,
            });
        }

        let remaining = ordered - agg.shipped;
        progress.push(ItemProgress {
            order_item_id: id.to_string(),
            allocated_qty_total: agg.allocated,
            shipped_qty_total: agg.shipped,
            remaining_qty: remaining,
            item_status: item_status(agg.shipped, ordered),
        });

        totals.total_order_qty += ordered;
        totals.total_allocated_qty += agg.allocated;
        totals.total_shipped_qty += agg.shipped;
        totals.total_remaining_qty += remaining;
        totals.total_revenue_bdt += agg.revenue_bdt;
        totals.total_product_cost_bdt += agg.product_cost_bdt;
        totals.total_cargo_cost_bdt += agg.cargo_cost_bdt;
        totals.total_total_cost_bdt += agg.total_cost_bdt;
        totals.total_profit_bdt += agg.profit_bdt;
    }

    totals.total_revenue_bdt = round0(totals.total_revenue_bdt);
    totals.total_product_cost_bdt = round0(totals.total_product_cost_bdt);
    totals.total_cargo_cost_bdt = round0(totals.total_cargo_cost_bdt);
    totals.total_total_cost_bdt = round0(totals.total_total_cost_bdt);
    totals.total_profit_bdt = round0(totals.total_profit_bdt);

    let next_status = if progress.is_empty() {
        None
    } else {
        auto_status(current, &totals)
    };
    debug!(
        items = progress.len(),
        shipped = totals.total_shipped_qty,
        remaining = totals.total_remaining_qty,
        ?next_status,
        "Order rolled up"
    );

    Ok(OrderRollup {
        items: progress,
        totals,
        next_status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, qty: f64) -> OrderItemLine {
        OrderItemLine {
            order_item_id: id.to_string(),
            ordered_quantity: qty,
        }
    }

    fn alloc(id: &str, allocated: f64, shipped: f64, revenue: f64, cost: f64) -> AllocationLine {
        AllocationLine {
            order_item_id: id.to_string(),
            allocated_qty: allocated,
            shipped_qty: shipped,
            revenue_bdt: revenue,
            product_cost_bdt: cost * 0.75,
            cargo_cost_bdt: cost * 0.25,
            total_cost_bdt: cost,
            profit_bdt: revenue - cost,
        }
    }

    #[test]
    fn test_item_status() {
        assert_eq!(item_status(0.0, 5.0), ItemStatus::NotStarted);
        assert_eq!(item_status(2.0, 5.0), ItemStatus::Partial);
        assert_eq!(item_status(5.0, 5.0), ItemStatus::Delivered);
        assert_eq!(item_status(5.0 - 1e-12, 5.0), ItemStatus::Partial);
        assert_eq!(item_status(5.0 + 1e-12, 5.0), ItemStatus::Delivered);
    }

    #[test]
    fn test_partial_delivery_rollup() {
        let items = [item("A", 5.0), item("B", 2.0)];
        let allocations = [
            alloc("A", 3.0, 3.0, 3000.0, 2400.0),
            alloc("A", 2.0, 0.0, 0.0, 0.0),
            alloc("B", 2.0, 2.0, 1001.4, 800.0),
        ];

        let r = rollup_order(OrderStatus::Processing, &items, &allocations).unwrap();

        assert_eq!(r.items.len(), 2);
        assert_eq!(r.items[0].allocated_qty_total, 5.0);
        assert_eq!(r.items[0].shipped_qty_total, 3.0);
        assert_eq!(r.items[0].remaining_qty, 2.0);
        assert_eq!(r.items[0].item_status, ItemStatus::Partial);
        assert_eq!(r.items[1].item_status, ItemStatus::Delivered);

        assert_eq!(r.totals.total_order_qty, 7.0);
        assert_eq!(r.totals.total_shipped_qty, 5.0);
        assert_eq!(r.totals.total_remaining_qty, 2.0);
        assert_eq!(r.totals.total_revenue_bdt, 4001.0);
        assert_eq!(r.totals.total_total_cost_bdt, 3200.0);
        assert_eq!(r.totals.total_profit_bdt, 801.0);

        assert_eq!(r.next_status, Some(OrderStatus::PartiallyDelivered));
    }

    #[test]
    fn test_fully_delivered_moves_to_delivered() {
        let items = [item("A", 2.0)];
        let allocations = [alloc("A", 2.0, 2.0, 500.0, 400.0)];

        let r = rollup_order(OrderStatus::PartiallyDelivered, &items, &allocations).unwrap();
        assert_eq!(r.next_status, Some(OrderStatus::Delivered));
    }

    #[test]
    fn test_status_unchanged_is_not_reported() {
        let items = [item("A", 2.0)];
        let r = rollup_order(OrderStatus::Processing, &items, &[]).unwrap();
        assert_eq!(r.next_status, None);
        assert_eq!(r.items[0].item_status, ItemStatus::NotStarted);
    }

    #[test]
    fn test_only_fulfilment_statuses_move() {
        let items = [item("A", 2.0)];
        let allocations = [alloc("A", 2.0, 2.0, 500.0, 400.0)];

        let r = rollup_order(OrderStatus::Finalized, &items, &allocations).unwrap();
        assert_eq!(r.next_status, None);
    }

    #[test]
    fn test_over_shipment_rejected() {
        let items = [item("A", 2.0)];
        let allocations = [alloc("A", 2.0, 2.0, 0.0, 0.0), alloc("A", 1.0, 1.0, 0.0, 0.0)];

        let err = rollup_order(OrderStatus::Processing, &items, &allocations).unwrap_err();
        assert_eq!(
            err,
            CoreError::OverShipment {
                order_item_id: "A".to_string(),
                shipped: 3.0,
                ordered: 2.0,
            }
        );
    }

    #[test]
    fn test_dangling_allocations_ignored() {
        let items = [item("A", 2.0)];
        let allocations = [alloc("Z", 9.0, 9.0, 9000.0, 1.0)];

        let r = rollup_order(OrderStatus::Processing, &items, &allocations).unwrap();
        assert_eq!(r.totals.total_shipped_qty, 0.0);
        assert_eq!(r.totals.total_revenue_bdt, 0.0);
    }

    #[test]
    fn test_empty_order_has_zero_totals() {
        let r = rollup_order(OrderStatus::Processing, &[], &[]).unwrap();
        assert!(r.items.is_empty());
        assert_eq!(r.totals, OrderTotals::default());
        assert_eq!(r.next_status, None);
    }

    #[test]
    fn test_items_without_ids_keep_status() {
        let items = [item("  ", 3.0)];
        let allocations = [alloc("", 3.0, 3.0, 100.0, 50.0)];

        let r = rollup_order(OrderStatus::PartiallyDelivered, &items, &allocations).unwrap();
        assert!(r.items.is_empty());
        assert_eq!(r.totals, OrderTotals::default());
        assert_eq!(r.next_status, None);
    }
}
