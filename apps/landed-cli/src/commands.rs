//! # CLI Commands
//!
//! Each command takes one JSON document and returns one JSON document.
//!
//! ```text
//! ┌─────────────┬──────────────────────────────────────┬───────────────────┐
//! │ command     │ input                                │ output            │
//! ├─────────────┼──────────────────────────────────────┼───────────────────┤
//! │ price       │ pricing record, or array of them     │ outcome(s)        │
//! │ allocate    │ { shipment, pricing_mode, allocation}│ allocation amounts│
//! │ rollup      │ { status, items, allocations }       │ order rollup      │
//! │ transition  │ { kind, from, to }                   │ { allowed }       │
//! │ claims      │ { email, profile? }                  │ update or null    │
//! └─────────────┴──────────────────────────────────────┴───────────────────┘
//! ```

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use landed_core::allocation::{
    compute_allocation_amounts, AllocationInput, PricingModeConfig, ShipmentRates,
};
use landed_core::claims::{plan_claims_sync, UserProfile};
use landed_core::rollup::{rollup_order, AllocationLine, OrderItemLine};
use landed_core::status::{can_transition_order_status, can_transition_shipment_status, OrderStatus};
use landed_core::{calculate, PricingInput};

use crate::config::ShipmentDefaults;
use crate::error::{CliError, CliResult};

// =============================================================================
// Command
// =============================================================================

/// A CLI subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Price,
    Allocate,
    Rollup,
    Transition,
    Claims,
}

impl Command {
    pub const NAMES: [&'static str; 5] = ["price", "allocate", "rollup", "transition", "claims"];
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Price => "price",
            Command::Allocate => "allocate",
            Command::Rollup => "rollup",
            Command::Transition => "transition",
            Command::Claims => "claims",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Command {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "price" => Ok(Command::Price),
            "allocate" => Ok(Command::Allocate),
            "rollup" => Ok(Command::Rollup),
            "transition" => Ok(Command::Transition),
            "claims" => Ok(Command::Claims),
            other => Err(CliError::Usage(format!(
                "Unknown command: '{}'. Valid options: {}",
                other,
                Command::NAMES.join(", ")
            ))),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
struct AllocateRequest {
    #[serde(default)]
    shipment: ShipmentRates,
    #[serde(default)]
    pricing_mode: PricingModeConfig,
    allocation: AllocationInput,
}

#[derive(Debug, Deserialize)]
struct RollupRequest {
    status: String,
    #[serde(default)]
    items: Vec<OrderItemLine>,
    #[serde(default)]
    allocations: Vec<AllocationLine>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TransitionKind {
    Order,
    Shipment,
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    kind: TransitionKind,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

#[derive(Debug, Deserialize)]
struct ClaimsRequest {
    #[serde(default)]
    email: String,
    /// Absent or `null` means the profile was deleted.
    #[serde(default)]
    profile: Option<UserProfile>,
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command against a parsed JSON document.
pub fn run(command: Command, doc: Value, defaults: &ShipmentDefaults) -> CliResult<Value> {
    debug!(%command, "Running command");

    match command {
        Command::Price => price(doc, defaults),
        Command::Allocate => allocate(doc),
        Command::Rollup => rollup(doc),
        Command::Transition => transition(doc),
        Command::Claims => claims(doc),
    }
}

/// Prices one record or an array of records.
fn price(doc: Value, defaults: &ShipmentDefaults) -> CliResult<Value> {
    match doc {
        Value::Array(records) => {
            let total = records.len();
            let outcomes = records
                .into_iter()
                .map(|record| price_one(record, defaults))
                .collect::<CliResult<Vec<_>>>()?;
            let accepted = outcomes.iter().filter(|o| o["ok"] == Value::Bool(true)).count();
            info!(total, accepted, "Priced records");
            Ok(Value::Array(outcomes))
        }
        record => price_one(record, defaults),
    }
}

fn price_one(record: Value, defaults: &ShipmentDefaults) -> CliResult<Value> {
    let mut input = match record {
        Value::Null => PricingInput::default(),
        Value::Object(_) => serde_json::from_value(record)?,
        other => {
            return Err(CliError::InvalidRequest(format!(
                "pricing record must be an object, got {other}"
            )))
        }
    };
    apply_shipment_defaults(&mut input, defaults);
    Ok(serde_json::to_value(calculate(&input))?)
}

/// Fills shipment-level fields the record leaves out.
pub fn apply_shipment_defaults(input: &mut PricingInput, defaults: &ShipmentDefaults) {
    if input.cargo_cost_per_kg_gbp.is_none() {
        input.cargo_cost_per_kg_gbp = defaults.cargo_cost_per_kg_gbp.map(Value::from);
    }
    if input.gbp_rate_avg_bdt.is_none() {
        input.gbp_rate_avg_bdt = defaults.gbp_rate_avg_bdt.map(Value::from);
    }
}

fn allocate(doc: Value) -> CliResult<Value> {
    let req: AllocateRequest = serde_json::from_value(doc)?;
    let amounts = compute_allocation_amounts(&req.allocation, &req.shipment, &req.pricing_mode);
    Ok(serde_json::to_value(amounts)?)
}

fn rollup(doc: Value) -> CliResult<Value> {
    let req: RollupRequest = serde_json::from_value(doc)?;
    let status: OrderStatus = req.status.parse()?;
    let rollup = rollup_order(status, &req.items, &req.allocations)?;
    Ok(serde_json::to_value(rollup)?)
}

fn transition(doc: Value) -> CliResult<Value> {
    let req: TransitionRequest = serde_json::from_value(doc)?;
    let allowed = match req.kind {
        TransitionKind::Order => can_transition_order_status(&req.from, &req.to),
        TransitionKind::Shipment => can_transition_shipment_status(&req.from, &req.to),
    };
    Ok(json!({ "allowed": allowed }))
}

fn claims(doc: Value) -> CliResult<Value> {
    let req: ClaimsRequest = serde_json::from_value(doc)?;
    let update = plan_claims_sync(&req.email, req.profile.as_ref());
    Ok(serde_json::to_value(update)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_core::CoreError;

    fn no_defaults() -> ShipmentDefaults {
        ShipmentDefaults::default()
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!("price".parse::<Command>().unwrap(), Command::Price);
        assert_eq!("ROLLUP".parse::<Command>().unwrap(), Command::Rollup);
        assert!(matches!("ship".parse::<Command>(), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_price_single_record() {
        let doc = json!({
            "offer_price_mode": "purchase",
            "purchase_price_gbp": 10,
            "needed_quantity": 5,
            "profit_rate": 20,
            "unit_total_weight_g": 500,
            "cargo_cost_per_kg_gbp": 2,
            "gbp_rate_avg_bdt": 150
        });
        let out = run(Command::Price, doc, &no_defaults()).unwrap();
        assert_eq!(out["ok"], json!(true));
        assert_eq!(out["output"]["offered_total_bdt"], json!(9750.0));
        assert_eq!(out["output"]["profit_pct_effective"], json!(18.18));
    }

    #[test]
    fn test_price_array_with_invalid_record() {
        let doc = json!([{}, null]);
        let out = run(Command::Price, doc, &no_defaults()).unwrap();
        let outcomes = out.as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["ok"], json!(false));
        assert_eq!(outcomes[0]["output"], Value::Null);
        assert_eq!(outcomes[0]["reasons"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_price_rejects_scalar_record() {
        let err = run(Command::Price, json!(42), &no_defaults()).unwrap_err();
        assert!(matches!(err, CliError::InvalidRequest(_)));
    }

    #[test]
    fn test_shipment_defaults_fill_absent_fields_only() {
        let defaults = ShipmentDefaults {
            cargo_cost_per_kg_gbp: Some(2.0),
            gbp_rate_avg_bdt: Some(150.0),
        };
        let doc = json!({
            "purchase_price_gbp": 10,
            "needed_quantity": 5,
            "profit_rate": 20,
            "unit_total_weight_g": 500,
            "gbp_rate_avg_bdt": 0
        });
        let out = run(Command::Price, doc, &defaults).unwrap();
        assert_eq!(out["ok"], json!(false));
        assert_eq!(out["reasons"], json!(["gbp_rate_avg_bdt must be > 0"]));

        let mut input = PricingInput::default();
        apply_shipment_defaults(&mut input, &defaults);
        assert_eq!(input.cargo_cost_per_kg_gbp, Some(json!(2.0)));
        assert_eq!(input.gbp_rate_avg_bdt, Some(json!(150.0)));
    }

    #[test]
    fn test_allocate() {
        let doc = json!({
            "shipment": { "gbp_avg_rate": 150, "cargo_cost_per_kg": 2 },
            "pricing_mode": { "currency": "GBP" },
            "allocation": {
                "allocated_qty": 2,
                "shipped_qty": 2,
                "unit_product_weight": 0.4,
                "unit_package_weight": 0.1,
                "buy_price_gbp": 10,
                "profit_rate": 0.2
            }
        });
        let out = run(Command::Allocate, doc, &no_defaults()).unwrap();
        assert_eq!(out["product_cost_gbp"], json!(20.0));
        assert_eq!(out["product_cost_bdt"], json!(3000.0));
        assert_eq!(out["cargo_cost_gbp"], json!(2.0));
        assert_eq!(out["revenue_bdt"], json!(3600.0));
        assert_eq!(out["profit_bdt"], json!(300.0));
    }

    #[test]
    fn test_allocate_reads_hand_typed_pricing_mode() {
        let doc = json!({
            "shipment": { "gbp_avg_rate": 150, "gbp_rate_product": 160, "cargo_cost_per_kg": 2 },
            "pricing_mode": { "currency": " GBP", "rate_source_revenue": "Product " },
            "allocation": {
                "shipped_qty": 2,
                "buy_price_gbp": 10,
                "profit_rate": 0.2
            }
        });
        let out = run(Command::Allocate, doc, &no_defaults()).unwrap();
        // 12.00 × 2 = 24.00 GBP at the product rate
        assert_eq!(out["revenue_bdt"], json!(3840.0));
    }

    #[test]
    fn test_rollup() {
        let doc = json!({
            "status": "processing",
            "items": [{ "order_item_id": "A", "ordered_quantity": 2 }],
            "allocations": [{ "order_item_id": "A", "allocated_qty": 2, "shipped_qty": 1 }]
        });
        let out = run(Command::Rollup, doc, &no_defaults()).unwrap();
        assert_eq!(out["items"][0]["item_status"], json!("partial"));
        assert_eq!(out["next_status"], json!("partially_delivered"));
    }

    #[test]
    fn test_rollup_over_shipment_is_error() {
        let doc = json!({
            "status": "processing",
            "items": [{ "order_item_id": "A", "ordered_quantity": 1 }],
            "allocations": [{ "order_item_id": "A", "shipped_qty": 2 }]
        });
        let err = run(Command::Rollup, doc, &no_defaults()).unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::OverShipment { .. })));
    }

    #[test]
    fn test_rollup_unknown_status_is_error() {
        let doc = json!({ "status": "lost" });
        let err = run(Command::Rollup, doc, &no_defaults()).unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::UnknownStatus { .. })));
    }

    #[test]
    fn test_transition() {
        let out = run(
            Command::Transition,
            json!({ "kind": "order", "from": "draft", "to": "submitted" }),
            &no_defaults(),
        )
        .unwrap();
        assert_eq!(out, json!({ "allowed": true }));

        let out = run(
            Command::Transition,
            json!({ "kind": "shipment", "from": "closed", "to": "draft" }),
            &no_defaults(),
        )
        .unwrap();
        assert_eq!(out, json!({ "allowed": false }));
    }

    #[test]
    fn test_claims() {
        let out = run(
            Command::Claims,
            json!({ "email": " Owner@Shop.COM", "profile": { "role": "admin" } }),
            &no_defaults(),
        )
        .unwrap();
        assert_eq!(out["email"], json!("owner@shop.com"));
        assert_eq!(out["claims"]["role"], json!("admin"));
        assert_eq!(out["revoke_sessions"], json!(false));

        let out = run(Command::Claims, json!({ "email": "" }), &no_defaults()).unwrap();
        assert_eq!(out, Value::Null);
    }
}
