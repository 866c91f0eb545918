//! Stock ledger models and balance arithmetic
//!
//! The ledger is append-only: a movement is immutable once posted, and
//! balances are always folded from the movement history rather than kept
//! as cached counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Warehouse;
use crate::validation::{validate_quantity, DomainError};

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    In,
    Out,
    Return,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
            MovementKind::Return => "return",
        }
    }

    pub fn from_code(code: &str) -> Option<MovementKind> {
        match code {
            "in" => Some(MovementKind::In),
            "out" => Some(MovementKind::Out),
            "return" => Some(MovementKind::Return),
            _ => None,
        }
    }
}

/// Sub-action of a `return` movement.
///
/// `Cancel` strikes the goods from stock: the receipt is reversed and the
/// owned balance drops. `Exchange` means the goods are physically absent
/// but a replacement is expected: owned stock is unchanged while the
/// usable balance excludes the quantity until the exchange resolves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReturnAction {
    Exchange,
    Cancel,
}

impl ReturnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnAction::Exchange => "exchange",
            ReturnAction::Cancel => "cancel",
        }
    }

    pub fn from_code(code: &str) -> Option<ReturnAction> {
        match code {
            "exchange" => Some(ReturnAction::Exchange),
            "cancel" => Some(ReturnAction::Cancel),
            _ => None,
        }
    }
}

/// One immutable ledger entry. Quantity is always a positive magnitude;
/// the signed contribution comes from the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub material_id: Uuid,
    pub warehouse_id: Uuid,
    pub kind: MovementKind,
    pub return_action: Option<ReturnAction>,
    pub quantity: Decimal,
    /// Purchase order this movement satisfies, if any
    pub order_id: Option<Uuid>,
    /// Transfer pair this movement belongs to, if any
    pub transfer_id: Option<Uuid>,
    /// Deterministic tag (delivery note no, `INV-{id}`) used to locate
    /// the movement for reversal
    pub reference: Option<String>,
    pub note: String,
    pub moved_at: DateTime<Utc>,
}

/// Contribution of a movement to the owned balance: goods the company
/// owns regardless of location. Pending exchanges still count as owned.
pub fn owned_contribution(
    kind: MovementKind,
    return_action: Option<ReturnAction>,
    quantity: Decimal,
) -> Decimal {
    match kind {
        MovementKind::In => quantity,
        MovementKind::Out => -quantity,
        MovementKind::Return => match return_action {
            Some(ReturnAction::Cancel) => -quantity,
            _ => Decimal::ZERO,
        },
    }
}

/// Contribution to the usable balance: goods actually available at a
/// warehouse. Both return sub-actions subtract here: exchanged goods
/// are physically absent until the replacement arrives. Outbound
/// sufficiency checks consult this balance.
pub fn usable_contribution(
    kind: MovementKind,
    return_action: Option<ReturnAction>,
    quantity: Decimal,
) -> Decimal {
    match (kind, return_action) {
        (MovementKind::In, _) => quantity,
        (MovementKind::Out, _) | (MovementKind::Return, _) => -quantity,
    }
}

/// Fold the owned balance over a movement slice, optionally scoped to one
/// warehouse. The unscoped call sums across all warehouses.
pub fn owned_balance(movements: &[StockMovement], warehouse_id: Option<Uuid>) -> Decimal {
    movements
        .iter()
        .filter(|m| warehouse_id.map_or(true, |w| m.warehouse_id == w))
        .map(|m| owned_contribution(m.kind, m.return_action, m.quantity))
        .sum()
}

/// Fold the usable balance over a movement slice
pub fn usable_balance(movements: &[StockMovement], warehouse_id: Option<Uuid>) -> Decimal {
    movements
        .iter()
        .filter(|m| warehouse_id.map_or(true, |w| m.warehouse_id == w))
        .map(|m| usable_contribution(m.kind, m.return_action, m.quantity))
        .sum()
}

/// A paired warehouse-to-warehouse move: exactly one `out` at the source
/// and one `in` at the destination, created atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub material_id: Uuid,
    pub source_warehouse_id: Uuid,
    pub dest_warehouse_id: Uuid,
    pub quantity: Decimal,
    pub order_id: Option<Uuid>,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Draft of a ledger row a transfer will post
#[derive(Debug, Clone, PartialEq)]
pub struct MovementDraft {
    pub material_id: Uuid,
    pub warehouse_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub order_id: Option<Uuid>,
    pub note: String,
}

/// The two ledger rows a transfer produces
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub outbound: MovementDraft,
    pub inbound: MovementDraft,
}

/// Plan the movement pair for a transfer. Validation happens before any
/// row exists, so a failed transfer writes zero rows, never one.
pub fn plan_transfer(
    material_id: Uuid,
    source: &Warehouse,
    dest: &Warehouse,
    quantity: Decimal,
    order_id: Option<Uuid>,
    note: &str,
) -> Result<TransferPlan, DomainError> {
    validate_quantity(quantity)?;
    if source.id == dest.id {
        return Err(DomainError::SameWarehouse);
    }

    Ok(TransferPlan {
        outbound: MovementDraft {
            material_id,
            warehouse_id: source.id,
            kind: MovementKind::Out,
            quantity,
            order_id,
            note: format!("TRANSFER OUT -> {} | {}", dest.name, note),
        },
        inbound: MovementDraft {
            material_id,
            warehouse_id: dest.id,
            kind: MovementKind::In,
            quantity,
            order_id,
            note: format!("TRANSFER IN <- {} | {}", source.name, note),
        },
    })
}
