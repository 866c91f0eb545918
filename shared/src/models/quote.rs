//! Supplier quotes and work items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{add_vat, extract_vat};
use crate::types::{Currency, Unit};
use crate::validation::{validate_quote_scope, DomainError};

/// A contracted work item (labor scope), quoted and billed by progress
/// payments rather than invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Approximate contract quantity
    pub target_qty: Decimal,
    pub unit: Unit,
    pub created_at: DateTime<Utc>,
}

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<QuoteStatus> {
        match code {
            "pending" => Some(QuoteStatus::Pending),
            "approved" => Some(QuoteStatus::Approved),
            "rejected" => Some(QuoteStatus::Rejected),
            _ => None,
        }
    }
}

/// A supplier quote for exactly one of {work item, material}.
///
/// The stored unit price is always tax-exclusive; a VAT-inclusive entry
/// is normalized once at save time. `locked_rate` is frozen from the
/// rate provider at approval and never refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub work_item_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub currency: Currency,
    pub locked_rate: Decimal,
    pub vat_included: bool,
    pub vat_rate: Decimal,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
}

/// Save-time normalization of a VAT-inclusive unit price.
///
/// Returns the tax-exclusive price and the cleared flag. Idempotent by
/// construction: once the flag is false the price passes through
/// untouched, so saving twice never strips VAT twice.
pub fn normalize_unit_price(
    unit_price: Decimal,
    vat_rate: Decimal,
    vat_included: bool,
) -> (Decimal, bool) {
    if vat_included {
        (extract_vat(unit_price, vat_rate), false)
    } else {
        (unit_price, false)
    }
}

impl Quote {
    pub fn validate_scope(&self) -> Result<(), DomainError> {
        validate_quote_scope(self.work_item_id.is_some(), self.material_id.is_some())
    }

    /// Apply the save-time VAT normalization in place
    pub fn normalize_vat(&mut self) {
        let (price, included) =
            normalize_unit_price(self.unit_price, self.vat_rate, self.vat_included);
        self.unit_price = price;
        self.vat_included = included;
    }

    /// Contract total excluding VAT, in base currency at the locked rate
    pub fn tax_exclusive_total(&self) -> Decimal {
        self.quantity * self.unit_price * self.locked_rate
    }

    /// Contract total including VAT, in base currency at the locked rate
    pub fn tax_inclusive_total(&self) -> Decimal {
        add_vat(self.tax_exclusive_total(), self.vat_rate)
    }
}
