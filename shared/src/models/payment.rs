//! Supplier payments and debt allocation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a payment was made
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Cheque,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Card => "card",
        }
    }

    pub fn from_code(code: &str) -> Option<PaymentMethod> {
        match code {
            "cash" => Some(PaymentMethod::Cash),
            "cheque" => Some(PaymentMethod::Cheque),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

/// A payment to a supplier. The exchange rate is locked at entry time,
/// like on quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub amount: Decimal,
    pub currency: crate::types::Currency,
    pub locked_rate: Decimal,
    pub method: PaymentMethod,
    pub note: String,
    pub paid_at: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Kind of receivable a payment can settle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpenItemKind {
    ProgressPayment,
    MaterialOrder,
}

/// One open receivable of a supplier, with its remaining debt in base
/// currency.
#[derive(Debug, Clone, Serialize)]
pub struct OpenItem {
    pub kind: OpenItemKind,
    pub item_id: Uuid,
    pub opened_at: NaiveDate,
    pub description: String,
    pub remaining: Decimal,
}

/// A slice of a payment applied to one open item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub kind: OpenItemKind,
    pub item_id: Uuid,
    pub amount: Decimal,
}

/// Distribute a base-currency payment across open items, oldest first.
/// Each item takes `min(remaining payment, remaining debt)`; the loop
/// stops when the payment is exhausted. Items with non-positive debt are
/// skipped.
pub fn allocate_payment(amount: Decimal, open_items: &[OpenItem]) -> Vec<Allocation> {
    let mut available = amount;
    let mut allocations = Vec::new();

    for item in open_items {
        if available <= Decimal::ZERO {
            break;
        }
        if item.remaining <= Decimal::ZERO {
            continue;
        }
        let applied = available.min(item.remaining);
        allocations.push(Allocation {
            kind: item.kind,
            item_id: item.item_id,
            amount: applied,
        });
        available -= applied;
    }

    allocations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(kind: OpenItemKind, remaining: &str, day: u32) -> OpenItem {
        OpenItem {
            kind,
            item_id: Uuid::new_v4(),
            opened_at: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            description: String::new(),
            remaining: dec(remaining),
        }
    }

    #[test]
    fn test_allocation_oldest_first_until_exhausted() {
        let items = vec![
            item(OpenItemKind::ProgressPayment, "300", 1),
            item(OpenItemKind::MaterialOrder, "500", 2),
            item(OpenItemKind::ProgressPayment, "200", 3),
        ];

        let allocations = allocate_payment(dec("600"), &items);
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].amount, dec("300"));
        assert_eq!(allocations[1].amount, dec("300"));
        assert_eq!(allocations[1].item_id, items[1].item_id);
    }

    #[test]
    fn test_allocation_skips_settled_items() {
        let items = vec![
            item(OpenItemKind::ProgressPayment, "0", 1),
            item(OpenItemKind::MaterialOrder, "100", 2),
        ];
        let allocations = allocate_payment(dec("50"), &items);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].item_id, items[1].item_id);
        assert_eq!(allocations[0].amount, dec("50"));
    }

    #[test]
    fn test_allocation_never_overpays() {
        let items = vec![item(OpenItemKind::MaterialOrder, "80", 1)];
        let allocations = allocate_payment(dec("200"), &items);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].amount, dec("80"));

        let total: Decimal = allocations.iter().map(|a| a.amount).sum();
        assert!(total <= dec("200"));
    }
}
