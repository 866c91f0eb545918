//! Supplier invoices against purchase orders
//!
//! An invoice is a financial record: it moves the order's invoiced
//! counter and posts one tagged `in` movement at the named warehouse
//! (typically in-transit). It never touches the delivered counter.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{add_vat, round_money};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: Uuid,
    pub quantity: Decimal,
    /// Tax-inclusive total in base currency
    pub gross_amount: Decimal,
    /// Warehouse that received the corresponding stock `in` movement
    pub warehouse_id: Uuid,
    pub invoice_no: String,
    pub issued_at: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Reference tag stamped on the stock movement an invoice posts, so the
/// movement can be located again when the invoice is deleted.
pub fn movement_reference(invoice_id: Uuid) -> String {
    format!("INV-{invoice_id}")
}

/// Suggested entry figures for invoicing an order
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDefaults {
    pub quantity: Decimal,
    pub gross_amount: Decimal,
    pub warehouse_id: Option<Uuid>,
}

/// Suggested gross for a quantity: qty x unit price x locked rate, VAT
/// added, rounded half-up at the final assignment.
pub fn suggested_gross(
    quantity: Decimal,
    unit_price: Decimal,
    locked_rate: Decimal,
    vat_rate: Decimal,
) -> Decimal {
    round_money(add_vat(quantity * unit_price * locked_rate, vat_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_movement_reference_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(movement_reference(id), format!("INV-{id}"));
        assert_eq!(movement_reference(id), movement_reference(id));
    }

    #[test]
    fn test_suggested_gross() {
        // 7 x 14.20 x 32.4571 at 20% VAT
        // 7 x 14.20 x 32.4571 = 3226.23574, +20% VAT = 3871.482888
        let gross = suggested_gross(dec("7"), dec("14.20"), dec("32.4571"), dec("20"));
        assert_eq!(gross, dec("3871.48"));
    }

    #[test]
    fn test_suggested_gross_base_currency() {
        let gross = suggested_gross(dec("10"), dec("100"), Decimal::ONE, dec("18"));
        assert_eq!(gross, dec("1180.00"));
    }
}
