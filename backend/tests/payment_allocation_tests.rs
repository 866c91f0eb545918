//! Supplier payment allocation and statement tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use chrono::NaiveDate;
use shared::{
    add_vat, allocate_payment, to_base_currency, with_running_balance, OpenItem, OpenItemKind,
    StatementLine,
};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(kind: OpenItemKind, remaining: &str, day: u32) -> OpenItem {
    OpenItem {
        kind,
        item_id: Uuid::new_v4(),
        opened_at: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        description: String::new(),
        remaining: dec(remaining),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A foreign-currency payment settles debts at its locked rate
    #[test]
    fn test_foreign_payment_settles_at_locked_rate() {
        let items = vec![item(OpenItemKind::ProgressPayment, "50000", 1)];

        // 1000 USD at a locked rate of 32.5
        let base_amount = to_base_currency(dec("1000"), dec("32.5"));
        let allocations = allocate_payment(base_amount, &items);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].amount, dec("32500"));
    }

    /// Material debt: delivered qty at the locked quote price plus VAT
    #[test]
    fn test_material_debt_formula() {
        // 40 delivered x 12.50 x rate 30 = 15000, +20% VAT = 18000
        let debt = add_vat(dec("40") * dec("12.50") * dec("30"), dec("20"));
        assert_eq!(debt, dec("18000.00"));
    }

    /// A payment larger than all debts leaves the surplus unallocated
    #[test]
    fn test_surplus_stays_on_account() {
        let items = vec![
            item(OpenItemKind::ProgressPayment, "300", 1),
            item(OpenItemKind::MaterialOrder, "200", 2),
        ];
        let allocations = allocate_payment(dec("1000"), &items);

        let total: Decimal = allocations.iter().map(|a| a.amount).sum();
        assert_eq!(total, dec("500"));
    }

    /// Statement lines come back sorted with a running balance
    #[test]
    fn test_statement_running_balance() {
        let lines = vec![
            StatementLine {
                entry_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                description: "Payment (cash)".to_string(),
                debit: Decimal::ZERO,
                credit: dec("18000"),
                balance: Decimal::ZERO,
            },
            StatementLine {
                entry_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                description: "Rebar".to_string(),
                debit: dec("30000"),
                credit: Decimal::ZERO,
                balance: Decimal::ZERO,
            },
        ];

        let statement = with_running_balance(lines);
        assert_eq!(statement[0].description, "Rebar");
        assert_eq!(statement[0].balance, dec("30000"));
        assert_eq!(statement[1].balance, dec("12000"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_00i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn items_strategy() -> impl Strategy<Value = Vec<OpenItem>> {
        prop::collection::vec((any::<bool>(), amount_strategy()), 0..10).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (progress, remaining))| OpenItem {
                    kind: if progress {
                        OpenItemKind::ProgressPayment
                    } else {
                        OpenItemKind::MaterialOrder
                    },
                    item_id: Uuid::new_v4(),
                    opened_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .checked_add_days(chrono::Days::new(i as u64))
                        .unwrap(),
                    description: String::new(),
                    remaining,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Allocations never exceed the payment
        #[test]
        fn prop_allocations_never_exceed_payment(
            amount in amount_strategy(),
            items in items_strategy()
        ) {
            let allocations = allocate_payment(amount, &items);
            let total: Decimal = allocations.iter().map(|a| a.amount).sum();
            prop_assert!(total <= amount);
        }

        /// No single item is paid past its remaining debt
        #[test]
        fn prop_no_item_overpaid(
            amount in amount_strategy(),
            items in items_strategy()
        ) {
            let allocations = allocate_payment(amount, &items);
            for allocation in &allocations {
                let item = items.iter().find(|i| i.item_id == allocation.item_id).unwrap();
                prop_assert!(allocation.amount <= item.remaining);
                prop_assert!(allocation.amount > Decimal::ZERO);
            }
        }

        /// Allocation is greedy oldest-first: an item receives money
        /// only if every older item is fully settled
        #[test]
        fn prop_allocation_is_oldest_first(
            amount in amount_strategy(),
            items in items_strategy()
        ) {
            let allocations = allocate_payment(amount, &items);

            for (idx, item) in items.iter().enumerate() {
                let got: Option<&shared::Allocation> =
                    allocations.iter().find(|a| a.item_id == item.item_id);
                if got.is_some() {
                    // every older open item must be settled in full
                    for older in items.iter().take(idx) {
                        if older.remaining > Decimal::ZERO {
                            let older_paid = allocations
                                .iter()
                                .find(|a| a.item_id == older.item_id)
                                .map(|a| a.amount)
                                .unwrap_or(Decimal::ZERO);
                            prop_assert_eq!(older_paid, older.remaining);
                        }
                    }
                }
            }
        }
    }
}
