//! Stock ledger tests
//!
//! Covers the signed-movement balance arithmetic, the return
//! conventions (exchange vs cancel), transfer pairing, and the
//! balance non-negativity property for pre-checked sequences.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    ensure_sufficient, owned_balance, owned_contribution, plan_transfer, usable_balance,
    usable_contribution, validate_quantity, DomainError, MovementKind, ReturnAction,
    StockMovement, Warehouse, WarehouseKind,
};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn movement(
    material_id: Uuid,
    warehouse_id: Uuid,
    kind: MovementKind,
    return_action: Option<ReturnAction>,
    qty: Decimal,
) -> StockMovement {
    StockMovement {
        id: Uuid::new_v4(),
        material_id,
        warehouse_id,
        kind,
        return_action,
        quantity: qty,
        order_id: None,
        transfer_id: None,
        reference: None,
        note: String::new(),
        moved_at: chrono::Utc::now(),
    }
}

fn warehouse(name: &str, kind: WarehouseKind) -> Warehouse {
    Warehouse {
        id: Uuid::new_v4(),
        name: name.to_string(),
        kind,
        created_at: chrono::Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Invalid quantities are rejected before any row would be written
    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        assert!(validate_quantity(dec("0.0001")).is_ok());
        assert!(matches!(
            validate_quantity(Decimal::ZERO),
            Err(DomainError::InvalidQuantity(_))
        ));
        assert!(matches!(
            validate_quantity(dec("-7")),
            Err(DomainError::InvalidQuantity(_))
        ));
    }

    /// Owned balance: in - out - cancelled returns
    #[test]
    fn test_owned_balance_formula() {
        let material = Uuid::new_v4();
        let depot = Uuid::new_v4();
        let movements = vec![
            movement(material, depot, MovementKind::In, None, dec("100")),
            movement(material, depot, MovementKind::Out, None, dec("30")),
            movement(
                material,
                depot,
                MovementKind::Return,
                Some(ReturnAction::Cancel),
                dec("10"),
            ),
        ];
        assert_eq!(owned_balance(&movements, Some(depot)), dec("60"));
    }

    /// A pending exchange leaves owned stock alone but shrinks usable
    /// stock until the replacement arrives
    #[test]
    fn test_exchange_vs_cancel_conventions() {
        let material = Uuid::new_v4();
        let depot = Uuid::new_v4();
        let movements = vec![
            movement(material, depot, MovementKind::In, None, dec("50")),
            movement(
                material,
                depot,
                MovementKind::Return,
                Some(ReturnAction::Exchange),
                dec("8"),
            ),
        ];

        assert_eq!(owned_balance(&movements, Some(depot)), dec("50"));
        assert_eq!(usable_balance(&movements, Some(depot)), dec("42"));
    }

    /// Unscoped balance sums every warehouse: total owned stock
    /// regardless of location
    #[test]
    fn test_unscoped_balance_sums_all_warehouses() {
        let material = Uuid::new_v4();
        let central = Uuid::new_v4();
        let site = Uuid::new_v4();
        let movements = vec![
            movement(material, central, MovementKind::In, None, dec("70")),
            movement(material, site, MovementKind::In, None, dec("20")),
            movement(material, central, MovementKind::Out, None, dec("15")),
        ];

        assert_eq!(owned_balance(&movements, None), dec("75"));
        assert_eq!(owned_balance(&movements, Some(site)), dec("20"));
    }

    /// A transfer plan is always exactly two drafts with equal quantity
    /// and opposite kinds at opposite warehouses
    #[test]
    fn test_transfer_pairing() {
        let source = warehouse("Transit", WarehouseKind::InTransit);
        let dest = warehouse("Site B", WarehouseKind::Site);
        let plan = plan_transfer(Uuid::new_v4(), &source, &dest, dec("12.5"), None, "").unwrap();

        assert_eq!(plan.outbound.kind, MovementKind::Out);
        assert_eq!(plan.inbound.kind, MovementKind::In);
        assert_eq!(plan.outbound.quantity, dec("12.5"));
        assert_eq!(plan.inbound.quantity, dec("12.5"));
        assert_ne!(plan.outbound.warehouse_id, plan.inbound.warehouse_id);
    }

    /// Validation failures produce zero drafts, never one
    #[test]
    fn test_transfer_validation_failure_produces_nothing() {
        let source = warehouse("Transit", WarehouseKind::InTransit);
        let dest = warehouse("Site B", WarehouseKind::Site);

        assert!(plan_transfer(Uuid::new_v4(), &source, &dest, dec("-1"), None, "").is_err());
        assert!(plan_transfer(Uuid::new_v4(), &source, &source, dec("1"), None, "").is_err());
    }

    /// The sufficiency error carries the current balance for operator
    /// feedback
    #[test]
    fn test_insufficient_stock_reports_available() {
        let err = ensure_sufficient(dec("40"), dec("60")).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                available,
                requested,
            } => {
                assert_eq!(available, dec("40"));
                assert_eq!(requested, dec("60"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating positive quantities (0.1 to 1000.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Balance non-negativity: any sequence of inbounds and
        /// pre-checked outbounds keeps every balance >= 0
        #[test]
        fn prop_precheck_keeps_balance_non_negative(
            requests in prop::collection::vec((any::<bool>(), quantity_strategy()), 1..40)
        ) {
            let material = Uuid::new_v4();
            let depot = Uuid::new_v4();
            let mut movements: Vec<StockMovement> = Vec::new();

            for (inbound, qty) in requests {
                if inbound {
                    movements.push(movement(material, depot, MovementKind::In, None, qty));
                } else {
                    // caller discipline: check under the same view as the write
                    let available = usable_balance(&movements, Some(depot));
                    if ensure_sufficient(available, qty).is_ok() {
                        movements.push(movement(material, depot, MovementKind::Out, None, qty));
                    }
                }
                prop_assert!(usable_balance(&movements, Some(depot)) >= Decimal::ZERO);
                prop_assert!(owned_balance(&movements, Some(depot)) >= Decimal::ZERO);
            }
        }

        /// The two balances agree exactly when no exchange returns exist
        #[test]
        fn prop_balances_agree_without_exchanges(
            entries in prop::collection::vec((0usize..3, quantity_strategy()), 1..30)
        ) {
            let material = Uuid::new_v4();
            let depot = Uuid::new_v4();
            let movements: Vec<StockMovement> = entries
                .into_iter()
                .map(|(kind, qty)| match kind {
                    0 => movement(material, depot, MovementKind::In, None, qty),
                    1 => movement(material, depot, MovementKind::Out, None, qty),
                    _ => movement(
                        material,
                        depot,
                        MovementKind::Return,
                        Some(ReturnAction::Cancel),
                        qty,
                    ),
                })
                .collect();

            prop_assert_eq!(
                owned_balance(&movements, Some(depot)),
                usable_balance(&movements, Some(depot))
            );
        }

        /// Usable never exceeds owned: exchanges only ever subtract
        #[test]
        fn prop_usable_never_exceeds_owned(
            entries in prop::collection::vec((0usize..4, quantity_strategy()), 1..30)
        ) {
            let material = Uuid::new_v4();
            let depot = Uuid::new_v4();
            let movements: Vec<StockMovement> = entries
                .into_iter()
                .map(|(kind, qty)| match kind {
                    0 => movement(material, depot, MovementKind::In, None, qty),
                    1 => movement(material, depot, MovementKind::Out, None, qty),
                    2 => movement(
                        material,
                        depot,
                        MovementKind::Return,
                        Some(ReturnAction::Cancel),
                        qty,
                    ),
                    _ => movement(
                        material,
                        depot,
                        MovementKind::Return,
                        Some(ReturnAction::Exchange),
                        qty,
                    ),
                })
                .collect();

            prop_assert!(
                usable_balance(&movements, Some(depot)) <= owned_balance(&movements, Some(depot))
            );
        }

        /// Contributions are anti-symmetric for in/out of the same qty
        #[test]
        fn prop_in_out_cancel_out(qty in quantity_strategy()) {
            let sum = owned_contribution(MovementKind::In, None, qty)
                + owned_contribution(MovementKind::Out, None, qty);
            prop_assert_eq!(sum, Decimal::ZERO);

            let sum = usable_contribution(MovementKind::In, None, qty)
                + usable_contribution(MovementKind::Out, None, qty);
            prop_assert_eq!(sum, Decimal::ZERO);
        }
    }
}
