//! Progress payment calculator tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{compute_figures, normalize_unit_price, round_money};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Reference case: gross 1000, VAT 20%, withholding 3%, retention
    /// 5%, advance 50 -> net (1000+200)-(30+50+50+0) = 1070
    #[test]
    fn test_reference_net_payable() {
        let figures = compute_figures(
            dec("1000"),
            dec("100"),
            dec("20"),
            dec("3"),
            dec("5"),
            dec("50"),
            dec("0"),
        );

        assert_eq!(figures.gross_amount, dec("1000.00"));
        assert_eq!(figures.vat_amount, dec("200.00"));
        assert_eq!(figures.withholding_amount, dec("30.00"));
        assert_eq!(figures.retention_amount, dec("50.00"));
        assert_eq!(figures.net_payable, dec("1070.00"));
    }

    /// Period slices of the contract total
    #[test]
    fn test_period_percentage_slices_contract() {
        let figures = compute_figures(
            dec("250000"),
            dec("12.5"),
            dec("20"),
            dec("0"),
            dec("0"),
            dec("0"),
            dec("0"),
        );
        assert_eq!(figures.gross_amount, dec("31250.00"));
        assert_eq!(figures.vat_amount, dec("6250.00"));
    }

    /// Other deductions participate in the net like the advance
    #[test]
    fn test_other_deductions() {
        let figures = compute_figures(
            dec("1000"),
            dec("100"),
            dec("0"),
            dec("0"),
            dec("0"),
            dec("0"),
            dec("150.75"),
        );
        assert_eq!(figures.net_payable, dec("849.25"));
    }

    /// Sequence numbers are 1 + count of existing payments for the order
    #[test]
    fn test_sequence_numbering() {
        let existing_counts = [0i64, 1, 2, 7];
        let expected = [1i64, 2, 3, 8];
        for (count, want) in existing_counts.iter().zip(expected.iter()) {
            assert_eq!(count + 1, *want);
        }
    }

    /// Contract totals come from the tax-exclusive normalized price
    #[test]
    fn test_contract_total_uses_normalized_price() {
        // quote entered VAT-inclusive at 120, 20% VAT
        let (unit_price, vat_included) = normalize_unit_price(dec("120"), dec("20"), true);
        assert!(!vat_included);

        // 50 units at the locked rate 32.0
        let contract_total = dec("50") * unit_price * dec("32");
        assert_eq!(round_money(contract_total), dec("160000.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn percent_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The net always equals gross + VAT minus the four deductions,
        /// over the rounded components
        #[test]
        fn prop_net_is_consistent_with_components(
            contract in amount_strategy(),
            period in percent_strategy(),
            vat in percent_strategy(),
            withholding in percent_strategy(),
            retention in percent_strategy(),
            advance in amount_strategy(),
            other in amount_strategy()
        ) {
            let f = compute_figures(contract, period, vat, withholding, retention, advance, other);

            let expected = round_money(
                (f.gross_amount + f.vat_amount)
                    - (f.withholding_amount + f.retention_amount + advance + other),
            );
            prop_assert_eq!(f.net_payable, expected);
        }

        /// All derived amounts are stored at two decimal places
        #[test]
        fn prop_all_amounts_rounded_to_money_scale(
            contract in amount_strategy(),
            period in percent_strategy(),
            vat in percent_strategy()
        ) {
            let f = compute_figures(contract, period, vat, dec("3"), dec("5"), dec("0"), dec("0"));

            for amount in [
                f.gross_amount,
                f.vat_amount,
                f.withholding_amount,
                f.retention_amount,
                f.net_payable,
            ] {
                prop_assert_eq!(round_money(amount), amount);
            }
        }

        /// Recomputation is deterministic: same inputs, same figures
        #[test]
        fn prop_recompute_is_stable(
            contract in amount_strategy(),
            period in percent_strategy(),
            vat in percent_strategy()
        ) {
            let a = compute_figures(contract, period, vat, dec("3"), dec("5"), dec("10"), dec("0"));
            let b = compute_figures(contract, period, vat, dec("3"), dec("5"), dec("10"), dec("0"));
            prop_assert_eq!(a, b);
        }

        /// VAT normalization is idempotent across repeated saves
        #[test]
        fn prop_vat_normalization_idempotent(
            price in (1i64..=100_000_000i64).prop_map(|n| Decimal::new(n, 2)),
            vat in (0i64..=5000i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let (once, flag) = normalize_unit_price(price, vat, true);
            let (twice, _) = normalize_unit_price(once, vat, flag);
            prop_assert_eq!(once, twice);
        }
    }
}
