//! Progress payments (hakedis) for labor orders
//!
//! Billing for contracted work items happens in periodic slices: the
//! period percentage is applied to the contract's tax-exclusive total,
//! VAT is added, and withholding/retention/advance deductions are taken
//! off to reach the net payable. The five computed fields are derived at
//! save time and read-only to end users.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::round_money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayment {
    pub id: Uuid,
    pub order_id: Uuid,
    /// Assigned once at creation as 1 + count of earlier progress
    /// payments for the order; never renumbered.
    pub sequence_no: i32,
    pub this_period_percent: Decimal,
    pub vat_percent: Decimal,
    pub withholding_percent: Decimal,
    pub retention_percent: Decimal,
    pub advance_deduction: Decimal,
    pub other_deductions: Decimal,
    pub gross_amount: Decimal,
    pub vat_amount: Decimal,
    pub withholding_amount: Decimal,
    pub retention_amount: Decimal,
    pub net_payable: Decimal,
    pub paid_amount: Decimal,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// The derived money fields of a progress payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPaymentFigures {
    pub gross_amount: Decimal,
    pub vat_amount: Decimal,
    pub withholding_amount: Decimal,
    pub retention_amount: Decimal,
    pub net_payable: Decimal,
}

/// Recompute the derived fields, in order. Each stored amount is rounded
/// half-up at its final assignment; the net folds the rounded components
/// so the printed document adds up.
pub fn compute_figures(
    contract_tax_exclusive_total: Decimal,
    this_period_percent: Decimal,
    vat_percent: Decimal,
    withholding_percent: Decimal,
    retention_percent: Decimal,
    advance_deduction: Decimal,
    other_deductions: Decimal,
) -> ProgressPaymentFigures {
    let gross_amount = round_money(
        contract_tax_exclusive_total * this_period_percent / Decimal::ONE_HUNDRED,
    );
    let vat_amount = round_money(gross_amount * vat_percent / Decimal::ONE_HUNDRED);
    let withholding_amount = round_money(gross_amount * withholding_percent / Decimal::ONE_HUNDRED);
    let retention_amount = round_money(gross_amount * retention_percent / Decimal::ONE_HUNDRED);
    let net_payable = round_money(
        (gross_amount + vat_amount)
            - (withholding_amount + retention_amount + advance_deduction + other_deductions),
    );

    ProgressPaymentFigures {
        gross_amount,
        vat_amount,
        withholding_amount,
        retention_amount,
        net_payable,
    }
}
