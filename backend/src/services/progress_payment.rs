//! Progress payment (hakedis) service
//!
//! Period billing for labor orders. The five derived money fields are
//! recomputed from the locked contract total on every save; the sequence
//! number is assigned once, inside the same transaction that holds the
//! order row lock, and never renumbered.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{compute_figures, validate_percent, ProgressPayment};

use crate::error::{AppError, AppResult};

/// Progress payment service
#[derive(Clone)]
pub struct ProgressPaymentService {
    db: PgPool,
}

/// Input for creating a progress payment. Only the percentages and the
/// fixed deduction amounts are user input; every money field is derived.
#[derive(Debug, Deserialize)]
pub struct CreateProgressPaymentInput {
    pub this_period_percent: Decimal,
    pub vat_percent: Decimal,
    pub withholding_percent: Decimal,
    pub retention_percent: Decimal,
    pub advance_deduction: Decimal,
    pub other_deductions: Decimal,
}

/// Row for progress payment queries
#[derive(Debug, FromRow)]
struct ProgressPaymentRow {
    id: Uuid,
    order_id: Uuid,
    sequence_no: i32,
    this_period_percent: Decimal,
    vat_percent: Decimal,
    withholding_percent: Decimal,
    retention_percent: Decimal,
    advance_deduction: Decimal,
    other_deductions: Decimal,
    gross_amount: Decimal,
    vat_amount: Decimal,
    withholding_amount: Decimal,
    retention_amount: Decimal,
    net_payable: Decimal,
    paid_amount: Decimal,
    approved: bool,
    created_at: DateTime<Utc>,
}

impl From<ProgressPaymentRow> for ProgressPayment {
    fn from(row: ProgressPaymentRow) -> Self {
        ProgressPayment {
            id: row.id,
            order_id: row.order_id,
            sequence_no: row.sequence_no,
            this_period_percent: row.this_period_percent,
            vat_percent: row.vat_percent,
            withholding_percent: row.withholding_percent,
            retention_percent: row.retention_percent,
            advance_deduction: row.advance_deduction,
            other_deductions: row.other_deductions,
            gross_amount: row.gross_amount,
            vat_amount: row.vat_amount,
            withholding_amount: row.withholding_amount,
            retention_amount: row.retention_amount,
            net_payable: row.net_payable,
            paid_amount: row.paid_amount,
            approved: row.approved,
            created_at: row.created_at,
        }
    }
}

const PROGRESS_PAYMENT_COLUMNS: &str =
    "id, order_id, sequence_no, this_period_percent, vat_percent, withholding_percent, \
     retention_percent, advance_deduction, other_deductions, gross_amount, vat_amount, \
     withholding_amount, retention_amount, net_payable, paid_amount, approved, created_at";

impl ProgressPaymentService {
    /// Create a new ProgressPaymentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a progress payment for a labor order
    pub async fn create_progress_payment(
        &self,
        order_id: Uuid,
        input: CreateProgressPaymentInput,
    ) -> AppResult<ProgressPayment> {
        validate_percent(input.this_period_percent)?;
        validate_percent(input.vat_percent)?;
        validate_percent(input.withholding_percent)?;
        validate_percent(input.retention_percent)?;

        if input.advance_deduction < Decimal::ZERO || input.other_deductions < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "deductions".to_string(),
                message: "Deductions cannot be negative".to_string(),
                message_tr: "Kesintiler negatif olamaz".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        // The order row lock also serializes sequence numbering
        let row = sqlx::query_as::<_, (Option<Uuid>, Decimal, Decimal, Decimal)>(
            r#"
            SELECT q.material_id, q.quantity, q.unit_price, q.locked_rate
            FROM purchase_orders po
            JOIN quotes q ON q.id = po.quote_id
            WHERE po.id = $1
            FOR UPDATE OF po
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let (material_id, quantity, unit_price, locked_rate) = row;

        if material_id.is_some() {
            return Err(AppError::Validation {
                field: "order_id".to_string(),
                message: "Material orders are billed via invoices, not progress payments"
                    .to_string(),
                message_tr: "Malzeme siparişleri için hakediş değil fatura girilmelidir"
                    .to_string(),
            });
        }

        // Contract total excluding VAT, at the rate locked on the quote
        let contract_total = quantity * unit_price * locked_rate;

        let figures = compute_figures(
            contract_total,
            input.this_period_percent,
            input.vat_percent,
            input.withholding_percent,
            input.retention_percent,
            input.advance_deduction,
            input.other_deductions,
        );

        let sequence_no = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM progress_payments WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?
            + 1;

        let row = sqlx::query_as::<_, ProgressPaymentRow>(&format!(
            r#"
            INSERT INTO progress_payments (
                order_id, sequence_no, this_period_percent, vat_percent,
                withholding_percent, retention_percent, advance_deduction, other_deductions,
                gross_amount, vat_amount, withholding_amount, retention_amount, net_payable
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {PROGRESS_PAYMENT_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(sequence_no as i32)
        .bind(input.this_period_percent)
        .bind(input.vat_percent)
        .bind(input.withholding_percent)
        .bind(input.retention_percent)
        .bind(input.advance_deduction)
        .bind(input.other_deductions)
        .bind(figures.gross_amount)
        .bind(figures.vat_amount)
        .bind(figures.withholding_amount)
        .bind(figures.retention_amount)
        .bind(figures.net_payable)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            sequence_no = row.sequence_no,
            net_payable = %row.net_payable,
            "progress payment recorded"
        );

        Ok(row.into())
    }

    /// List progress payments for an order, in sequence order
    pub async fn list_for_order(&self, order_id: Uuid) -> AppResult<Vec<ProgressPayment>> {
        let rows = sqlx::query_as::<_, ProgressPaymentRow>(&format!(
            r#"
            SELECT {PROGRESS_PAYMENT_COLUMNS}
            FROM progress_payments
            WHERE order_id = $1
            ORDER BY sequence_no
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ProgressPayment::from).collect())
    }

    /// Net payable of one progress payment
    pub async fn net_payable(&self, progress_payment_id: Uuid) -> AppResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT net_payable FROM progress_payments WHERE id = $1",
        )
        .bind(progress_payment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Progress payment".to_string()))
    }
}
