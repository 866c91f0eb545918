//! Supplier payment service
//!
//! A payment locks its exchange rate at entry and is then distributed
//! oldest-first across the supplier's open items (approved progress
//! payments and delivered material orders) inside one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::{
    add_vat, allocate_payment, to_base_currency, Allocation, Currency, OpenItem, OpenItemKind,
    Payment, PaymentMethod,
};

use crate::error::{AppError, AppResult};
use crate::external::RateClient;

/// Payment service
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
    rates: RateClient,
}

/// Input for recording a payment
#[derive(Debug, Deserialize)]
pub struct CreatePaymentInput {
    pub supplier_id: Uuid,
    pub amount: Decimal,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub note: Option<String>,
    pub paid_at: Option<NaiveDate>,
    /// When false the payment is recorded against the account without
    /// touching any open item
    pub allocate: Option<bool>,
}

/// A recorded payment with the allocations it settled
#[derive(Debug, Serialize)]
pub struct PaymentResult {
    pub payment: Payment,
    pub allocations: Vec<Allocation>,
}

/// Row for payment queries
#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    supplier_id: Uuid,
    amount: Decimal,
    currency: String,
    locked_rate: Decimal,
    method: String,
    note: String,
    paid_at: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let currency = Currency::from_code(&row.currency)
            .ok_or_else(|| AppError::Internal(format!("unknown currency: {}", row.currency)))?;
        let method = PaymentMethod::from_code(&row.method)
            .ok_or_else(|| AppError::Internal(format!("unknown payment method: {}", row.method)))?;

        Ok(Payment {
            id: row.id,
            supplier_id: row.supplier_id,
            amount: row.amount,
            currency,
            locked_rate: row.locked_rate,
            method,
            note: row.note,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}

impl PaymentService {
    /// Create a new PaymentService instance
    pub fn new(db: PgPool, rates: RateClient) -> Self {
        Self { db, rates }
    }

    /// Open receivables of a supplier, oldest first
    pub async fn open_items(&self, supplier_id: Uuid) -> AppResult<Vec<OpenItem>> {
        self.ensure_supplier_exists(supplier_id).await?;

        let mut tx = self.db.begin().await?;
        let items = open_items_in_tx(&mut tx, supplier_id).await?;
        tx.commit().await?;

        Ok(items)
    }

    /// Record a payment and distribute it across the supplier's open
    /// items. The exchange rate is fetched once, before the transaction,
    /// and frozen onto the payment row.
    pub async fn create_payment(&self, input: CreatePaymentInput) -> AppResult<PaymentResult> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Payment amount must be positive".to_string(),
                message_tr: "Ödeme tutarı pozitif olmalıdır".to_string(),
            });
        }

        self.ensure_supplier_exists(input.supplier_id).await?;

        let locked_rate = self.rates.rate_for(input.currency).await;
        let paid_at = input.paid_at.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (supplier_id, amount, currency, locked_rate, method, note, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, supplier_id, amount, currency, locked_rate, method, note, paid_at, created_at
            "#,
        )
        .bind(input.supplier_id)
        .bind(input.amount)
        .bind(input.currency.as_str())
        .bind(locked_rate)
        .bind(input.method.as_str())
        .bind(input.note.unwrap_or_default())
        .bind(paid_at)
        .fetch_one(&mut *tx)
        .await?;

        let allocations = if input.allocate.unwrap_or(true) {
            let open = open_items_in_tx(&mut tx, input.supplier_id).await?;
            let base_amount = to_base_currency(input.amount, locked_rate);
            let allocations = allocate_payment(base_amount, &open);

            for allocation in &allocations {
                match allocation.kind {
                    OpenItemKind::ProgressPayment => {
                        sqlx::query(
                            "UPDATE progress_payments SET paid_amount = paid_amount + $1 WHERE id = $2",
                        )
                        .bind(allocation.amount)
                        .bind(allocation.item_id)
                        .execute(&mut *tx)
                        .await?;
                    }
                    OpenItemKind::MaterialOrder => {
                        sqlx::query(
                            "UPDATE purchase_orders SET paid_amount = paid_amount + $1 WHERE id = $2",
                        )
                        .bind(allocation.amount)
                        .bind(allocation.item_id)
                        .execute(&mut *tx)
                        .await?;
                    }
                }
            }

            allocations
        } else {
            Vec::new()
        };

        tx.commit().await?;

        tracing::info!(
            supplier_id = %input.supplier_id,
            amount = %input.amount,
            rate = %locked_rate,
            settled_items = allocations.len(),
            "payment recorded"
        );

        Ok(PaymentResult {
            payment: row.try_into()?,
            allocations,
        })
    }

    async fn ensure_supplier_exists(&self, supplier_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(supplier_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }
}

/// Open items computed inside the caller's transaction so allocation
/// updates see the same debts it was planned against.
///
/// Progress payment debt: net payable minus already paid. Material
/// debt: delivered quantity priced at the quote's locked rate plus VAT,
/// minus already paid.
async fn open_items_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
) -> Result<Vec<OpenItem>, AppError> {
    let progress_rows = sqlx::query_as::<_, (Uuid, i32, Decimal, Decimal, DateTime<Utc>)>(
        r#"
        SELECT pp.id, pp.sequence_no, pp.net_payable, pp.paid_amount, pp.created_at
        FROM progress_payments pp
        JOIN purchase_orders po ON po.id = pp.order_id
        JOIN quotes q ON q.id = po.quote_id
        WHERE q.supplier_id = $1 AND pp.approved
        ORDER BY pp.created_at
        FOR UPDATE OF pp
        "#,
    )
    .bind(supplier_id)
    .fetch_all(&mut **tx)
    .await?;

    let material_rows =
        sqlx::query_as::<_, (Uuid, String, Decimal, Decimal, Decimal, Decimal, Decimal, DateTime<Utc>)>(
            r#"
            SELECT po.id, m.name, po.delivered_qty, q.unit_price, q.locked_rate, q.vat_rate,
                   po.paid_amount, po.created_at
            FROM purchase_orders po
            JOIN quotes q ON q.id = po.quote_id
            JOIN materials m ON m.id = q.material_id
            WHERE q.supplier_id = $1 AND po.delivered_qty > 0
            ORDER BY po.created_at
            FOR UPDATE OF po
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&mut **tx)
        .await?;

    let mut items = Vec::new();

    for (id, sequence_no, net_payable, paid_amount, created_at) in progress_rows {
        let remaining = net_payable - paid_amount;
        if remaining > Decimal::ZERO {
            items.push(OpenItem {
                kind: OpenItemKind::ProgressPayment,
                item_id: id,
                opened_at: created_at.date_naive(),
                description: format!("Progress payment #{sequence_no}"),
                remaining,
            });
        }
    }

    for (id, material_name, delivered_qty, unit_price, locked_rate, vat_rate, paid_amount, created_at) in
        material_rows
    {
        let debt = add_vat(delivered_qty * unit_price * locked_rate, vat_rate) - paid_amount;
        if debt > Decimal::ZERO {
            items.push(OpenItem {
                kind: OpenItemKind::MaterialOrder,
                item_id: id,
                opened_at: created_at.date_naive(),
                description: material_name,
                remaining: debt,
            });
        }
    }

    items.sort_by_key(|item| item.opened_at);

    Ok(items)
}
