//! Invoice recorder service
//!
//! Recording an invoice moves the order's financial counter and posts a
//! tagged stock `in` movement in one transaction; deleting it reverses
//! both effects. The movement tag (`INV-{id}`) is the deterministic link
//! used for reversal.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    movement_reference, suggested_gross, validate_quantity, Invoice, InvoiceDefaults,
    MovementDraft, MovementKind,
};

use crate::error::{AppError, AppResult};
use crate::services::stock::{insert_movement, lock_material};

/// Invoice service
#[derive(Clone)]
pub struct InvoiceService {
    db: PgPool,
}

/// Input for recording an invoice against an order
#[derive(Debug, Deserialize)]
pub struct RecordInvoiceInput {
    pub quantity: Decimal,
    /// Tax-inclusive total in base currency
    pub gross_amount: Decimal,
    /// Warehouse receiving the corresponding stock entry, typically the
    /// in-transit warehouse
    pub warehouse_id: Uuid,
    pub invoice_no: String,
    pub issued_at: Option<NaiveDate>,
}

/// Outcome of an invoice deletion
#[derive(Debug, Serialize)]
pub struct DeleteInvoiceOutcome {
    pub invoice_id: Uuid,
    /// False when the tagged stock movement could not be located; the
    /// deletion still proceeds but the mismatch is logged
    pub movement_reversed: bool,
}

/// Row for invoice queries
#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: Uuid,
    order_id: Uuid,
    quantity: Decimal,
    gross_amount: Decimal,
    warehouse_id: Uuid,
    invoice_no: String,
    issued_at: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            id: row.id,
            order_id: row.order_id,
            quantity: row.quantity,
            gross_amount: row.gross_amount,
            warehouse_id: row.warehouse_id,
            invoice_no: row.invoice_no,
            issued_at: row.issued_at,
            created_at: row.created_at,
        }
    }
}

impl InvoiceService {
    /// Create a new InvoiceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Suggested entry figures for invoicing an order: the remaining
    /// uninvoiced quantity, its gross at the quote's locked rate, and the
    /// warehouse of the order's most recent receipt (falling back to the
    /// in-transit warehouse).
    pub async fn invoice_defaults(&self, order_id: Uuid) -> AppResult<InvoiceDefaults> {
        let row = sqlx::query_as::<_, (Decimal, Decimal, Decimal, Decimal, Decimal)>(
            r#"
            SELECT po.ordered_qty, po.invoiced_qty, q.unit_price, q.locked_rate, q.vat_rate
            FROM purchase_orders po
            JOIN quotes q ON q.id = po.quote_id
            WHERE po.id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let (ordered_qty, invoiced_qty, unit_price, locked_rate, vat_rate) = row;
        let quantity = (ordered_qty - invoiced_qty).max(Decimal::ZERO);
        let gross_amount = if quantity > Decimal::ZERO {
            suggested_gross(quantity, unit_price, locked_rate, vat_rate)
        } else {
            Decimal::ZERO
        };

        let last_receipt_warehouse = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT warehouse_id FROM stock_movements
            WHERE order_id = $1 AND kind = 'in'
            ORDER BY moved_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?;

        let warehouse_id = match last_receipt_warehouse {
            Some(id) => Some(id),
            None => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT id FROM warehouses WHERE kind = 'in_transit' ORDER BY created_at LIMIT 1",
                )
                .fetch_optional(&self.db)
                .await?
            }
        };

        Ok(InvoiceDefaults {
            quantity,
            gross_amount,
            warehouse_id,
        })
    }

    /// Record an invoice: insert the row, bump the order's invoiced
    /// counter, post the tagged stock `in` movement: one transaction.
    pub async fn record_invoice(
        &self,
        order_id: Uuid,
        input: RecordInvoiceInput,
    ) -> AppResult<Invoice> {
        validate_quantity(input.quantity)?;

        if input.gross_amount < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "gross_amount".to_string(),
                message: "Invoice amount cannot be negative".to_string(),
                message_tr: "Fatura tutarı negatif olamaz".to_string(),
            });
        }

        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let material_id = sqlx::query_scalar::<_, Option<Uuid>>(
            r#"
            SELECT q.material_id
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

        let material_id = material_id.ok_or_else(|| AppError::Validation {
            field: "order_id".to_string(),
            message: "Labor orders are billed via progress payments, not invoices".to_string(),
            message_tr: "Hizmet kalemleri için fatura değil hakediş girilmelidir".to_string(),
        })?;

        let issued_at = input.issued_at.unwrap_or_else(|| Utc::now().date_naive());

        let invoice = sqlx::query_as::<_, InvoiceRow>(
            r#"
            INSERT INTO invoices (order_id, quantity, gross_amount, warehouse_id, invoice_no, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_id, quantity, gross_amount, warehouse_id, invoice_no, issued_at, created_at
            "#,
        )
        .bind(order_id)
        .bind(input.quantity)
        .bind(input.gross_amount)
        .bind(input.warehouse_id)
        .bind(&input.invoice_no)
        .bind(issued_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE purchase_orders SET invoiced_qty = invoiced_qty + $1 WHERE id = $2")
            .bind(input.quantity)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        lock_material(&mut tx, material_id).await?;

        let reference = movement_reference(invoice.id);
        insert_movement(
            &mut tx,
            &MovementDraft {
                material_id,
                warehouse_id: input.warehouse_id,
                kind: MovementKind::In,
                quantity: input.quantity,
                order_id: Some(order_id),
                note: format!("Invoice entry: {}", input.invoice_no),
            },
            None,
            None,
            Some(&reference),
        )
        .await?;

        tx.commit().await?;

        Ok(invoice.into())
    }

    /// Delete an invoice and reverse its effects: remove the tagged
    /// stock movement and decrement the invoiced counter, floored at
    /// zero. When the tagged movement has gone missing the deletion
    /// still proceeds, with the mismatch logged and surfaced.
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> AppResult<DeleteInvoiceOutcome> {
        let mut tx = self.db.begin().await?;

        let invoice = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, order_id, quantity, gross_amount, warehouse_id, invoice_no, issued_at, created_at
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice".to_string()))?;

        sqlx::query("SELECT id FROM purchase_orders WHERE id = $1 FOR UPDATE")
            .bind(invoice.order_id)
            .fetch_one(&mut *tx)
            .await?;

        let reference = movement_reference(invoice.id);
        let removed = sqlx::query(
            "DELETE FROM stock_movements WHERE order_id = $1 AND reference = $2 AND kind = 'in'",
        )
        .bind(invoice.order_id)
        .bind(&reference)
        .execute(&mut *tx)
        .await?;

        let movement_reversed = removed.rows_affected() > 0;
        if !movement_reversed {
            tracing::warn!(
                invoice_id = %invoice.id,
                reference = %reference,
                "invoice stock movement missing, ledger reversal skipped"
            );
        }

        sqlx::query(
            "UPDATE purchase_orders SET invoiced_qty = GREATEST(invoiced_qty - $1, 0) WHERE id = $2",
        )
        .bind(invoice.quantity)
        .bind(invoice.order_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(DeleteInvoiceOutcome {
            invoice_id,
            movement_reversed,
        })
    }
}
