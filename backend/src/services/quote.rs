//! Quote management service
//!
//! Quotes are normalized to tax-exclusive prices at save time. Approval
//! locks the exchange rate fetched once from the provider, demotes any
//! sibling quote for the same subject back to pending, and creates the
//! one-to-one purchase order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    normalize_unit_price, validate_percent, validate_quantity, validate_quote_scope, Currency,
    PurchaseOrder, Quote, QuoteStatus,
};

use crate::error::{AppError, AppResult};
use crate::external::RateClient;

/// Quote service
#[derive(Clone)]
pub struct QuoteService {
    db: PgPool,
    rates: RateClient,
}

/// Input for creating a quote
#[derive(Debug, Deserialize)]
pub struct CreateQuoteInput {
    pub supplier_id: Uuid,
    pub work_item_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub currency: Currency,
    /// Whether the entered unit price already includes VAT; stripped and
    /// cleared on save
    pub vat_included: bool,
    pub vat_rate: Decimal,
}

/// Result of approving a quote
#[derive(Debug, Serialize)]
pub struct ApproveQuoteResult {
    pub quote: Quote,
    pub order: PurchaseOrder,
}

/// Row for quote queries
#[derive(Debug, FromRow)]
pub(crate) struct QuoteRow {
    pub(crate) id: Uuid,
    pub(crate) supplier_id: Uuid,
    pub(crate) work_item_id: Option<Uuid>,
    pub(crate) material_id: Option<Uuid>,
    pub(crate) quantity: Decimal,
    pub(crate) unit_price: Decimal,
    pub(crate) currency: String,
    pub(crate) locked_rate: Decimal,
    pub(crate) vat_included: bool,
    pub(crate) vat_rate: Decimal,
    pub(crate) status: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = AppError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        let currency = Currency::from_code(&row.currency)
            .ok_or_else(|| AppError::Internal(format!("unknown currency: {}", row.currency)))?;
        let status = QuoteStatus::from_code(&row.status)
            .ok_or_else(|| AppError::Internal(format!("unknown quote status: {}", row.status)))?;

        Ok(Quote {
            id: row.id,
            supplier_id: row.supplier_id,
            work_item_id: row.work_item_id,
            material_id: row.material_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            currency,
            locked_rate: row.locked_rate,
            vat_included: row.vat_included,
            vat_rate: row.vat_rate,
            status,
            created_at: row.created_at,
        })
    }
}

/// Row for purchase order queries
#[derive(Debug, FromRow)]
pub(crate) struct OrderRow {
    pub(crate) id: Uuid,
    pub(crate) quote_id: Uuid,
    pub(crate) ordered_qty: Decimal,
    pub(crate) delivered_qty: Decimal,
    pub(crate) invoiced_qty: Decimal,
    pub(crate) paid_amount: Decimal,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<OrderRow> for PurchaseOrder {
    fn from(row: OrderRow) -> Self {
        PurchaseOrder {
            id: row.id,
            quote_id: row.quote_id,
            ordered_qty: row.ordered_qty,
            delivered_qty: row.delivered_qty,
            invoiced_qty: row.invoiced_qty,
            paid_amount: row.paid_amount,
            created_at: row.created_at,
        }
    }
}

const QUOTE_COLUMNS: &str = "id, supplier_id, work_item_id, material_id, quantity, unit_price, \
                             currency, locked_rate, vat_included, vat_rate, status, created_at";

impl QuoteService {
    /// Create a new QuoteService instance
    pub fn new(db: PgPool, rates: RateClient) -> Self {
        Self { db, rates }
    }

    /// Create a quote. The unit price is stored tax-exclusive: a
    /// VAT-inclusive entry is stripped exactly once and the flag cleared,
    /// so re-saving can never strip twice.
    pub async fn create_quote(&self, input: CreateQuoteInput) -> AppResult<Quote> {
        validate_quote_scope(input.work_item_id.is_some(), input.material_id.is_some())?;
        validate_quantity(input.quantity)?;
        validate_percent(input.vat_rate)?;

        if input.unit_price <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "unit_price".to_string(),
                message: "Unit price must be positive".to_string(),
                message_tr: "Birim fiyat pozitif olmalıdır".to_string(),
            });
        }

        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;
        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let (unit_price, vat_included) =
            normalize_unit_price(input.unit_price, input.vat_rate, input.vat_included);

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            INSERT INTO quotes (supplier_id, work_item_id, material_id, quantity,
                                unit_price, currency, vat_included, vat_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {QUOTE_COLUMNS}
            "#
        ))
        .bind(input.supplier_id)
        .bind(input.work_item_id)
        .bind(input.material_id)
        .bind(input.quantity)
        .bind(unit_price)
        .bind(input.currency.as_str())
        .bind(vat_included)
        .bind(input.vat_rate)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// List quotes, optionally filtered by status
    pub async fn list_quotes(&self, status: Option<QuoteStatus>) -> AppResult<Vec<Quote>> {
        let rows = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            SELECT {QUOTE_COLUMNS}
            FROM quotes
            WHERE $1::text IS NULL OR status = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Quote::try_from).collect()
    }

    /// Get a quote by ID
    pub async fn get_quote(&self, quote_id: Uuid) -> AppResult<Quote> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1"
        ))
        .bind(quote_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote".to_string()))?;

        row.try_into()
    }

    /// Approve a quote: lock the exchange rate, demote sibling quotes for
    /// the same subject to pending, create the purchase order. The rate
    /// is fetched once before the transaction opens and frozen into the
    /// record.
    pub async fn approve_quote(&self, quote_id: Uuid) -> AppResult<ApproveQuoteResult> {
        let current = self.get_quote(quote_id).await?;

        if current.status == QuoteStatus::Approved {
            return Err(AppError::Conflict {
                resource: "quote".to_string(),
                message: "Quote is already approved".to_string(),
                message_tr: "Teklif zaten onaylanmış".to_string(),
            });
        }

        let locked_rate = self.rates.rate_for(current.currency).await;

        let mut tx = self.db.begin().await?;

        sqlx::query("SELECT id FROM quotes WHERE id = $1 FOR UPDATE")
            .bind(quote_id)
            .fetch_one(&mut *tx)
            .await?;

        // At most one approved quote per subject: siblings go back to
        // pending (original behavior of the approval screen)
        if let Some(work_item_id) = current.work_item_id {
            sqlx::query(
                "UPDATE quotes SET status = 'pending' WHERE work_item_id = $1 AND id <> $2 AND status = 'approved'",
            )
            .bind(work_item_id)
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;
        }
        if let Some(material_id) = current.material_id {
            sqlx::query(
                "UPDATE quotes SET status = 'pending' WHERE material_id = $1 AND id <> $2 AND status = 'approved'",
            )
            .bind(material_id)
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;
        }

        let quote_row = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            UPDATE quotes SET status = 'approved', locked_rate = $1
            WHERE id = $2
            RETURNING {QUOTE_COLUMNS}
            "#
        ))
        .bind(locked_rate)
        .bind(quote_id)
        .fetch_one(&mut *tx)
        .await?;

        let order_row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO purchase_orders (quote_id, ordered_qty)
            VALUES ($1, $2)
            ON CONFLICT (quote_id) DO UPDATE SET quote_id = EXCLUDED.quote_id
            RETURNING id, quote_id, ordered_qty, delivered_qty, invoiced_qty, paid_amount, created_at
            "#,
        )
        .bind(quote_id)
        .bind(quote_row.quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            quote_id = %quote_id,
            order_id = %order_row.id,
            rate = %locked_rate,
            "quote approved, purchase order ready"
        );

        Ok(ApproveQuoteResult {
            quote: quote_row.try_into()?,
            order: order_row.into(),
        })
    }

    /// Reject a quote. An approved quote with a live purchase order
    /// cannot be rejected.
    pub async fn reject_quote(&self, quote_id: Uuid) -> AppResult<Quote> {
        let current = self.get_quote(quote_id).await?;
        if current.status == QuoteStatus::Approved {
            return Err(AppError::Conflict {
                resource: "quote".to_string(),
                message: "Approved quotes cannot be rejected".to_string(),
                message_tr: "Onaylanmış teklif reddedilemez".to_string(),
            });
        }

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            r#"
            UPDATE quotes SET status = 'rejected'
            WHERE id = $1
            RETURNING {QUOTE_COLUMNS}
            "#
        ))
        .bind(quote_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }
}
