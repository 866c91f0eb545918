//! Purchase order lifecycle service
//!
//! Delivery status is derived from the counters on every read, never
//! stored. Goods receipt posts the ledger row and bumps the delivered
//! counter in one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{
    derive_delivery_status, validate_quantity, DeliveryStatus, MovementDraft, MovementKind,
};

use crate::error::{AppError, AppResult};
use crate::services::stock::{insert_movement, lock_material};

/// Purchase order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// A purchase order with its derived state, joined to the quote
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub supplier_id: Uuid,
    pub work_item_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub ordered_qty: Decimal,
    pub delivered_qty: Decimal,
    pub invoiced_qty: Decimal,
    pub delivery_status: DeliveryStatus,
    /// `in` minus `out` movements at in-transit warehouses attributed to
    /// this order; stays >= 0 in a correctly functioning ledger
    pub in_transit_pending: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Input for a direct goods receipt against an order
#[derive(Debug, Deserialize)]
pub struct ReceiveGoodsInput {
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    /// Supplier delivery note number, stamped on the ledger row
    pub delivery_note: Option<String>,
    pub note: Option<String>,
}

/// Row for order view queries
#[derive(Debug, FromRow)]
struct OrderViewRow {
    id: Uuid,
    quote_id: Uuid,
    supplier_id: Uuid,
    work_item_id: Option<Uuid>,
    material_id: Option<Uuid>,
    ordered_qty: Decimal,
    delivered_qty: Decimal,
    invoiced_qty: Decimal,
    in_transit_pending: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderViewRow> for OrderView {
    fn from(row: OrderViewRow) -> Self {
        OrderView {
            id: row.id,
            quote_id: row.quote_id,
            supplier_id: row.supplier_id,
            work_item_id: row.work_item_id,
            material_id: row.material_id,
            ordered_qty: row.ordered_qty,
            delivered_qty: row.delivered_qty,
            invoiced_qty: row.invoiced_qty,
            delivery_status: derive_delivery_status(row.ordered_qty, row.delivered_qty),
            in_transit_pending: row.in_transit_pending,
            created_at: row.created_at,
        }
    }
}

const ORDER_VIEW_SQL: &str = r#"
    SELECT po.id, po.quote_id, q.supplier_id, q.work_item_id, q.material_id,
           po.ordered_qty, po.delivered_qty, po.invoiced_qty,
           COALESCE((
               SELECT SUM(
                   CASE
                       WHEN sm.kind = 'in' THEN sm.quantity
                       WHEN sm.kind = 'out' THEN -sm.quantity
                       ELSE 0
                   END
               )
               FROM stock_movements sm
               JOIN warehouses w ON w.id = sm.warehouse_id
               WHERE sm.order_id = po.id AND w.kind = 'in_transit'
           ), 0) AS in_transit_pending,
           po.created_at
    FROM purchase_orders po
    JOIN quotes q ON q.id = po.quote_id
"#;

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all orders, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<OrderView>> {
        let rows = sqlx::query_as::<_, OrderViewRow>(&format!(
            "{ORDER_VIEW_SQL} ORDER BY po.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(OrderView::from).collect())
    }

    /// Get one order with its derived state
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderView> {
        let row = sqlx::query_as::<_, OrderViewRow>(&format!(
            "{ORDER_VIEW_SQL} WHERE po.id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        Ok(row.into())
    }

    /// Delivery status of an order, always recomputed from the counters
    pub async fn order_status(&self, order_id: Uuid) -> AppResult<DeliveryStatus> {
        let row = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT ordered_qty, delivered_qty FROM purchase_orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        Ok(derive_delivery_status(row.0, row.1))
    }

    /// Receive goods for an order directly into a warehouse.
    ///
    /// The received quantity may not exceed the order's remaining
    /// quantity; labor orders have nothing to receive. Ledger row and
    /// delivered counter move together or not at all.
    pub async fn receive_goods(
        &self,
        order_id: Uuid,
        input: ReceiveGoodsInput,
    ) -> AppResult<OrderView> {
        validate_quantity(input.quantity)?;

        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, (Decimal, Decimal, Option<Uuid>)>(
            r#"
            SELECT po.ordered_qty, po.delivered_qty, q.material_id
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

        let (ordered_qty, delivered_qty, material_id) = order;

        let material_id = material_id.ok_or_else(|| AppError::Validation {
            field: "order_id".to_string(),
            message: "Labor orders are billed via progress payments, not goods receipts"
                .to_string(),
            message_tr: "Hizmet kalemleri için mal kabulü yapılamaz".to_string(),
        })?;

        let remaining = (ordered_qty - delivered_qty).max(Decimal::ZERO);
        if input.quantity > remaining {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: format!("Maximum receivable quantity is {remaining}"),
                message_tr: format!("En fazla {remaining} birim kabul edilebilir"),
            });
        }

        lock_material(&mut tx, material_id).await?;

        insert_movement(
            &mut tx,
            &MovementDraft {
                material_id,
                warehouse_id: input.warehouse_id,
                kind: MovementKind::In,
                quantity: input.quantity,
                order_id: Some(order_id),
                note: format!(
                    "Goods receipt: {}",
                    input.note.unwrap_or_default()
                ),
            },
            None,
            None,
            input.delivery_note.as_deref(),
        )
        .await?;

        sqlx::query("UPDATE purchase_orders SET delivered_qty = delivered_qty + $1 WHERE id = $2")
            .bind(input.quantity)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_order(order_id).await
    }
}
