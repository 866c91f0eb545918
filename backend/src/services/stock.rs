//! Stock ledger service
//!
//! Append-only movement log per (material, warehouse). Balances are
//! always computed by summing the history: there is no cached counter
//! to drift. Outbound sufficiency checks and the FIFO match-then-attach
//! sequence run inside one transaction holding a per-material advisory
//! lock, so concurrent transfers of the same material serialize.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::{
    classify_stock_level, ensure_sufficient, plan_transfer, select_fifo_candidate,
    validate_quantity, FifoCandidate, MovementDraft, MovementKind, ReturnAction, StockMovement,
    StockStatus, Transfer, Warehouse, WarehouseKind,
};

use crate::error::{AppError, AppResult};

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Input for posting a single ledger movement
#[derive(Debug, Deserialize)]
pub struct PostMovementInput {
    pub material_id: Uuid,
    pub warehouse_id: Uuid,
    pub kind: MovementKind,
    pub return_action: Option<ReturnAction>,
    pub quantity: Decimal,
    pub order_id: Option<Uuid>,
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// Input for a warehouse-to-warehouse transfer
#[derive(Debug, Deserialize)]
pub struct CreateTransferInput {
    pub material_id: Uuid,
    pub source_warehouse_id: Uuid,
    pub dest_warehouse_id: Uuid,
    pub quantity: Decimal,
    /// Explicit purchase order; when absent and the source is the
    /// in-transit warehouse, the FIFO matcher resolves it
    pub order_id: Option<Uuid>,
    pub note: Option<String>,
}

/// Per-material stock level with critical-threshold classification
#[derive(Debug, Clone, Serialize)]
pub struct StockLevel {
    pub material_id: Uuid,
    pub material_name: String,
    pub unit: String,
    pub owned_balance: Decimal,
    pub usable_balance: Decimal,
    pub status: StockStatus,
}

/// Row for movement queries
#[derive(Debug, FromRow)]
pub(crate) struct MovementRow {
    id: Uuid,
    material_id: Uuid,
    warehouse_id: Uuid,
    kind: String,
    return_action: Option<String>,
    quantity: Decimal,
    order_id: Option<Uuid>,
    transfer_id: Option<Uuid>,
    reference: Option<String>,
    note: String,
    moved_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = MovementKind::from_code(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("unknown movement kind: {}", row.kind)))?;
        let return_action = match row.return_action.as_deref() {
            Some(code) => Some(ReturnAction::from_code(code).ok_or_else(|| {
                AppError::Internal(format!("unknown return action: {code}"))
            })?),
            None => None,
        };

        Ok(StockMovement {
            id: row.id,
            material_id: row.material_id,
            warehouse_id: row.warehouse_id,
            kind,
            return_action,
            quantity: row.quantity,
            order_id: row.order_id,
            transfer_id: row.transfer_id,
            reference: row.reference,
            note: row.note,
            moved_at: row.moved_at,
        })
    }
}

/// Row for warehouse queries
#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    kind: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<WarehouseRow> for Warehouse {
    type Error = AppError;

    fn try_from(row: WarehouseRow) -> Result<Self, Self::Error> {
        let kind = WarehouseKind::from_code(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("unknown warehouse kind: {}", row.kind)))?;
        Ok(Warehouse {
            id: row.id,
            name: row.name,
            kind,
            created_at: row.created_at,
        })
    }
}

/// Row for transfer queries
#[derive(Debug, FromRow)]
struct TransferRow {
    id: Uuid,
    material_id: Uuid,
    source_warehouse_id: Uuid,
    dest_warehouse_id: Uuid,
    quantity: Decimal,
    order_id: Option<Uuid>,
    note: String,
    created_at: DateTime<Utc>,
}

impl From<TransferRow> for Transfer {
    fn from(row: TransferRow) -> Self {
        Transfer {
            id: row.id,
            material_id: row.material_id,
            source_warehouse_id: row.source_warehouse_id,
            dest_warehouse_id: row.dest_warehouse_id,
            quantity: row.quantity,
            order_id: row.order_id,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append one immutable ledger movement.
    ///
    /// Outbound movements re-check the usable balance under the same
    /// per-material lock as the write, closing the check-then-act race.
    pub async fn post_movement(&self, input: PostMovementInput) -> AppResult<StockMovement> {
        validate_quantity(input.quantity)?;

        if input.kind == MovementKind::Return && input.return_action.is_none() {
            return Err(AppError::Validation {
                field: "return_action".to_string(),
                message: "Return movements require a return action".to_string(),
                message_tr: "İade hareketi için iade aksiyonu seçilmelidir".to_string(),
            });
        }
        let return_action = if input.kind == MovementKind::Return {
            input.return_action
        } else {
            None
        };

        self.ensure_material_exists(input.material_id).await?;
        self.ensure_warehouse_exists(input.warehouse_id).await?;
        if let Some(order_id) = input.order_id {
            self.ensure_order_exists(order_id).await?;
        }

        let mut tx = self.db.begin().await?;
        lock_material(&mut tx, input.material_id).await?;

        if input.kind == MovementKind::Out {
            let available =
                usable_balance_in_tx(&mut tx, input.material_id, Some(input.warehouse_id)).await?;
            ensure_sufficient(available, input.quantity)?;
        }

        let row = insert_movement(
            &mut tx,
            &MovementDraft {
                material_id: input.material_id,
                warehouse_id: input.warehouse_id,
                kind: input.kind,
                quantity: input.quantity,
                order_id: input.order_id,
                note: input.note.unwrap_or_default(),
            },
            return_action,
            None,
            input.reference.as_deref(),
        )
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Balance of owned stock for a material, optionally scoped to one
    /// warehouse. Pending exchange returns still count as owned.
    pub async fn balance(
        &self,
        material_id: Uuid,
        warehouse_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        self.ensure_material_exists(material_id).await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(
                CASE
                    WHEN kind = 'in' THEN quantity
                    WHEN kind = 'out' THEN -quantity
                    WHEN kind = 'return' AND return_action = 'cancel' THEN -quantity
                    ELSE 0
                END
            ), 0)
            FROM stock_movements
            WHERE material_id = $1 AND ($2::uuid IS NULL OR warehouse_id = $2)
            "#,
        )
        .bind(material_id)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(balance)
    }

    /// Balance of usable stock: owned minus returns awaiting exchange.
    /// This is the balance outbound sufficiency checks consult.
    pub async fn usable_balance(
        &self,
        material_id: Uuid,
        warehouse_id: Option<Uuid>,
    ) -> AppResult<Decimal> {
        self.ensure_material_exists(material_id).await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(
                CASE
                    WHEN kind = 'in' THEN quantity
                    WHEN kind IN ('out', 'return') THEN -quantity
                    ELSE 0
                END
            ), 0)
            FROM stock_movements
            WHERE material_id = $1 AND ($2::uuid IS NULL OR warehouse_id = $2)
            "#,
        )
        .bind(material_id)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(balance)
    }

    /// Movement history for a material, newest first
    pub async fn get_movements(&self, material_id: Uuid) -> AppResult<Vec<StockMovement>> {
        self.ensure_material_exists(material_id).await?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, material_id, warehouse_id, kind, return_action, quantity,
                   order_id, transfer_id, reference, note, moved_at
            FROM stock_movements
            WHERE material_id = $1
            ORDER BY moved_at DESC, id DESC
            "#,
        )
        .bind(material_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }

    /// Stock levels across the catalog with critical-threshold status
    pub async fn get_stock_levels(&self) -> AppResult<Vec<StockLevel>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, Decimal, Decimal, Decimal)>(
            r#"
            SELECT m.id, m.name, m.unit, m.critical_stock,
                   COALESCE(SUM(
                       CASE
                           WHEN sm.kind = 'in' THEN sm.quantity
                           WHEN sm.kind = 'out' THEN -sm.quantity
                           WHEN sm.kind = 'return' AND sm.return_action = 'cancel' THEN -sm.quantity
                           ELSE 0
                       END
                   ), 0) AS owned,
                   COALESCE(SUM(
                       CASE
                           WHEN sm.kind = 'in' THEN sm.quantity
                           WHEN sm.kind IN ('out', 'return') THEN -sm.quantity
                           ELSE 0
                       END
                   ), 0) AS usable
            FROM materials m
            LEFT JOIN stock_movements sm ON sm.material_id = m.id
            GROUP BY m.id, m.name, m.unit, m.critical_stock
            ORDER BY m.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, unit, critical_stock, owned, usable)| StockLevel {
                material_id: id,
                material_name: name,
                unit,
                owned_balance: owned,
                usable_balance: usable,
                status: classify_stock_level(usable, critical_stock),
            })
            .collect())
    }

    /// Create a transfer: exactly two movements, one `out` at the source
    /// and one `in` at the destination, in a single transaction.
    ///
    /// When no order is given and the source is the in-transit warehouse,
    /// the oldest open purchase order still awaiting in-transit clearance
    /// is matched and stamped onto both movements. The candidate scan
    /// holds `FOR UPDATE` row locks and the whole sequence runs under the
    /// per-material advisory lock, so two concurrent transfers cannot
    /// both attach to the same pending quantity.
    pub async fn create_transfer(&self, input: CreateTransferInput) -> AppResult<Transfer> {
        validate_quantity(input.quantity)?;

        self.ensure_material_exists(input.material_id).await?;
        let source = self.get_warehouse(input.source_warehouse_id).await?;
        let dest = self.get_warehouse(input.dest_warehouse_id).await?;
        if let Some(order_id) = input.order_id {
            self.ensure_order_exists(order_id).await?;
        }

        let mut tx = self.db.begin().await?;
        lock_material(&mut tx, input.material_id).await?;

        let available =
            usable_balance_in_tx(&mut tx, input.material_id, Some(source.id)).await?;
        ensure_sufficient(available, input.quantity)?;

        let mut note = input.note.unwrap_or_default();
        let mut order_id = input.order_id;

        if order_id.is_none() && source.kind == WarehouseKind::InTransit {
            let candidates = fifo_candidates(&mut tx, input.material_id).await?;
            if let Some(matched) = select_fifo_candidate(&candidates) {
                if note.is_empty() {
                    note = format!("Auto-matched: order {matched}");
                } else {
                    note.push_str(&format!(" (auto order {matched})"));
                }
                tracing::info!(
                    material_id = %input.material_id,
                    order_id = %matched,
                    "transfer auto-matched to oldest open order"
                );
                order_id = Some(matched);
            }
        }

        let plan = plan_transfer(
            input.material_id,
            &source,
            &dest,
            input.quantity,
            order_id,
            &note,
        )?;

        let transfer = sqlx::query_as::<_, TransferRow>(
            r#"
            INSERT INTO transfers (material_id, source_warehouse_id, dest_warehouse_id,
                                   quantity, order_id, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, material_id, source_warehouse_id, dest_warehouse_id,
                      quantity, order_id, note, created_at
            "#,
        )
        .bind(input.material_id)
        .bind(source.id)
        .bind(dest.id)
        .bind(input.quantity)
        .bind(order_id)
        .bind(&note)
        .fetch_one(&mut *tx)
        .await?;

        insert_movement(&mut tx, &plan.outbound, None, Some(transfer.id), None).await?;
        insert_movement(&mut tx, &plan.inbound, None, Some(transfer.id), None).await?;

        // A transfer landing in a physical warehouse counts as delivery
        // for the attributed order
        if let Some(order_id) = order_id {
            if dest.kind.is_physical() && !source.kind.is_physical() {
                sqlx::query(
                    "UPDATE purchase_orders SET delivered_qty = delivered_qty + $1 WHERE id = $2",
                )
                .bind(input.quantity)
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(transfer.into())
    }

    async fn get_warehouse(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, kind, created_at FROM warehouses WHERE id = $1",
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        row.try_into()
    }

    async fn ensure_material_exists(&self, material_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1)")
                .bind(material_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Material".to_string()));
        }
        Ok(())
    }

    async fn ensure_warehouse_exists(&self, warehouse_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(warehouse_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        Ok(())
    }

    async fn ensure_order_exists(&self, order_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM purchase_orders WHERE id = $1)",
        )
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Purchase order".to_string()));
        }
        Ok(())
    }
}

/// Serialize ledger mutations per material for the lifetime of the
/// transaction
pub(crate) async fn lock_material(
    tx: &mut Transaction<'_, Postgres>,
    material_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text)::bigint)")
        .bind(material_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Usable balance computed inside the caller's transaction, so the
/// sufficiency check and the movement write see the same ledger state
pub(crate) async fn usable_balance_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    material_id: Uuid,
    warehouse_id: Option<Uuid>,
) -> Result<Decimal, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(
            CASE
                WHEN kind = 'in' THEN quantity
                WHEN kind IN ('out', 'return') THEN -quantity
                ELSE 0
            END
        ), 0)
        FROM stock_movements
        WHERE material_id = $1 AND ($2::uuid IS NULL OR warehouse_id = $2)
        "#,
    )
    .bind(material_id)
    .bind(warehouse_id)
    .fetch_one(&mut **tx)
    .await
}

/// Open purchase orders for a material, oldest first, each with its
/// in-transit pending quantity. Rows are locked for the duration of the
/// matching transaction.
async fn fifo_candidates(
    tx: &mut Transaction<'_, Postgres>,
    material_id: Uuid,
) -> Result<Vec<FifoCandidate>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
        r#"
        SELECT po.id,
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
               ), 0) AS in_transit_pending
        FROM purchase_orders po
        JOIN quotes q ON q.id = po.quote_id
        WHERE q.material_id = $1 AND po.delivered_qty < po.ordered_qty
        ORDER BY po.created_at
        FOR UPDATE OF po
        "#,
    )
    .bind(material_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(order_id, in_transit_pending)| FifoCandidate {
            order_id,
            in_transit_pending,
        })
        .collect())
}

/// Insert one ledger row inside the caller's transaction
pub(crate) async fn insert_movement(
    tx: &mut Transaction<'_, Postgres>,
    draft: &MovementDraft,
    return_action: Option<ReturnAction>,
    transfer_id: Option<Uuid>,
    reference: Option<&str>,
) -> Result<MovementRow, sqlx::Error> {
    sqlx::query_as::<_, MovementRow>(
        r#"
        INSERT INTO stock_movements (material_id, warehouse_id, kind, return_action,
                                     quantity, order_id, transfer_id, reference, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, material_id, warehouse_id, kind, return_action, quantity,
                  order_id, transfer_id, reference, note, moved_at
        "#,
    )
    .bind(draft.material_id)
    .bind(draft.warehouse_id)
    .bind(draft.kind.as_str())
    .bind(return_action.map(|a| a.as_str()))
    .bind(draft.quantity)
    .bind(draft.order_id)
    .bind(transfer_id)
    .bind(reference)
    .bind(&draft.note)
    .fetch_one(&mut **tx)
    .await
}
