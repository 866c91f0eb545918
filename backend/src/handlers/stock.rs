//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{StockMovement, Transfer};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::{CreateTransferInput, PostMovementInput, StockLevel, StockService};
use crate::AppState;

/// Warehouse scope for balance queries; unscoped sums all warehouses
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub warehouse_id: Option<Uuid>,
}

/// Balance response
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub material_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub balance: Decimal,
}

/// Post a stock movement
pub async fn post_movement(
    State(state): State<AppState>,
    Json(input): Json<PostMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = StockService::new(state.db);
    let movement = service.post_movement(input).await?;
    Ok(Json(movement))
}

/// Owned balance for a material, optionally scoped to one warehouse
pub async fn get_balance(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<BalanceResponse>> {
    let service = StockService::new(state.db);
    let balance = service.balance(material_id, query.warehouse_id).await?;
    Ok(Json(BalanceResponse {
        material_id,
        warehouse_id: query.warehouse_id,
        balance,
    }))
}

/// Usable balance (owned minus pending exchanges)
pub async fn get_usable_balance(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<BalanceResponse>> {
    let service = StockService::new(state.db);
    let balance = service
        .usable_balance(material_id, query.warehouse_id)
        .await?;
    Ok(Json(BalanceResponse {
        material_id,
        warehouse_id: query.warehouse_id,
        balance,
    }))
}

/// Movement history for a material
pub async fn get_movements(
    State(state): State<AppState>,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.db);
    let movements = service.get_movements(material_id).await?;
    Ok(Json(movements))
}

/// Stock levels across the catalog with critical-threshold status
pub async fn get_stock_levels(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = StockService::new(state.db);
    let levels = service.get_stock_levels().await?;
    Ok(Json(levels))
}

/// Create a warehouse-to-warehouse transfer
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<Json<Transfer>> {
    let service = StockService::new(state.db);
    let transfer = service.create_transfer(input).await?;
    Ok(Json(transfer))
}
