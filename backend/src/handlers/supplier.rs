//! HTTP handlers for supplier endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use shared::Supplier;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::supplier::{SupplierService, SupplierStatement};
use crate::AppState;

/// List suppliers
pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.db);
    let suppliers = service.list_suppliers().await?;
    Ok(Json(suppliers))
}

/// Get a supplier by ID
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db);
    let supplier = service.get_supplier(supplier_id).await?;
    Ok(Json(supplier))
}

/// Supplier account statement with running balance
pub async fn get_account_statement(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<SupplierStatement>> {
    let service = SupplierService::new(state.db);
    let statement = service.account_statement(supplier_id).await?;
    Ok(Json(statement))
}
