//! HTTP handlers for supplier payment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use shared::OpenItem;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::payment::{CreatePaymentInput, PaymentResult, PaymentService};
use crate::AppState;

/// Record a payment and allocate it across open items
pub async fn create_payment(
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentInput>,
) -> AppResult<Json<PaymentResult>> {
    let service = PaymentService::new(state.db, state.rates);
    let result = service.create_payment(input).await?;
    Ok(Json(result))
}

/// Open receivables of a supplier, oldest first
pub async fn get_open_items(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Vec<OpenItem>>> {
    let service = PaymentService::new(state.db, state.rates);
    let items = service.open_items(supplier_id).await?;
    Ok(Json(items))
}
