//! HTTP handlers for progress payment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::ProgressPayment;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::progress_payment::{CreateProgressPaymentInput, ProgressPaymentService};
use crate::AppState;

/// Net payable response
#[derive(Debug, Serialize)]
pub struct NetPayableResponse {
    pub progress_payment_id: Uuid,
    pub net_payable: Decimal,
}

/// Create a progress payment for a labor order
pub async fn create_progress_payment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<CreateProgressPaymentInput>,
) -> AppResult<Json<ProgressPayment>> {
    let service = ProgressPaymentService::new(state.db);
    let progress_payment = service.create_progress_payment(order_id, input).await?;
    Ok(Json(progress_payment))
}

/// List progress payments for an order
pub async fn list_progress_payments(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProgressPayment>>> {
    let service = ProgressPaymentService::new(state.db);
    let progress_payments = service.list_for_order(order_id).await?;
    Ok(Json(progress_payments))
}

/// Net payable of one progress payment
pub async fn get_net_payable(
    State(state): State<AppState>,
    Path(progress_payment_id): Path<Uuid>,
) -> AppResult<Json<NetPayableResponse>> {
    let service = ProgressPaymentService::new(state.db);
    let net_payable = service.net_payable(progress_payment_id).await?;
    Ok(Json(NetPayableResponse {
        progress_payment_id,
        net_payable,
    }))
}
