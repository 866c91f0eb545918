//! HTTP handlers for invoice endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{Invoice, InvoiceDefaults};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::invoice::{DeleteInvoiceOutcome, InvoiceService, RecordInvoiceInput};
use crate::AppState;

/// Suggested entry figures for invoicing an order
pub async fn get_invoice_defaults(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<InvoiceDefaults>> {
    let service = InvoiceService::new(state.db);
    let defaults = service.invoice_defaults(order_id).await?;
    Ok(Json(defaults))
}

/// Record an invoice against an order
pub async fn record_invoice(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<RecordInvoiceInput>,
) -> AppResult<Json<Invoice>> {
    let service = InvoiceService::new(state.db);
    let invoice = service.record_invoice(order_id, input).await?;
    Ok(Json(invoice))
}

/// Delete an invoice, reversing its counter and ledger effects
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<DeleteInvoiceOutcome>> {
    let service = InvoiceService::new(state.db);
    let outcome = service.delete_invoice(invoice_id).await?;
    Ok(Json(outcome))
}
