//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::DeliveryStatus;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::order::{OrderService, OrderView, ReceiveGoodsInput};
use crate::AppState;

/// Delivery status response
#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub order_id: Uuid,
    pub delivery_status: DeliveryStatus,
}

/// List purchase orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<OrderView>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// Get a purchase order with its derived state
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderView>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Get the derived delivery status of an order
pub async fn get_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderStatusResponse>> {
    let service = OrderService::new(state.db);
    let delivery_status = service.order_status(order_id).await?;
    Ok(Json(OrderStatusResponse {
        order_id,
        delivery_status,
    }))
}

/// Receive goods for an order into a warehouse
pub async fn receive_goods(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceiveGoodsInput>,
) -> AppResult<Json<OrderView>> {
    let service = OrderService::new(state.db);
    let order = service.receive_goods(order_id, input).await?;
    Ok(Json(order))
}
