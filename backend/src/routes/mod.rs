//! Route definitions for the Construction Procurement Platform

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Quote management
        .nest("/quotes", quote_routes())
        // Purchase order lifecycle
        .nest("/orders", order_routes())
        // Stock ledger
        .nest("/stock", stock_routes())
        // Invoices
        .nest("/invoices", invoice_routes())
        // Progress payments
        .nest("/progress-payments", progress_payment_routes())
        // Supplier payments
        .nest("/payments", payment_routes())
        // Suppliers
        .nest("/suppliers", supplier_routes())
}

/// Quote management routes
fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_quotes).post(handlers::create_quote))
        .route("/:quote_id", get(handlers::get_quote))
        .route("/:quote_id/approve", post(handlers::approve_quote))
        .route("/:quote_id/reject", post(handlers::reject_quote))
}

/// Purchase order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", get(handlers::get_order_status))
        .route("/:order_id/receipts", post(handlers::receive_goods))
        .route(
            "/:order_id/invoice-defaults",
            get(handlers::get_invoice_defaults),
        )
        .route(
            "/:order_id/invoices",
            post(handlers::record_invoice),
        )
        .route(
            "/:order_id/progress-payments",
            get(handlers::list_progress_payments).post(handlers::create_progress_payment),
        )
}

/// Stock ledger routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/movements", post(handlers::post_movement))
        .route("/levels", get(handlers::get_stock_levels))
        .route("/transfers", post(handlers::create_transfer))
        .route("/:material_id/balance", get(handlers::get_balance))
        .route(
            "/:material_id/usable-balance",
            get(handlers::get_usable_balance),
        )
        .route("/:material_id/movements", get(handlers::get_movements))
}

/// Invoice routes
fn invoice_routes() -> Router<AppState> {
    Router::new().route("/:invoice_id", delete(handlers::delete_invoice))
}

/// Progress payment routes
fn progress_payment_routes() -> Router<AppState> {
    Router::new().route(
        "/:progress_payment_id/net-payable",
        get(handlers::get_net_payable),
    )
}

/// Supplier payment routes
fn payment_routes() -> Router<AppState> {
    Router::new().route("/", post(handlers::create_payment))
}

/// Supplier routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers))
        .route("/:supplier_id", get(handlers::get_supplier))
        .route("/:supplier_id/statement", get(handlers::get_account_statement))
        .route("/:supplier_id/open-items", get(handlers::get_open_items))
}
