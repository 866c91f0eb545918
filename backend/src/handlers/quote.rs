//! HTTP handlers for quote management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{Quote, QuoteStatus};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::quote::{ApproveQuoteResult, CreateQuoteInput, QuoteService};
use crate::AppState;

/// Status filter for quote listings
#[derive(Debug, Deserialize)]
pub struct QuoteListQuery {
    pub status: Option<QuoteStatus>,
}

/// Create a quote
pub async fn create_quote(
    State(state): State<AppState>,
    Json(input): Json<CreateQuoteInput>,
) -> AppResult<Json<Quote>> {
    let service = QuoteService::new(state.db, state.rates);
    let quote = service.create_quote(input).await?;
    Ok(Json(quote))
}

/// List quotes, optionally filtered by status
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> AppResult<Json<Vec<Quote>>> {
    let service = QuoteService::new(state.db, state.rates);
    let quotes = service.list_quotes(query.status).await?;
    Ok(Json(quotes))
}

/// Get a quote by ID
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<Quote>> {
    let service = QuoteService::new(state.db, state.rates);
    let quote = service.get_quote(quote_id).await?;
    Ok(Json(quote))
}

/// Approve a quote, locking its exchange rate and creating the order
pub async fn approve_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<ApproveQuoteResult>> {
    let service = QuoteService::new(state.db, state.rates);
    let result = service.approve_quote(quote_id).await?;
    Ok(Json(result))
}

/// Reject a quote
pub async fn reject_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> AppResult<Json<Quote>> {
    let service = QuoteService::new(state.db, state.rates);
    let quote = service.reject_quote(quote_id).await?;
    Ok(Json(quote))
}
