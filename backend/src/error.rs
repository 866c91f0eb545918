//! Error handling for the Construction Procurement Platform
//!
//! Provides consistent error responses in English and Turkish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::DomainError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_tr: String,
    },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: Decimal },

    #[error("Quote must name exactly one of work item or material")]
    AmbiguousScope,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_tr: String,
    },

    // Business logic errors
    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        available: Decimal,
        requested: Decimal,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidQuantity(quantity) => AppError::InvalidQuantity { quantity },
            DomainError::AmbiguousScope => AppError::AmbiguousScope,
            DomainError::InsufficientStock {
                available,
                requested,
            } => AppError::InsufficientStock {
                available,
                requested,
            },
            DomainError::InvalidPercent(percent) => AppError::Validation {
                field: "percent".to_string(),
                message: format!("Percentage must be between 0 and 100, got {percent}"),
                message_tr: format!("Yüzde 0 ile 100 arasında olmalıdır: {percent}"),
            },
            DomainError::SameWarehouse => AppError::Validation {
                field: "dest_warehouse_id".to_string(),
                message: "Source and destination warehouses must differ".to_string(),
                message_tr: "Kaynak ve hedef depo aynı olamaz".to_string(),
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_tr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_tr,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_tr: message_tr.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::InvalidQuantity { quantity } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_QUANTITY".to_string(),
                    message_en: format!("Quantity must be positive, got {quantity}"),
                    message_tr: format!("Miktar pozitif olmalıdır: {quantity}"),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::AmbiguousScope => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "AMBIGUOUS_SCOPE".to_string(),
                    message_en: "Exactly one of work item or material must be set".to_string(),
                    message_tr: "İş kalemi veya malzemeden yalnızca biri seçilmelidir".to_string(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{resource} not found"),
                    message_tr: format!("{resource} bulunamadı"),
                    field: None,
                },
            ),
            AppError::Conflict {
                resource,
                message,
                message_tr,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_tr: message_tr.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::InsufficientStock {
                available,
                requested,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Insufficient stock: {available} available, {requested} requested"
                    ),
                    message_tr: format!(
                        "Yetersiz stok: mevcut {available}, istenen {requested}"
                    ),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_tr: "Veritabanı hatası oluştu".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_tr: "Sunucu hatası oluştu".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_tr: "Sunucu hatası oluştu".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
