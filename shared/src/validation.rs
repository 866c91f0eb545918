//! Validation helpers shared by the backend services and the test suites
//!
//! Validation errors are rejected synchronously, before any row is
//! written.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the pure domain layer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    #[error("exactly one of work item or material must be set")]
    AmbiguousScope,

    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        available: Decimal,
        requested: Decimal,
    },

    #[error("percentage must be between 0 and 100, got {0}")]
    InvalidPercent(Decimal),

    #[error("source and destination warehouses must differ")]
    SameWarehouse,
}

/// Reject zero or negative quantities before any ledger write
pub fn validate_quantity(quantity: Decimal) -> Result<(), DomainError> {
    if quantity <= Decimal::ZERO {
        return Err(DomainError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Percentages (VAT, completion, withholding, retention) live in [0, 100]
pub fn validate_percent(percent: Decimal) -> Result<(), DomainError> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(DomainError::InvalidPercent(percent));
    }
    Ok(())
}

/// A quote targets exactly one of {work item, material}: never both,
/// never neither.
pub fn validate_quote_scope(has_work_item: bool, has_material: bool) -> Result<(), DomainError> {
    if has_work_item == has_material {
        return Err(DomainError::AmbiguousScope);
    }
    Ok(())
}

/// Check-then-act guard for outbound movements. Callers must hold the
/// same lock for this check and the movement write.
pub fn ensure_sufficient(available: Decimal, requested: Decimal) -> Result<(), DomainError> {
    if requested > available {
        return Err(DomainError::InsufficientStock {
            available,
            requested,
        });
    }
    Ok(())
}
