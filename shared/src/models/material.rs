//! Material catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{StockStatus, Unit};

/// A catalog material tracked by the stock ledger. Materials are created
/// by catalog management and referenced, never deleted, by ledger rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub unit: Unit,
    /// Default VAT rate class for this material (percent)
    pub vat_rate: Decimal,
    /// Threshold below which stock is flagged as critical
    pub critical_stock: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Classify a balance against the material's critical threshold.
/// Up to 1.5x the threshold counts as low.
pub fn classify_stock_level(balance: Decimal, critical_stock: Decimal) -> StockStatus {
    let low_band = critical_stock * Decimal::new(15, 1);
    if balance <= critical_stock {
        StockStatus::Critical
    } else if balance <= low_band {
        StockStatus::Low
    } else {
        StockStatus::Normal
    }
}
