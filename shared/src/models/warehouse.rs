//! Warehouse models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::WarehouseKind;

/// A stock location. The `in_transit` warehouse is non-physical: it holds
/// goods a supplier has invoiced but the site has not yet received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub kind: WarehouseKind,
    pub created_at: DateTime<Utc>,
}
