//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported transaction currencies. `Try` is the base currency; all
/// stored amounts are converted into it with the rate locked on the
/// originating record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Try,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        match code {
            "TRY" => Some(Currency::Try),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            _ => None,
        }
    }

    /// Currencies quoted by the rate provider (the base currency is not).
    pub fn foreign() -> &'static [Currency] {
        &[Currency::Usd, Currency::Eur, Currency::Gbp]
    }
}

/// Units of measure for materials and work items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Piece,
    SquareMeter,
    CubicMeter,
    Kilogram,
    Ton,
    Meter,
    ManHour,
    LumpSum,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Piece => "piece",
            Unit::SquareMeter => "m2",
            Unit::CubicMeter => "m3",
            Unit::Kilogram => "kg",
            Unit::Ton => "ton",
            Unit::Meter => "m",
            Unit::ManHour => "man_hour",
            Unit::LumpSum => "lump_sum",
        }
    }

    pub fn from_code(code: &str) -> Option<Unit> {
        match code {
            "piece" => Some(Unit::Piece),
            "m2" => Some(Unit::SquareMeter),
            "m3" => Some(Unit::CubicMeter),
            "kg" => Some(Unit::Kilogram),
            "ton" => Some(Unit::Ton),
            "m" => Some(Unit::Meter),
            "man_hour" => Some(Unit::ManHour),
            "lump_sum" => Some(Unit::LumpSum),
            _ => None,
        }
    }
}

/// Warehouse classification. Only `InTransit` participates in the FIFO
/// order-matching logic; it represents goods invoiced by a supplier but
/// not yet received on site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseKind {
    Central,
    InTransit,
    Site,
}

impl WarehouseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseKind::Central => "central",
            WarehouseKind::InTransit => "in_transit",
            WarehouseKind::Site => "site",
        }
    }

    pub fn from_code(code: &str) -> Option<WarehouseKind> {
        match code {
            "central" => Some(WarehouseKind::Central),
            "in_transit" => Some(WarehouseKind::InTransit),
            "site" => Some(WarehouseKind::Site),
            _ => None,
        }
    }

    pub fn is_physical(&self) -> bool {
        !matches!(self, WarehouseKind::InTransit)
    }
}

/// Stock level relative to a material's critical threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Normal,
    Low,
    Critical,
}
