//! Exact-decimal money and VAT arithmetic
//!
//! All monetary values are `rust_decimal::Decimal`; floating point never
//! touches money. Intermediate results stay unrounded: `round_money` is
//! applied once, when a value is assigned to a stored amount.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for stored monetary amounts
pub const MONEY_SCALE: u32 = 2;

/// Round a final amount to two decimal places, half-up
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Strip VAT from a tax-inclusive amount: `net = gross / (1 + rate/100)`.
///
/// Used when a price is entered VAT-inclusive but must be stored
/// tax-exclusive. The result is intentionally not rounded; unit prices
/// keep full precision until a final amount is derived from them.
pub fn extract_vat(gross: Decimal, vat_rate: Decimal) -> Decimal {
    gross / (Decimal::ONE + vat_rate / Decimal::ONE_HUNDRED)
}

/// Add VAT to a tax-exclusive amount: `gross = net * (1 + rate/100)`.
pub fn add_vat(net: Decimal, vat_rate: Decimal) -> Decimal {
    net * (Decimal::ONE + vat_rate / Decimal::ONE_HUNDRED)
}

/// Convert an amount into the base currency using the exchange rate
/// locked on the originating record. The rate is captured once at
/// transaction time and never recomputed from a live feed, so historical
/// documents stay reproducible.
pub fn to_base_currency(amount: Decimal, locked_rate: Decimal) -> Decimal {
    amount * locked_rate
}
