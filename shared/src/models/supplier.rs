//! Suppliers and account statements

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplier or subcontractor firm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of a supplier account statement
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    pub entry_date: NaiveDate,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Running balance after this line (debit positive)
    pub balance: Decimal,
}

/// Sort statement lines chronologically and fill the running balance
pub fn with_running_balance(mut lines: Vec<StatementLine>) -> Vec<StatementLine> {
    lines.sort_by_key(|line| line.entry_date);
    let mut balance = Decimal::ZERO;
    for line in &mut lines {
        balance += line.debit - line.credit;
        line.balance = balance;
    }
    lines
}
