//! Supplier service: catalog reads and account statements

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{add_vat, round_money, to_base_currency, with_running_balance, StatementLine, Supplier};

use crate::error::{AppError, AppResult};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// A supplier account statement with totals
#[derive(Debug, Serialize)]
pub struct SupplierStatement {
    pub supplier_id: Uuid,
    pub company_name: String,
    pub lines: Vec<StatementLine>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Closing balance (debit positive: what the company still owes)
    pub balance: Decimal,
}

/// Row for supplier queries
#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    company_name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            company_name: row.company_name,
            contact_person: row.contact_person,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, company_name, contact_person, phone, created_at FROM suppliers ORDER BY company_name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    /// Get a supplier by ID
    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, company_name, contact_person, phone, created_at FROM suppliers WHERE id = $1",
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(row.into())
    }

    /// Chronological debit/credit statement with running balance.
    /// Debits are approved orders at their VAT-inclusive locked-rate
    /// totals; credits are payments at the rate locked on each payment.
    pub async fn account_statement(&self, supplier_id: Uuid) -> AppResult<SupplierStatement> {
        let supplier = self.get_supplier(supplier_id).await?;

        let debit_rows = sqlx::query_as::<_, (String, Decimal, Decimal, Decimal, Decimal, DateTime<Utc>)>(
            r#"
            SELECT COALESCE(m.name, wi.name, '-'), q.quantity, q.unit_price, q.locked_rate,
                   q.vat_rate, q.created_at
            FROM quotes q
            LEFT JOIN materials m ON m.id = q.material_id
            LEFT JOIN work_items wi ON wi.id = q.work_item_id
            WHERE q.supplier_id = $1 AND q.status = 'approved'
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        let credit_rows = sqlx::query_as::<_, (String, Decimal, Decimal, NaiveDate)>(
            r#"
            SELECT method, amount, locked_rate, paid_at
            FROM payments
            WHERE supplier_id = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        let mut lines = Vec::new();

        for (subject, quantity, unit_price, locked_rate, vat_rate, created_at) in debit_rows {
            let debit = round_money(add_vat(quantity * unit_price * locked_rate, vat_rate));
            lines.push(StatementLine {
                entry_date: created_at.date_naive(),
                description: subject,
                debit,
                credit: Decimal::ZERO,
                balance: Decimal::ZERO,
            });
        }

        for (method, amount, locked_rate, paid_at) in credit_rows {
            lines.push(StatementLine {
                entry_date: paid_at,
                description: format!("Payment ({method})"),
                debit: Decimal::ZERO,
                credit: round_money(to_base_currency(amount, locked_rate)),
                balance: Decimal::ZERO,
            });
        }

        let lines = with_running_balance(lines);
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

        Ok(SupplierStatement {
            supplier_id,
            company_name: supplier.company_name,
            balance: total_debit - total_credit,
            total_debit,
            total_credit,
            lines,
        })
    }
}
