//! SQLite expense store.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::debug;

use super::{CategoryTable, ExpenseStore, Result};
use crate::categorize::{CategoryRule, default_rules};
use crate::error::StoreError;
use crate::models::expense::{ExpenseId, NewExpense, StoredExpense, UserId};
use crate::models::transaction::PaymentMethod;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    amount TEXT NOT NULL,
    category TEXT NOT NULL,
    date TEXT NOT NULL,
    payment_method TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses (user_id, date);

CREATE TABLE IF NOT EXISTS category_rules (
    id INTEGER PRIMARY KEY,
    category TEXT NOT NULL,
    keywords TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 0
);
";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Expense store backed by a SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and initialize) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let count: i64 = conn.query_row("SELECT count(*) FROM category_rules", [], |row| row.get(0))?;
        if count == 0 {
            for (priority, rule) in default_rules().iter().enumerate() {
                conn.execute(
                    "INSERT INTO category_rules (category, keywords, priority) VALUES (?1, ?2, ?3)",
                    params![rule.category, rule.keywords.join(","), priority as i64],
                )?;
            }
            debug!("Seeded {} category rules", default_rules().len());
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Replace the category table, keeping the given order as priority.
    pub fn replace_rules(&self, rules: &[CategoryRule]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM category_rules", [])?;
        for (priority, rule) in rules.iter().enumerate() {
            tx.execute(
                "INSERT INTO category_rules (category, keywords, priority) VALUES (?1, ?2, ?3)",
                params![rule.category, rule.keywords.join(","), priority as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Number of expenses stored for `user`.
    pub fn count(&self, user: &UserId) -> Result<usize> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT count(*) FROM expenses WHERE user_id = ?1",
            [user.0],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

type Row = (i64, String, String, String, String, String, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn decode_row(row: Row) -> Result<StoredExpense> {
    let (id, title, description, amount, date, category, payment_method) = row;
    let amount = Decimal::from_str(&amount)
        .map_err(|e| StoreError::Corrupt(format!("expense {}: amount {:?}: {}", id, amount, e)))?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("expense {}: date {:?}: {}", id, date, e)))?;

    Ok(StoredExpense {
        id: ExpenseId(id),
        title,
        description,
        amount,
        date,
        category,
        payment_method: PaymentMethod::parse(&payment_method),
    })
}

fn amount_key(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

impl ExpenseStore for SqliteStore {
    fn query(&self, user: &UserId, date: NaiveDate, amount: Decimal) -> Result<Vec<StoredExpense>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, amount, date, category, payment_method
             FROM expenses WHERE user_id = ?1 AND date = ?2 AND amount = ?3
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(
                params![user.0, date.format(DATE_FORMAT).to_string(), amount_key(amount)],
                read_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(decode_row).collect()
    }

    fn create(&self, user: &UserId, expense: &NewExpense) -> Result<ExpenseId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO expenses (user_id, title, description, amount, category, date, payment_method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.0,
                expense.title,
                expense.description,
                amount_key(expense.amount),
                expense.category,
                expense.date.format(DATE_FORMAT).to_string(),
                expense.payment_method.as_str(),
            ],
        )?;
        Ok(ExpenseId(conn.last_insert_rowid()))
    }
}

impl CategoryTable for SqliteStore {
    fn list(&self) -> Result<Vec<CategoryRule>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT category, keywords FROM category_rules ORDER BY priority, id")?;
        let rules = stmt
            .query_map([], |row| {
                let category: String = row.get(0)?;
                let keywords: String = row.get(1)?;
                Ok(CategoryRule {
                    category,
                    keywords: keywords
                        .split(',')
                        .map(|k| k.trim().to_lowercase())
                        .filter(|k| !k.is_empty())
                        .collect(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }
}
