use std::path::Path;

use chrono::NaiveDate;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use finbot_core::{
    Expense, ExpenseDraft, Goal, GoalDraft, Income, IncomeDraft, Ledger, LedgerError, Money,
};

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    open_pool(&format!("sqlite:{}?mode=rwc", path.display())).await
}

/// In-memory database, used by tests.
pub async fn create_memory_db() -> Result<DbPool, sqlx::Error> {
    open_pool("sqlite::memory:").await
}

async fn open_pool(url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA cache_size = -32000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS incomes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            value_cents INTEGER NOT NULL,
            date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            value_cents INTEGER NOT NULL,
            due_date TEXT NOT NULL,
            paid INTEGER NOT NULL DEFAULT 0,
            paid_date TEXT,
            installment_current INTEGER,
            installment_total INTEGER,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            target_cents INTEGER NOT NULL,
            saved_cents INTEGER NOT NULL DEFAULT 0,
            completed INTEGER NOT NULL DEFAULT 0,
            deadline TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// SQLite-backed implementation of the persistence collaborator.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    pub fn new(pool: DbPool) -> Self {
        SqliteLedger { pool }
    }

    async fn fetch_expense(&self, id: i64) -> Result<Option<Expense>, LedgerError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            "SELECT id, description, category, value_cents, due_date, paid, paid_date, \
             installment_current, installment_total, notes FROM expenses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        row.map(expense_from_row).transpose()
    }

    async fn fetch_income(&self, id: i64) -> Result<Option<Income>, LedgerError> {
        let row = sqlx::query_as::<_, IncomeRow>(
            "SELECT id, description, category, value_cents, date, notes FROM incomes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        row.map(income_from_row).transpose()
    }
}

fn storage_err(e: sqlx::Error) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

fn parse_iso(date: &str) -> Result<NaiveDate, LedgerError> {
    date.parse()
        .map_err(|_| LedgerError::Storage(format!("bad date in database: {date}")))
}

fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

type IncomeRow = (i64, String, String, i64, String, Option<String>);

fn income_from_row(r: IncomeRow) -> Result<Income, LedgerError> {
    Ok(Income {
        id: r.0,
        description: r.1,
        category: r.2,
        value: Money::from_cents(r.3),
        date: parse_iso(&r.4)?,
        notes: r.5,
    })
}

type ExpenseRow = (
    i64,
    String,
    String,
    i64,
    String,
    i64,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<String>,
);

fn expense_from_row(r: ExpenseRow) -> Result<Expense, LedgerError> {
    Ok(Expense {
        id: r.0,
        description: r.1,
        category: r.2,
        value: Money::from_cents(r.3),
        due_date: parse_iso(&r.4)?,
        paid: r.5 != 0,
        paid_date: r.6.as_deref().map(parse_iso).transpose()?,
        installment_current: r.7,
        installment_total: r.8,
        notes: r.9,
    })
}

impl Ledger for SqliteLedger {
    async fn add_income(&self, draft: IncomeDraft) -> Result<Income, LedgerError> {
        let result = sqlx::query(
            "INSERT INTO incomes (description, category, value_cents, date, notes) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(draft.value.to_cents())
        .bind(draft.date.to_string())
        .bind(&draft.notes)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Income {
            id: result.last_insert_rowid(),
            description: draft.description,
            category: draft.category,
            value: draft.value,
            date: draft.date,
            notes: draft.notes,
        })
    }

    async fn add_expense(&self, draft: ExpenseDraft) -> Result<Expense, LedgerError> {
        let result = sqlx::query(
            "INSERT INTO expenses (description, category, value_cents, due_date, paid, \
             paid_date, installment_current, installment_total, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(draft.value.to_cents())
        .bind(draft.due_date.to_string())
        .bind(draft.paid as i64)
        .bind(draft.paid_date.map(|d| d.to_string()))
        .bind(draft.installment_current)
        .bind(draft.installment_total)
        .bind(&draft.notes)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Expense {
            id: result.last_insert_rowid(),
            description: draft.description,
            category: draft.category,
            value: draft.value,
            due_date: draft.due_date,
            paid: draft.paid,
            paid_date: draft.paid_date,
            installment_current: draft.installment_current,
            installment_total: draft.installment_total,
            notes: draft.notes,
        })
    }

    async fn add_goal(&self, draft: GoalDraft) -> Result<Goal, LedgerError> {
        let result = sqlx::query(
            "INSERT INTO goals (description, target_cents, deadline) VALUES (?, ?, ?)",
        )
        .bind(&draft.description)
        .bind(draft.target.to_cents())
        .bind(draft.deadline.map(|d| d.to_string()))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Goal {
            id: result.last_insert_rowid(),
            description: draft.description,
            target: draft.target,
            saved: Money::zero(),
            completed: false,
            deadline: draft.deadline,
        })
    }

    async fn incomes_in_month(
        &self,
        year: i32,
        month: u32,
        category: Option<&str>,
    ) -> Result<Vec<Income>, LedgerError> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, IncomeRow>(
                    "SELECT id, description, category, value_cents, date, notes FROM incomes \
                     WHERE substr(date, 1, 7) = ? AND category = ? ORDER BY date DESC, id DESC",
                )
                .bind(month_key(year, month))
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, IncomeRow>(
                    "SELECT id, description, category, value_cents, date, notes FROM incomes \
                     WHERE substr(date, 1, 7) = ? ORDER BY date DESC, id DESC",
                )
                .bind(month_key(year, month))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage_err)?;

        rows.into_iter().map(income_from_row).collect()
    }

    async fn expenses_in_month(
        &self,
        year: i32,
        month: u32,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, LedgerError> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ExpenseRow>(
                    "SELECT id, description, category, value_cents, due_date, paid, paid_date, \
                     installment_current, installment_total, notes FROM expenses \
                     WHERE substr(due_date, 1, 7) = ? AND category = ? \
                     ORDER BY due_date ASC, id ASC",
                )
                .bind(month_key(year, month))
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ExpenseRow>(
                    "SELECT id, description, category, value_cents, due_date, paid, paid_date, \
                     installment_current, installment_total, notes FROM expenses \
                     WHERE substr(due_date, 1, 7) = ? ORDER BY due_date ASC, id ASC",
                )
                .bind(month_key(year, month))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage_err)?;

        rows.into_iter().map(expense_from_row).collect()
    }

    async fn goals(&self) -> Result<Vec<Goal>, LedgerError> {
        let rows = sqlx::query_as::<_, (i64, String, i64, i64, i64, Option<String>)>(
            "SELECT id, description, target_cents, saved_cents, completed, deadline FROM goals \
             ORDER BY completed ASC, deadline ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter()
            .map(|r| {
                Ok(Goal {
                    id: r.0,
                    description: r.1,
                    target: Money::from_cents(r.2),
                    saved: Money::from_cents(r.3),
                    completed: r.4 != 0,
                    deadline: r.5.as_deref().map(parse_iso).transpose()?,
                })
            })
            .collect()
    }

    async fn delete_income(&self, id: i64) -> Result<Option<Income>, LedgerError> {
        let Some(income) = self.fetch_income(id).await? else {
            return Ok(None);
        };
        sqlx::query("DELETE FROM incomes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(Some(income))
    }

    async fn delete_expense(&self, id: i64) -> Result<Option<Expense>, LedgerError> {
        let Some(expense) = self.fetch_expense(id).await? else {
            return Ok(None);
        };
        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(Some(expense))
    }

    async fn toggle_expense_paid(
        &self,
        id: i64,
        paid_on: NaiveDate,
    ) -> Result<Option<Expense>, LedgerError> {
        let Some(expense) = self.fetch_expense(id).await? else {
            return Ok(None);
        };
        let paid = !expense.paid;
        let paid_date = paid.then_some(paid_on);

        sqlx::query("UPDATE expenses SET paid = ?, paid_date = ? WHERE id = ?")
            .bind(paid as i64)
            .bind(paid_date.map(|d| d.to_string()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(Some(Expense {
            paid,
            paid_date,
            ..expense
        }))
    }
}
