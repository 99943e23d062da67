use chrono::NaiveDate;
use thiserror::Error;

use crate::record::{Expense, ExpenseDraft, Goal, GoalDraft, Income, IncomeDraft};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage failure: {0}")]
    Storage(String),
}

/// The persistence collaborator. The core interpreter and ingestion engine
/// only ever reach stored records through these operations; ids are assigned
/// by the implementation on insert. Missing ids surface as `Ok(None)`, never
/// as errors.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    async fn add_income(&self, draft: IncomeDraft) -> Result<Income, LedgerError>;
    async fn add_expense(&self, draft: ExpenseDraft) -> Result<Expense, LedgerError>;
    async fn add_goal(&self, draft: GoalDraft) -> Result<Goal, LedgerError>;

    /// Incomes dated inside the given month, optionally restricted to one
    /// category, ordered by date descending.
    async fn incomes_in_month(
        &self,
        year: i32,
        month: u32,
        category: Option<&str>,
    ) -> Result<Vec<Income>, LedgerError>;

    /// Expenses due inside the given month, optionally restricted to one
    /// category, ordered by due date ascending.
    async fn expenses_in_month(
        &self,
        year: i32,
        month: u32,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, LedgerError>;

    async fn goals(&self) -> Result<Vec<Goal>, LedgerError>;

    async fn delete_income(&self, id: i64) -> Result<Option<Income>, LedgerError>;
    async fn delete_expense(&self, id: i64) -> Result<Option<Expense>, LedgerError>;

    /// Flips the paid flag of an expense. Marking as paid records `paid_on`
    /// as the payment date; marking back as pending clears it.
    async fn toggle_expense_paid(
        &self,
        id: i64,
        paid_on: NaiveDate,
    ) -> Result<Option<Expense>, LedgerError>;
}
