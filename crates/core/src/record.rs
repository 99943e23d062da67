use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::RecordKind;
use crate::money::Money;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DraftError {
    #[error("valor deve ser positivo")]
    NonPositiveValue,
    #[error("categoria desconhecida: {0}")]
    UnknownCategory(String),
    #[error("parcela {0}/{1} fora do intervalo")]
    InstallmentOutOfRange(i64, i64),
}

/// An income entry not yet accepted by storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeDraft {
    pub description: String,
    pub category: String,
    pub value: Money,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl IncomeDraft {
    pub fn validate(&self) -> Result<(), DraftError> {
        if !self.value.is_positive() {
            return Err(DraftError::NonPositiveValue);
        }
        if !RecordKind::Income.categories().contains(&self.category.as_str()) {
            return Err(DraftError::UnknownCategory(self.category.clone()));
        }
        Ok(())
    }
}

/// An expense entry not yet accepted by storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub description: String,
    pub category: String,
    pub value: Money,
    pub due_date: NaiveDate,
    pub paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub installment_current: Option<i64>,
    pub installment_total: Option<i64>,
    pub notes: Option<String>,
}

impl ExpenseDraft {
    /// A freshly-added unpaid expense with no installment plan.
    pub fn simple(description: String, category: String, value: Money, due_date: NaiveDate) -> Self {
        ExpenseDraft {
            description,
            category,
            value,
            due_date,
            paid: false,
            paid_date: None,
            installment_current: None,
            installment_total: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if !self.value.is_positive() {
            return Err(DraftError::NonPositiveValue);
        }
        if !RecordKind::Expense.categories().contains(&self.category.as_str()) {
            return Err(DraftError::UnknownCategory(self.category.clone()));
        }
        if let (Some(current), Some(total)) = (self.installment_current, self.installment_total) {
            if current > total || current < 1 {
                return Err(DraftError::InstallmentOutOfRange(current, total));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDraft {
    pub description: String,
    pub target: Money,
    pub deadline: Option<NaiveDate>,
}

/// Union produced by the ingestion row coercer; ownership passes to the
/// ledger, which assigns an id on acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DraftRecord {
    Income(IncomeDraft),
    Expense(ExpenseDraft),
}

impl DraftRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            DraftRecord::Income(_) => RecordKind::Income,
            DraftRecord::Expense(_) => RecordKind::Expense,
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        match self {
            DraftRecord::Income(d) => d.validate(),
            DraftRecord::Expense(d) => d.validate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    pub description: String,
    pub category: String,
    pub value: Money,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub category: String,
    pub value: Money,
    pub due_date: NaiveDate,
    pub paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub installment_current: Option<i64>,
    pub installment_total: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub description: String,
    pub target: Money,
    pub saved: Money,
    pub completed: bool,
    pub deadline: Option<NaiveDate>,
}

impl Goal {
    /// Progress towards the target, 0–100.
    pub fn progress_pct(&self) -> f64 {
        if !self.target.is_positive() {
            return 0.0;
        }
        self.saved.to_cents() as f64 / self.target.to_cents() as f64 * 100.0
    }
}
