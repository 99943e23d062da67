pub mod category;
pub mod ledger;
pub mod money;
pub mod record;
pub mod text;

pub use category::{
    default_date, fallback_category, guess_category, resolve_sheet_category, RecordKind,
    EXPENSE_CATEGORIES, EXPENSE_KEYWORDS, INCOME_CATEGORIES, INCOME_KEYWORDS, SHEET_CATEGORIES,
};
pub use ledger::{Ledger, LedgerError};
pub use money::Money;
pub use record::{
    DraftError, DraftRecord, Expense, ExpenseDraft, Goal, GoalDraft, Income, IncomeDraft,
};
pub use text::{capitalize_first, normalize};
