use serde::{Deserialize, Serialize};
use thiserror::Error;

use finbot_core::{
    default_date, resolve_sheet_category, DraftRecord, ExpenseDraft, IncomeDraft, Ledger,
    LedgerError, RecordKind,
};

use crate::coerce::{
    coerce_bool, coerce_date, coerce_installments, coerce_notes, coerce_row, coerce_value,
    RowError,
};
use crate::columns::{map_columns, ColumnMap};
use crate::grid::{Cell, Grid};
use crate::section::detect_sections;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(
        "não encontrei cabeçalhos na planilha; ela precisa de colunas como Descrição, Categoria, Valor e Data"
    )]
    NoHeaders,
    #[error("coluna de valor não encontrada na planilha")]
    MissingValueColumn,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Aggregate result of one ingestion run. Row errors never abort the batch;
/// they ride along next to the acceptance counts.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub income_count: usize,
    pub expense_count: usize,
    pub row_errors: Vec<RowError>,
}

impl ImportOutcome {
    /// Chat-facing Portuguese summary of the run.
    pub fn summary_reply(&self) -> String {
        let mut lines = vec!["📎 **Importação concluída!**\n".to_string()];
        if self.income_count > 0 {
            lines.push(format!(
                "💰 **{}** receita(s) importada(s)",
                self.income_count
            ));
        }
        if self.expense_count > 0 {
            lines.push(format!(
                "💸 **{}** despesa(s) importada(s)",
                self.expense_count
            ));
        }
        if self.income_count == 0 && self.expense_count == 0 {
            lines.push("⚠️ Nenhum registro encontrado na planilha.".to_string());
        }
        if !self.row_errors.is_empty() {
            lines.push(format!(
                "\n⚠️ {} erro(s) durante a importação.",
                self.row_errors.len()
            ));
        }
        lines.join("\n")
    }

    async fn accept<L: Ledger>(&mut self, draft: DraftRecord, ledger: &L) -> Result<(), LedgerError> {
        match draft {
            DraftRecord::Income(d) => {
                ledger.add_income(d).await?;
                self.income_count += 1;
            }
            DraftRecord::Expense(d) => {
                ledger.add_expense(d).await?;
                self.expense_count += 1;
            }
        }
        Ok(())
    }
}

/// Sectioned import: the sheet partitions itself via header rows and kind
/// captions. Sections lacking a description or value column are skipped
/// wholesale; individual bad rows become numbered errors.
pub async fn import_grid<L: Ledger>(grid: &Grid, ledger: &L) -> Result<ImportOutcome, ImportError> {
    let sections = detect_sections(grid);
    if sections.is_empty() {
        return Err(ImportError::NoHeaders);
    }

    let mut outcome = ImportOutcome::default();
    for section in sections {
        let map = map_columns(grid, section.header_row, section.kind);
        if !map.has_required() {
            continue;
        }
        for row in section.data_rows.clone() {
            if row >= grid.len() {
                break;
            }
            match coerce_row(section.kind, grid, row, &map) {
                Ok(Some(draft)) => outcome.accept(draft, ledger).await?,
                Ok(None) => {}
                Err(e) => outcome.row_errors.push(e),
            }
        }
    }
    Ok(outcome)
}

/// Declared-kind import: the caller says whether the sheet holds incomes or
/// expenses, row 0 is the header, every following row is data. Rows without
/// a description get a numbered placeholder instead of being skipped.
pub async fn import_declared<L: Ledger>(
    grid: &Grid,
    kind: RecordKind,
    ledger: &L,
) -> Result<ImportOutcome, ImportError> {
    let map = map_columns(grid, 0, kind);
    if map.value.is_none() {
        return Err(ImportError::MissingValueColumn);
    }

    let mut outcome = ImportOutcome::default();
    for row in 1..grid.len() {
        match coerce_declared_row(kind, grid, row, &map) {
            Ok(draft) => outcome.accept(draft, ledger).await?,
            Err(e) => outcome.row_errors.push(e),
        }
    }
    Ok(outcome)
}

fn coerce_declared_row(
    kind: RecordKind,
    grid: &Grid,
    row: usize,
    map: &ColumnMap,
) -> Result<DraftRecord, RowError> {
    let row_number = row + 1;
    let reject = |message: &str| RowError {
        row: row_number,
        message: message.to_string(),
    };

    let cell = |col: Option<usize>| col.map_or(&crate::grid::EMPTY_CELL, |c| grid.cell(row, c));

    let value = match coerce_value(cell(map.value)) {
        Some(v) if v.is_positive() => v,
        _ => return Err(reject("valor inválido")),
    };

    let mut description = cell(map.description).as_text().trim().to_string();
    if description.is_empty() || description.eq_ignore_ascii_case("nan") {
        description = format!("Importado #{row}");
    }

    let category = resolve_sheet_category(kind, &cell(map.category).as_text()).to_string();
    let date = coerce_date(cell(map.date)).unwrap_or_else(default_date);
    let notes = coerce_notes(cell(map.notes));

    let draft = match kind {
        RecordKind::Income => DraftRecord::Income(IncomeDraft {
            description,
            category,
            value,
            date,
            notes,
        }),
        RecordKind::Expense => {
            let paid = coerce_bool(cell(map.paid));
            let (current, pair_total) = coerce_installments(cell(map.installment_current));
            let total = match cell(map.installment_total) {
                Cell::Empty => pair_total,
                c => coerce_installments(c).0.or(pair_total),
            };
            DraftRecord::Expense(ExpenseDraft {
                description,
                category,
                value,
                due_date: date,
                paid,
                paid_date: paid.then_some(date),
                installment_current: current,
                installment_total: total,
                notes,
            })
        }
    };

    draft.validate().map_err(|e| reject(&e.to_string()))?;
    Ok(draft)
}
