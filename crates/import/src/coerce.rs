use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use finbot_core::{
    default_date, normalize, resolve_sheet_category, DraftRecord, ExpenseDraft, IncomeDraft,
    Money, RecordKind,
};

use crate::columns::ColumnMap;
use crate::grid::{Cell, Grid};

/// Date spellings accepted from sheet cells, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%d.%m.%Y"];

/// Tokens that read as "paid" in a status cell.
const TRUTHY: &[&str] = &["true", "1", "sim", "yes", "s", "pago", "quitado", "x"];

static INSTALLMENT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").unwrap());

/// One rejected row, tagged with its 1-based sheet row number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Linha {}: {}", self.row, self.message)
    }
}

pub fn coerce_value(cell: &Cell) -> Option<Money> {
    match cell {
        Cell::Number(n) => Money::from_f64(*n),
        Cell::Text(s) => Money::parse_br(s),
        _ => None,
    }
}

pub fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        }
        _ => None,
    }
}

pub fn coerce_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Text(s) => TRUTHY.contains(&s.trim().to_lowercase().as_str()),
        Cell::Number(n) => *n == 1.0,
        _ => false,
    }
}

/// Installment cell: `"2/12"` fills both halves, a bare integer fills only
/// the current half. Anything else is no installment plan, never an error.
pub fn coerce_installments(cell: &Cell) -> (Option<i64>, Option<i64>) {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 && *n > 0.0 => (Some(*n as i64), None),
        Cell::Text(s) => {
            if let Some(c) = INSTALLMENT_PAIR.captures(s) {
                let current = c[1].parse().ok();
                let total = c[2].parse().ok();
                return (current, total);
            }
            (s.trim().parse::<i64>().ok().filter(|n| *n > 0), None)
        }
        _ => (None, None),
    }
}

/// Free-text notes; placeholder artifacts from sheet exports are dropped.
pub fn coerce_notes(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(s.to_string())
            }
        }
        _ => None,
    }
}

fn cell_at<'g>(grid: &'g Grid, row: usize, col: Option<usize>) -> &'g Cell {
    col.map_or(&crate::grid::EMPTY_CELL, |c| grid.cell(row, c))
}

/// Coerces one data row into a draft record. A blank description skips the
/// row silently; a bad value or a failed draft validation rejects it with a
/// numbered error. `row` is the 0-based grid index; errors report `row + 1`.
pub fn coerce_row(
    kind: RecordKind,
    grid: &Grid,
    row: usize,
    map: &ColumnMap,
) -> Result<Option<DraftRecord>, RowError> {
    let row_number = row + 1;
    let reject = |message: &str| RowError {
        row: row_number,
        message: message.to_string(),
    };

    let description_cell = cell_at(grid, row, map.description);
    if description_cell.is_empty() {
        return Ok(None);
    }
    let description = description_cell.as_text().trim().to_string();

    let value = match coerce_value(cell_at(grid, row, map.value)) {
        Some(v) if v.is_positive() => v,
        _ => return Err(reject("valor inválido")),
    };

    let raw_category = cell_at(grid, row, map.category).as_text();
    let category = resolve_sheet_category(kind, &raw_category).to_string();

    let date = coerce_date(cell_at(grid, row, map.date)).unwrap_or_else(default_date);

    let notes = coerce_notes(cell_at(grid, row, map.notes));

    let draft = match kind {
        RecordKind::Income => DraftRecord::Income(IncomeDraft {
            description,
            category,
            value,
            date,
            notes,
        }),
        RecordKind::Expense => {
            // A notes cell mentioning "pago" marks the expense paid even
            // without a status column.
            let paid = coerce_bool(cell_at(grid, row, map.paid))
                || notes
                    .as_deref()
                    .is_some_and(|n| normalize(n).contains("pago"));

            let (current, pair_total) = coerce_installments(cell_at(grid, row, map.installment_current));
            let explicit_total = match cell_at(grid, row, map.installment_total) {
                Cell::Empty => None,
                cell => coerce_installments(cell).0,
            };

            DraftRecord::Expense(ExpenseDraft {
                description,
                category,
                value,
                due_date: date,
                paid,
                paid_date: paid.then_some(date),
                installment_current: current,
                installment_total: explicit_total.or(pair_total),
                notes,
            })
        }
    };

    draft
        .validate()
        .map_err(|e| reject(&e.to_string()))?;
    Ok(Some(draft))
}
