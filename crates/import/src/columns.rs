use serde::{Deserialize, Serialize};

use finbot_core::{normalize, RecordKind};

use crate::grid::Grid;

/// Canonical cell roles a mapped column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Description,
    Category,
    Value,
    Date,
    Paid,
    Notes,
    InstallmentCurrent,
    InstallmentTotal,
}

/// Ordered alias table: for each role, the header spellings accepted for it.
/// First alias that matches a header, in table order, wins.
type AliasTable = &'static [(ColumnRole, &'static [&'static str])];

const EXPENSE_ALIASES: AliasTable = &[
    (
        ColumnRole::Description,
        &["descricao", "nome", "titulo", "item", "despesa"],
    ),
    (ColumnRole::Category, &["categoria", "tipo", "group", "grupo"]),
    (
        ColumnRole::Value,
        &["valor", "value", "preco", "total", "montante", "quantia"],
    ),
    (
        ColumnRole::Date,
        &["data", "date", "vencimento", "datavencimento", "datadespesa"],
    ),
    (
        ColumnRole::Paid,
        &["pago", "paid", "status", "situacao", "quitado"],
    ),
    (
        ColumnRole::Notes,
        &["observacoes", "obs", "notas", "notes", "comentario"],
    ),
    (
        ColumnRole::InstallmentCurrent,
        &["parcelaatual", "parcela", "parcelas", "numparcela"],
    ),
    (
        ColumnRole::InstallmentTotal,
        &["parcelatotal", "totalparcelas", "numparcelas"],
    ),
];

const INCOME_ALIASES: AliasTable = &[
    (
        ColumnRole::Description,
        &["descricao", "nome", "titulo", "item", "receita"],
    ),
    (
        ColumnRole::Category,
        &["categoria", "tipo", "group", "grupo", "fonte"],
    ),
    (
        ColumnRole::Value,
        &["valor", "value", "preco", "total", "montante", "quantia"],
    ),
    (
        ColumnRole::Date,
        &["data", "date", "datarecebimento", "datarecebida"],
    ),
    (
        ColumnRole::Notes,
        &["observacoes", "obs", "notas", "notes", "comentario"],
    ),
];

pub fn alias_table(kind: RecordKind) -> AliasTable {
    match kind {
        RecordKind::Income => INCOME_ALIASES,
        RecordKind::Expense => EXPENSE_ALIASES,
    }
}

/// Lowercased alphanumerics only, diacritics stripped. "Data_Vencimento" and
/// "Data Vencimento" both reduce to "datavencimento".
pub fn normalize_header(header: &str) -> String {
    normalize(header)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Resolved column indices for one section or upload, one slot per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub description: Option<usize>,
    pub category: Option<usize>,
    pub value: Option<usize>,
    pub date: Option<usize>,
    pub paid: Option<usize>,
    pub notes: Option<usize>,
    pub installment_current: Option<usize>,
    pub installment_total: Option<usize>,
}

impl ColumnMap {
    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Description => &mut self.description,
            ColumnRole::Category => &mut self.category,
            ColumnRole::Value => &mut self.value,
            ColumnRole::Date => &mut self.date,
            ColumnRole::Paid => &mut self.paid,
            ColumnRole::Notes => &mut self.notes,
            ColumnRole::InstallmentCurrent => &mut self.installment_current,
            ColumnRole::InstallmentTotal => &mut self.installment_total,
        }
    }

    /// Sections without both of these are skipped wholesale.
    pub fn has_required(&self) -> bool {
        self.description.is_some() && self.value.is_some()
    }
}

/// Matches one header row against the alias table for `kind`. Each role
/// takes the first header equal to one of its aliases after normalization;
/// unmatched roles stay unmapped.
pub fn map_columns(grid: &Grid, header_row: usize, kind: RecordKind) -> ColumnMap {
    let headers: Vec<String> = grid
        .rows
        .get(header_row)
        .map(|cells| cells.iter().map(|c| normalize_header(&c.as_text())).collect())
        .unwrap_or_default();

    let mut map = ColumnMap::default();
    for &(role, aliases) in alias_table(kind) {
        let found = aliases.iter().find_map(|alias| {
            headers
                .iter()
                .position(|h| !h.is_empty() && h == alias)
        });
        if let Some(col) = found {
            *map.slot(role) = Some(col);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn header_grid(captions: &[&str]) -> Grid {
        Grid::from_rows(vec![captions
            .iter()
            .map(|s| Cell::Text(s.to_string()))
            .collect()])
    }

    #[test]
    fn normalization_strips_accents_and_separators() {
        assert_eq!(normalize_header("Descrição"), "descricao");
        assert_eq!(normalize_header("Data_Vencimento"), "datavencimento");
        assert_eq!(normalize_header("  Valor (R$)  "), "valorr");
    }

    #[test]
    fn maps_typical_expense_sheet() {
        let grid = header_grid(&["Descrição", "Categoria", "Valor", "Vencimento", "Obs"]);
        let map = map_columns(&grid, 0, RecordKind::Expense);
        assert_eq!(map.description, Some(0));
        assert_eq!(map.category, Some(1));
        assert_eq!(map.value, Some(2));
        assert_eq!(map.date, Some(3));
        assert_eq!(map.notes, Some(4));
        assert!(map.has_required());
    }

    #[test]
    fn alias_order_decides_ties() {
        // Both "data" and "vencimento" are date aliases; "data" comes first
        // in the table, so its column wins.
        let grid = header_grid(&["Descrição", "Valor", "Vencimento", "Data"]);
        let map = map_columns(&grid, 0, RecordKind::Expense);
        assert_eq!(map.date, Some(3));
    }

    #[test]
    fn unmatched_roles_stay_unmapped() {
        let grid = header_grid(&["Descrição", "Valor"]);
        let map = map_columns(&grid, 0, RecordKind::Expense);
        assert_eq!(map.paid, None);
        assert_eq!(map.installment_current, None);
        assert!(map.has_required());
    }

    #[test]
    fn missing_value_column_fails_required_check() {
        let grid = header_grid(&["Descrição", "Categoria"]);
        let map = map_columns(&grid, 0, RecordKind::Expense);
        assert!(!map.has_required());
    }

    #[test]
    fn income_table_accepts_fonte_as_category() {
        let grid = header_grid(&["Receita", "Fonte", "Valor"]);
        let map = map_columns(&grid, 0, RecordKind::Income);
        assert_eq!(map.description, Some(0));
        assert_eq!(map.category, Some(1));
        assert_eq!(map.value, Some(2));
    }

    #[test]
    fn parcelas_caption_maps_to_installment_current() {
        let grid = header_grid(&["Descrição", "Valor", "Parcelas"]);
        let map = map_columns(&grid, 0, RecordKind::Expense);
        assert_eq!(map.installment_current, Some(2));
        assert_eq!(map.installment_total, None);
    }
}
