use finbot_core::RecordKind;

use crate::grid::Grid;

/// How many rows above a header row are probed for a section caption.
const KIND_SCAN_WINDOW: usize = 4;

/// One detected sheet section: a header row followed by a run of data rows.
/// `data_rows` is half-open; the row right before the next header is a
/// separator and is never parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: RecordKind,
    pub header_row: usize,
    pub data_rows: std::ops::Range<usize>,
}

/// A row is a header when its joined text carries a description caption and
/// either a value caption or a currency marker.
pub fn is_header_row(grid: &Grid, row: usize) -> bool {
    let text = grid.row_text(row);
    text.contains("descri") && (text.contains("valor") || text.contains("r$"))
}

/// Classifies the section a header opens by scanning up to four rows above
/// it for a kind caption like "DESPESAS" or "RECEITAS". Unlabeled sections
/// default to expenses.
fn section_kind(grid: &Grid, header_row: usize) -> RecordKind {
    for offset in 1..=KIND_SCAN_WINDOW {
        let Some(row) = header_row.checked_sub(offset) else {
            break;
        };
        let text = grid.row_text(row);
        if text.contains("receita") {
            return RecordKind::Income;
        }
        if text.contains("despesa") {
            return RecordKind::Expense;
        }
    }
    RecordKind::Expense
}

/// Scans the whole grid and partitions it into stacked sections. Ranges
/// never overlap; the last section runs to the end of the sheet.
pub fn detect_sections(grid: &Grid) -> Vec<Section> {
    let header_rows: Vec<usize> = (0..grid.len())
        .filter(|&row| is_header_row(grid, row))
        .collect();

    header_rows
        .iter()
        .enumerate()
        .map(|(i, &header_row)| {
            let end = match header_rows.get(i + 1) {
                Some(&next_header) => next_header.saturating_sub(1),
                None => grid.len(),
            };
            Section {
                kind: section_kind(grid, header_row),
                header_row,
                data_rows: (header_row + 1)..end.max(header_row + 1),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|s| {
                if s.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.to_string())
                }
            })
            .collect()
    }

    fn two_section_sheet() -> Grid {
        Grid::from_rows(vec![
            text_row(&["DESPESAS", "", ""]),           // 0
            text_row(&["Descrição", "Valor", "Data"]), // 1 header
            text_row(&["Aluguel", "1200", "10/03"]),   // 2
            text_row(&["Luz", "150", "15/03"]),        // 3
            text_row(&["", "", ""]),                   // 4 separator
            text_row(&["RECEITAS", "", ""]),           // 5
            text_row(&["Descrição", "Valor", "Data"]), // 6 header
            text_row(&["Salário", "3500", "05/03"]),   // 7
        ])
    }

    #[test]
    fn partitions_into_two_sections() {
        let sections = detect_sections(&two_section_sheet());
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].kind, RecordKind::Expense);
        assert_eq!(sections[0].header_row, 1);
        assert_eq!(sections[0].data_rows, 2..5);

        assert_eq!(sections[1].kind, RecordKind::Income);
        assert_eq!(sections[1].header_row, 6);
        assert_eq!(sections[1].data_rows, 7..8);
    }

    #[test]
    fn separator_row_excluded_from_first_section() {
        let sections = detect_sections(&two_section_sheet());
        // Row 5 carries "RECEITAS" and sits right before the next header; the
        // first section must stop short of it.
        assert!(!sections[0].data_rows.contains(&5));
    }

    #[test]
    fn unlabeled_section_defaults_to_expense() {
        let grid = Grid::from_rows(vec![
            text_row(&["Descrição", "Valor"]),
            text_row(&["Mercado", "350"]),
        ]);
        let sections = detect_sections(&grid);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, RecordKind::Expense);
        assert_eq!(sections[0].data_rows, 1..2);
    }

    #[test]
    fn currency_marker_counts_as_value_caption() {
        let grid = Grid::from_rows(vec![text_row(&["Descrição", "R$"])]);
        assert!(is_header_row(&grid, 0));
    }

    #[test]
    fn kind_caption_outside_window_is_ignored() {
        let grid = Grid::from_rows(vec![
            text_row(&["RECEITAS"]),
            text_row(&[""]),
            text_row(&[""]),
            text_row(&[""]),
            text_row(&[""]),
            text_row(&["Descrição", "Valor"]),
            text_row(&["Mercado", "350"]),
        ]);
        let sections = detect_sections(&grid);
        assert_eq!(sections[0].kind, RecordKind::Expense);
    }

    #[test]
    fn no_headers_means_no_sections() {
        let grid = Grid::from_rows(vec![text_row(&["apenas", "texto"])]);
        assert!(detect_sections(&grid).is_empty());
    }
}
