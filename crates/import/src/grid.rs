use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use thiserror::Error;

/// Shared fallback for out-of-range access; `Cell` carries owned strings, so
/// a borrowed `Cell::Empty` must live somewhere with a static lifetime.
pub(crate) static EMPTY_CELL: Cell = Cell::Empty;

/// One spreadsheet cell, already shed of format-specific detail.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual rendering used by header matching and free-text scans.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

/// A decoded worksheet: rows of typed cells, possibly ragged.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Grid { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Non-empty cells of a row joined into one lowercased string, the probe
    /// used by the section detector.
    pub fn row_text(&self, row: usize) -> String {
        let Some(cells) = self.rows.get(row) else {
            return String::new();
        };
        cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.as_text().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("formato não suportado: {0} (use .xlsx, .xls ou .csv)")]
    UnsupportedFormat(String),
    #[error("erro ao ler CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("erro ao ler planilha: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("a planilha está vazia")]
    EmptySheet,
}

/// Turns an uploaded buffer into a [`Grid`]. The extension decides the
/// decoder; this is the only fatal failure point of an import.
pub fn decode(bytes: &[u8], filename: &str) -> Result<Grid, DecodeError> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".csv") {
        decode_csv(bytes)
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        decode_workbook(bytes)
    } else {
        Err(DecodeError::UnsupportedFormat(filename.to_string()))
    }
}

fn decode_csv(bytes: &[u8]) -> Result<Grid, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = record
            .iter()
            .map(|field| {
                let field = field.trim();
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }
    if rows.is_empty() {
        return Err(DecodeError::EmptySheet);
    }
    Ok(Grid::from_rows(rows))
}

fn decode_workbook(bytes: &[u8]) -> Result<Grid, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::EmptySheet)?;
    let range = workbook.worksheet_range(&first_sheet)?;

    let rows: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    if rows.is_empty() {
        return Err(DecodeError::EmptySheet);
    }
    Ok(Grid::from_rows(rows))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.trim().to_string())
            }
        }
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Date(naive.date()),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => match s[..10.min(s.len())].parse::<NaiveDate>() {
            Ok(date) => Cell::Date(date),
            Err(_) => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trip() {
        let bytes = b"Descricao,Valor\nAluguel,1200\n";
        let grid = decode(bytes, "contas.csv").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell(1, 0), &Cell::Text("Aluguel".to_string()));
        assert_eq!(grid.cell(1, 1), &Cell::Text("1200".to_string()));
    }

    #[test]
    fn csv_ragged_rows_are_tolerated() {
        let bytes = b"a,b,c\nonly-one\n";
        let grid = decode(bytes, "x.csv").unwrap();
        assert_eq!(grid.rows[0].len(), 3);
        assert_eq!(grid.rows[1].len(), 1);
        // Out-of-range access degrades to Empty.
        assert_eq!(grid.cell(1, 2), &Cell::Empty);
    }

    #[test]
    fn unknown_extension_is_fatal() {
        let err = decode(b"...", "notas.pdf").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(_)));
    }

    #[test]
    fn empty_csv_is_fatal() {
        let err = decode(b"", "vazio.csv").unwrap_err();
        assert!(matches!(err, DecodeError::EmptySheet));
    }

    #[test]
    fn row_text_joins_non_empty_cells() {
        let grid = Grid::from_rows(vec![vec![
            Cell::Text("DESPESAS".to_string()),
            Cell::Empty,
            Cell::Number(2024.0),
        ]]);
        assert_eq!(grid.row_text(0), "despesas 2024");
    }
}
