//! Heuristic spreadsheet ingestion: grid decoding, section detection,
//! column-role mapping and row coercion into draft records.

pub mod coerce;
pub mod columns;
pub mod grid;
pub mod ingest;
pub mod section;

pub use coerce::{coerce_row, RowError};
pub use columns::{map_columns, ColumnMap, ColumnRole};
pub use grid::{decode, Cell, DecodeError, Grid};
pub use ingest::{import_declared, import_grid, ImportError, ImportOutcome};
pub use section::{detect_sections, Section};
