//! SQLite persistence for the chat ledger.

pub mod db;

pub use db::{create_db, create_memory_db, DbPool, SqliteLedger};
