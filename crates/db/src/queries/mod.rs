// crates/db/src/queries/mod.rs
// Word queries for the anki-bridge SQLite database.

pub(crate) mod row_types;
pub mod words;
