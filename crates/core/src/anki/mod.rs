// crates/core/src/anki/mod.rs
//! Anki integration.
//!
//! Provides the `NoteService` trait and an AnkiConnect implementation used to
//! look up and update flashcard notes.

pub mod client;
pub mod service;
pub mod types;

pub use client::AnkiConnectClient;
pub use service::NoteService;
pub use types::{AnkiError, NoteField, NoteInfo};
