//! Centralized path functions for all app storage locations.

use std::path::PathBuf;

/// App data root: `~/Library/Application Support/anki-bridge/` (macOS) or
/// `~/.local/share/anki-bridge/` (Linux).
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("anki-bridge"))
}

/// SQLite database file: `<app_data_dir>/anki-bridge.db`.
pub fn db_path() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("anki-bridge.db"))
}

/// Generated hint audio: `<app_data_dir>/audio/`.
pub fn audio_dir() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("audio"))
}
