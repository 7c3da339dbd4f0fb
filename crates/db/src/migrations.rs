/// Inline SQL migrations for the anki-bridge schema.
///
/// One statement per entry; entries are append-only.
///
/// Timestamps are milliseconds since the Unix epoch.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: words table
    r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL,
    ipa TEXT,
    translation TEXT,
    theme TEXT,
    example_sentence TEXT,
    example_translation TEXT,
    anki_note_id INTEGER,
    hint_sentence TEXT,
    hint_translation TEXT,
    hint_updated_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    // Migration 2: note lookup index
    r#"
CREATE INDEX IF NOT EXISTS idx_words_anki_note ON words(anki_note_id);
"#,
    // Migrations 3-4: hint audio association
    r#"ALTER TABLE words ADD COLUMN hint_audio_file TEXT;"#,
    r#"ALTER TABLE words ADD COLUMN hint_audio_at INTEGER;"#,
];
