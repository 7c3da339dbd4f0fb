// crates/core/src/types.rs
//! Work items handed from the row store to the job processors.

use serde::{Deserialize, Serialize};

/// A word linked to an Anki note that still needs its hint sentence pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintSyncItem {
    pub id: i64,
    pub word: String,
    pub ipa: Option<String>,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    pub anki_note_id: i64,
}

/// A word whose hint sentence has no (or only stale) audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceItem {
    pub id: i64,
    pub word: String,
    pub hint_sentence: String,
    /// Milliseconds since the epoch when the hint sentence was last written.
    pub hint_updated_at: Option<i64>,
}

/// Result of pushing a hint to a single note, returned by the synchronous
/// single-note endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedNote {
    pub note_id: i64,
    pub word_id: i64,
    pub word: String,
    pub hint_sentence: String,
    pub hint_translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synced_note_serialize_camel_case() {
        let note = SyncedNote {
            note_id: 1700000000001,
            word_id: 7,
            word: "apple".into(),
            hint_sentence: "I ate an apple.".into(),
            hint_translation: "Ich aß einen Apfel.".into(),
            keyword: None,
        };
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"noteId\":1700000000001"));
        assert!(json.contains("\"wordId\":7"));
        assert!(json.contains("\"hintTranslation\""));
        assert!(!json.contains("keyword"));
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(now_millis() > 1_704_067_200_000);
    }
}
