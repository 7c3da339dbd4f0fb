// crates/core/src/hint.rs
//! Hint sentence derivation.
//!
//! A hint is the word's example sentence plus its translation. The plain
//! sentence is what gets stored on the row (and later spoken by the voice
//! job); [`HintSentence::render_field`] produces the HTML written into the
//! Anki note, with the word highlighted and the IPA keyword appended.

use std::collections::BTreeMap;

use regex_lite::Regex;
use thiserror::Error;

use crate::ipa::ipa_keyword;
use crate::types::HintSyncItem;

/// Errors that make a word unusable as a hint source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintError {
    #[error("word {word_id} has no example sentence")]
    MissingSentence { word_id: i64 },

    #[error("word {word_id} has no example translation")]
    MissingTranslation { word_id: i64 },
}

/// Sentence/translation pair derived for one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSentence {
    pub sentence: String,
    pub translation: String,
    pub keyword: Option<&'static str>,
    word: String,
}

impl HintSentence {
    /// HTML for the note's hint field: word in bold, keyword in brackets.
    pub fn render_field(&self) -> String {
        let highlighted = highlight_word(&self.sentence, &self.word);
        match self.keyword {
            Some(keyword) => format!("{highlighted} [{keyword}]"),
            None => highlighted,
        }
    }

    /// Note fields to write, keyed by field name.
    pub fn note_fields(&self, hint_field: &str, translation_field: &str) -> BTreeMap<String, String> {
        BTreeMap::from([
            (hint_field.to_string(), self.render_field()),
            (translation_field.to_string(), self.translation.clone()),
        ])
    }
}

/// Derive the hint for a word from its example sentence, translation and IPA.
pub fn derive_hint(item: &HintSyncItem) -> Result<HintSentence, HintError> {
    let sentence = non_empty(item.example_sentence.as_deref())
        .ok_or(HintError::MissingSentence { word_id: item.id })?;
    let translation = non_empty(item.example_translation.as_deref())
        .ok_or(HintError::MissingTranslation { word_id: item.id })?;

    Ok(HintSentence {
        sentence: sentence.to_string(),
        translation: translation.to_string(),
        keyword: item.ipa.as_deref().and_then(ipa_keyword),
        word: item.word.trim().to_string(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Wrap the first case-insensitive occurrence of `word` in `<b>` tags.
fn highlight_word(sentence: &str, word: &str) -> String {
    if word.is_empty() {
        return sentence.to_string();
    }
    let Ok(re) = Regex::new(&format!("(?i){}", regex_lite::escape(word))) else {
        return sentence.to_string();
    };
    match re.find(sentence) {
        Some(m) => format!(
            "{}<b>{}</b>{}",
            &sentence[..m.start()],
            m.as_str(),
            &sentence[m.end()..]
        ),
        None => sentence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(sentence: Option<&str>, translation: Option<&str>, ipa: Option<&str>) -> HintSyncItem {
        HintSyncItem {
            id: 3,
            word: "Apple".into(),
            ipa: ipa.map(String::from),
            example_sentence: sentence.map(String::from),
            example_translation: translation.map(String::from),
            anki_note_id: 99,
        }
    }

    #[test]
    fn test_derive_hint_with_keyword() {
        let hint = derive_hint(&item(
            Some("  I ate an apple today. "),
            Some("Ich habe heute einen Apfel gegessen."),
            Some("/ˈæp.əl/"),
        ))
        .unwrap();

        assert_eq!(hint.sentence, "I ate an apple today.");
        assert_eq!(hint.keyword, Some("trap"));
        assert_eq!(hint.render_field(), "I ate an <b>apple</b> today. [trap]");
    }

    #[test]
    fn test_derive_hint_without_ipa() {
        let hint = derive_hint(&item(Some("Apples are red."), Some("Äpfel sind rot."), None)).unwrap();
        assert_eq!(hint.keyword, None);
        assert_eq!(hint.render_field(), "<b>Apple</b>s are red.");
    }

    #[test]
    fn test_missing_sentence_or_translation() {
        assert_eq!(
            derive_hint(&item(Some("   "), Some("x"), None)),
            Err(HintError::MissingSentence { word_id: 3 })
        );
        assert_eq!(
            derive_hint(&item(Some("An apple."), None, None)),
            Err(HintError::MissingTranslation { word_id: 3 })
        );
    }

    #[test]
    fn test_word_not_in_sentence_left_plain() {
        assert_eq!(highlight_word("Pears are green.", "apple"), "Pears are green.");
    }

    #[test]
    fn test_regex_metacharacters_escaped() {
        assert_eq!(highlight_word("What is c++ for?", "c++"), "What is <b>c++</b> for?");
    }

    #[test]
    fn test_note_fields() {
        let hint = derive_hint(&item(Some("An apple."), Some("Ein Apfel."), None)).unwrap();
        let fields = hint.note_fields("Hint", "HintTranslation");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["Hint"], "An <b>apple</b>.");
        assert_eq!(fields["HintTranslation"], "Ein Apfel.");
    }
}
