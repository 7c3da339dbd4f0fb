// crates/core/src/ipa.rs
//! IPA → vowel keyword lookup.
//!
//! Maps the vowel of the stressed syllable to a Wells lexical-set keyword
//! ("fleece", "trap", "goat", ...). The keyword is appended to hint
//! sentences so learners can anchor the sound to a word they already know.

/// Vowel symbols and their lexical-set keywords.
///
/// Ordered longest symbol first so diphthongs and long vowels win over the
/// single-character vowels they start with.
const VOWEL_KEYWORDS: &[(&str, &str)] = &[
    ("aɪ", "price"),
    ("aʊ", "mouth"),
    ("eɪ", "face"),
    ("oʊ", "goat"),
    ("əʊ", "goat"),
    ("ɔɪ", "choice"),
    ("ɪə", "near"),
    ("eə", "square"),
    ("ɛə", "square"),
    ("ʊə", "cure"),
    ("iː", "fleece"),
    ("uː", "goose"),
    ("ɑː", "palm"),
    ("ɔː", "thought"),
    ("ɜː", "nurse"),
    ("ɝ", "nurse"),
    ("æ", "trap"),
    ("ɪ", "kit"),
    ("ʊ", "foot"),
    ("ʌ", "strut"),
    ("ɒ", "lot"),
    ("ɛ", "dress"),
    ("e", "dress"),
    ("ə", "comma"),
    ("ɚ", "letter"),
    ("i", "happy"),
    ("u", "goose"),
    ("ɑ", "palm"),
    ("ɔ", "thought"),
    ("o", "goat"),
    ("a", "bath"),
];

const PRIMARY_STRESS: char = 'ˈ';

/// Look up the keyword for the stressed vowel of an IPA transcription.
///
/// Accepts `/ˈæp.əl/`, `[ˈæpəl]` or bare `æpəl`. Without a primary stress
/// mark the first vowel is used. Returns `None` when no known vowel occurs.
pub fn ipa_keyword(ipa: &str) -> Option<&'static str> {
    let trimmed = ipa
        .trim()
        .trim_matches(|c: char| c == '/' || c == '[' || c == ']');
    if trimmed.is_empty() {
        return None;
    }

    let stressed = match trimmed.find(PRIMARY_STRESS) {
        Some(pos) => &trimmed[pos + PRIMARY_STRESS.len_utf8()..],
        None => trimmed,
    };

    stressed
        .char_indices()
        .find_map(|(i, _)| match_vowel(&stressed[i..]))
}

fn match_vowel(rest: &str) -> Option<&'static str> {
    VOWEL_KEYWORDS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .map(|(_, keyword)| *keyword)
}
