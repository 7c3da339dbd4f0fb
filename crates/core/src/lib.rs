// crates/core/src/lib.rs
//! Domain logic for the Anki bridge: hint derivation, audio assets and the
//! clients for the external flashcard and speech services.

pub mod anki;
pub mod audio;
pub mod hint;
pub mod ipa;
pub mod paths;
pub mod tts;
pub mod types;

pub use audio::{build_filename, AudioAsset, AudioError};
pub use hint::{derive_hint, HintError, HintSentence};
pub use ipa::ipa_keyword;
pub use types::*;
