// crates/server/src/routes/audio.rs
//! Audio lookup route.
//!
//! - GET /audio/latest?wordId= - Newest generated hint audio for a word

use std::sync::Arc;

use anki_bridge_core::audio::latest_for_word;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string for GET /api/audio/latest.
///
/// `wordId` stays text here; [`parse_word_id`] validates it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestAudioQuery {
    pub word_id: Option<String>,
}

/// Response for GET /api/audio/latest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestAudioResponse {
    pub ok: bool,
    pub filename: Option<String>,
    pub public_path: Option<String>,
}

/// GET /api/audio/latest - `filename` and `publicPath` are null when the
/// word has no audio yet.
async fn latest_audio(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LatestAudioQuery>,
) -> ApiResult<Json<LatestAudioResponse>> {
    let word_id = query
        .word_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("wordId is required".into()))?;
    let word_id = parse_word_id(word_id)?;

    let filename = latest_for_word(&state.audio_dir, word_id)
        .await?
        .map(|asset| asset.filename());
    let public_path = filename.as_deref().map(|f| state.public_audio_path(f));

    Ok(Json(LatestAudioResponse {
        ok: true,
        filename,
        public_path,
    }))
}

fn parse_word_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(format!(
            "wordId must be a positive integer, got {raw:?}"
        ))),
    }
}

/// Create the audio routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/audio/latest", get(latest_audio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_id() {
        assert_eq!(parse_word_id("5").unwrap(), 5);
        assert_eq!(parse_word_id(" 42 ").unwrap(), 42);
        assert!(parse_word_id("0").is_err());
        assert!(parse_word_id("-3").is_err());
        assert!(parse_word_id("abc").is_err());
        assert!(parse_word_id("").is_err());
    }

    #[test]
    fn test_query_parsing() {
        let uri: axum::http::Uri = "/api/audio/latest?wordId=7&cache=1".parse().unwrap();
        let Query(query) = Query::<LatestAudioQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.word_id.as_deref(), Some("7"));

        let uri: axum::http::Uri = "/api/audio/latest".parse().unwrap();
        let Query(query) = Query::<LatestAudioQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.word_id, None);
    }

    #[test]
    fn test_missing_audio_serializes_nulls() {
        let json = serde_json::to_value(LatestAudioResponse {
            ok: true,
            filename: None,
            public_path: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true, "filename": null, "publicPath": null }));
    }
}
