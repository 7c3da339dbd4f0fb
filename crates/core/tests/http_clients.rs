//! Integration tests for the AnkiConnect and speech HTTP clients against a
//! mock server.

use std::collections::BTreeMap;

use anki_bridge_core::anki::{AnkiConnectClient, AnkiError, NoteService};
use anki_bridge_core::tts::{HttpSpeechProvider, SpeechProvider, SpeechRequest, TtsError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// AnkiConnect
// ============================================================================

#[tokio::test]
async fn test_find_note_returns_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "action": "notesInfo", "version": 6, "params": { "notes": [42] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{
                "noteId": 42,
                "modelName": "Vocab",
                "tags": [],
                "fields": { "Front": { "value": "apple", "order": 0 } }
            }],
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let note = client.find_note(42).await.unwrap();
    assert_eq!(note.note_id, Some(42));
    assert_eq!(note.field("Front"), Some("apple"));
}

#[tokio::test]
async fn test_find_note_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [{}], "error": null })))
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let err = client.find_note(7).await.unwrap_err();
    assert!(matches!(err, AnkiError::NoteNotFound(7)), "got {err:?}");
}

#[tokio::test]
async fn test_update_note_fields_sends_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "updateNoteFields",
            "params": { "note": { "id": 42, "fields": { "Hint": "An <b>apple</b>." } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null, "error": null })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let fields = BTreeMap::from([("Hint".to_string(), "An <b>apple</b>.".to_string())]);
    client.update_note_fields(42, &fields).await.unwrap();
}

#[tokio::test]
async fn test_remote_error_surfaces_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": null, "error": "collection is not available" })),
        )
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let err = client
        .update_note_fields(1, &BTreeMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "AnkiConnect error: collection is not available");
}

#[tokio::test]
async fn test_http_failure_maps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = AnkiConnectClient::new(server.uri());
    let err = client.find_note(1).await.unwrap_err();
    assert!(matches!(err, AnkiError::Http { status: 503 }));
}

// ============================================================================
// Speech
// ============================================================================

#[tokio::test]
async fn test_synthesize_returns_audio_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "tts-1", "input": "I ate an apple.", "voice": "alloy" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(b"ID3\x04fake-mp3".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpSpeechProvider::new(server.uri(), "tts-1", "alloy")
        .with_api_key(Some("sk-test".into()));
    let audio = provider
        .synthesize(SpeechRequest::new("I ate an apple."))
        .await
        .unwrap();
    assert!(audio.starts_with(b"ID3"));
}

#[tokio::test]
async fn test_synthesize_rejects_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "audio/mpeg"))
        .mount(&server)
        .await;

    let provider = HttpSpeechProvider::new(server.uri(), "tts-1", "alloy");
    let err = provider.synthesize(SpeechRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, TtsError::EmptyAudio), "got {err:?}");
}

#[tokio::test]
async fn test_synthesize_rejects_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "quota" })))
        .mount(&server)
        .await;

    let provider = HttpSpeechProvider::new(server.uri(), "tts-1", "alloy");
    let err = provider.synthesize(SpeechRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, TtsError::NotAudio(_)), "got {err:?}");
}

#[tokio::test]
async fn test_synthesize_empty_text_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = HttpSpeechProvider::new(server.uri(), "tts-1", "alloy");
    let err = provider.synthesize(SpeechRequest::new("   ")).await.unwrap_err();
    assert!(matches!(err, TtsError::EmptyText));
}
