//! Transcription client against a mocked Speech-to-Text endpoint.

use std::sync::Arc;
use std::time::Duration;

use bud_speech::{
    AudioPayload, AudioValidator, GoogleSpeechBackend, SpeechAuth, TranscriptionClient,
    TranscriptionFault, resolve,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, pool_size: usize) -> TranscriptionClient {
    let backend = GoogleSpeechBackend::new(
        server.uri(),
        SpeechAuth::ApiKey("test-key".into()),
        Duration::from_secs(5),
    )
    .unwrap();
    TranscriptionClient::new(Arc::new(backend), pool_size)
}

fn wav_payload() -> AudioPayload {
    AudioPayload::new(vec![1_u8; 4096], Some("audio/wav".into()), Some("clip.wav".into()))
}

#[tokio::test]
async fn wav_payload_is_transcribed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/speech:recognize"))
        .and(body_partial_json(json!({
            "config": {"encoding": "LINEAR16", "sampleRateHertz": 16000}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"alternatives": [{"transcript": "I like apple", "confidence": 0.92}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = wav_payload();
    AudioValidator::default().validate(&payload).unwrap();
    let config = resolve(&payload.format_token());

    let result = client_for(&server, 4).transcribe(&payload, &config).await;
    assert!(result.success);
    assert_eq!(result.text, "I like apple");
    assert_eq!(result.confidence, Some(0.92));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn empty_results_are_no_speech() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let payload = wav_payload();
    let result = client_for(&server, 4)
        .transcribe(&payload, &resolve("wav"))
        .await;
    assert!(!result.success);
    assert_eq!(result.text, "");
    assert_eq!(result.error.as_deref(), Some("could not recognize speech"));
    assert_eq!(result.fault, Some(TranscriptionFault::NoSpeech));
}

#[tokio::test]
async fn server_error_never_escapes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "internal"}
        })))
        .mount(&server)
        .await;

    let result = client_for(&server, 4)
        .transcribe(&wav_payload(), &resolve("wav"))
        .await;
    assert!(!result.success);
    assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert_eq!(result.fault, Some(TranscriptionFault::Backend));
}

#[tokio::test]
async fn concurrent_requests_all_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "results": [{"alternatives": [{"transcript": "hello", "confidence": 0.8}]}]
                }))
                .set_delay(Duration::from_millis(20)),
        )
        .expect(10)
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server, 2));
    let payload = wav_payload();
    let mut handles = Vec::new();
    for _ in 0..10 {
        let client = Arc::clone(&client);
        let payload = payload.clone();
        handles.push(tokio::spawn(async move {
            client.transcribe(&payload, &resolve("wav")).await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.success);
        assert_eq!(result.text, "hello");
    }
}
