//! Pipeline built from settings, talking to mocked Google endpoints.

use bud_feedback::{FeedbackMode, FeedbackResult};
use bud_pipeline::Pipeline;
use bud_settings::BudSettings;
use bud_speech::AudioPayload;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(speech: &MockServer, gemini: &MockServer) -> BudSettings {
    let mut settings = BudSettings::default();
    settings.speech.api_key = Some("speech-key".into());
    settings.speech.base_url = speech.uri();
    settings.feedback.api_key = Some("gemini-key".into());
    settings.feedback.base_url = gemini.uri();
    settings.feedback.model = "gemini-test".into();
    settings
}

#[tokio::test]
async fn detailed_run_against_live_shaped_backends() {
    let speech = MockServer::start().await;
    let gemini = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/speech:recognize"))
        .and(query_param("key", "speech-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"alternatives": [{"transcript": "I like apple", "confidence": 0.92}]}]
        })))
        .expect(1)
        .mount(&speech)
        .await;

    let structured = json!({
        "child_utterances": ["I like apple"],
        "feedback_short": "🌟好きなものを英語で言えたね！",
        "phrase_suggestion": {"en": "I like bananas too!", "ja": "好きなものを付け加えるとき"},
        "note": ""
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(query_param("key", "gemini-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": structured}]}, "finishReason": "STOP"}]
        })))
        .expect(1)
        .mount(&gemini)
        .await;

    let pipeline = Pipeline::from_settings(&settings_for(&speech, &gemini));
    assert!(pipeline.health().all_available());

    let payload = AudioPayload::new(vec![0_u8; 4096], Some("audio/wav".into()), None);
    let result = pipeline
        .run(&payload, &payload.format_token(), FeedbackMode::Detailed, Some(9))
        .await
        .unwrap();

    assert_eq!(result.transcript, "I like apple");
    assert_eq!(result.confidence, Some(0.92));
    let Some(FeedbackResult::Structured(s)) = result.feedback else {
        panic!("expected structured feedback");
    };
    assert_eq!(s.phrase_suggestion.en, "I like bananas too!");
    assert!(!result.backend_degraded.any());
}

#[tokio::test]
async fn empty_recognition_returns_transcription_error() {
    let speech = MockServer::start().await;
    let gemini = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&speech)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gemini)
        .await;

    let pipeline = Pipeline::from_settings(&settings_for(&speech, &gemini));
    let payload = AudioPayload::from_bytes(vec![0_u8; 4096]);
    let result = pipeline
        .run(&payload, &payload.format_token(), FeedbackMode::Short, None)
        .await
        .unwrap();

    assert_eq!(result.transcript, "");
    assert_eq!(result.transcription_error.as_deref(), Some("could not recognize speech"));
    assert!(!result.backend_degraded.speech);
    assert!(result.feedback.is_none());
}

#[tokio::test]
async fn without_credentials_everything_degrades_gracefully() {
    let pipeline = Pipeline::from_settings(&BudSettings::default());
    let payload = AudioPayload::from_bytes(vec![0_u8; 4096]);
    let result = pipeline
        .run(&payload, "webm", FeedbackMode::Short, None)
        .await
        .unwrap();
    assert!(result.backend_degraded.speech);
    assert!(result.transcription_error.is_some());
}
