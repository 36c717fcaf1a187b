//! End-to-end pipeline behavior with counting stub backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use bud_feedback::parse::{fallback_structured, fallback_text};
use bud_feedback::{
    FeedbackBackend, FeedbackError, FeedbackGenerator, FeedbackMode, FeedbackResult,
    GenerationParams,
};
use bud_pipeline::{Pipeline, PipelineError};
use bud_speech::{
    AudioPayload, AudioValidator, FormatResolver, Recognition, SpeechBackend, SpeechError,
    TranscriptionClient, TranscriptionConfig, UnavailableSpeechBackend, ValidationError,
};
use bytes::Bytes;

// ─────────────────────────────────────────────────────────────────────────────
// Stub backends
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
enum SpeechReply {
    Text(&'static str, f32),
    NoSpeech,
    Fault,
    Slow(Duration),
}

struct StubSpeech {
    reply: SpeechReply,
    calls: Arc<AtomicUsize>,
    last_sample_rate: Arc<AtomicUsize>,
}

#[async_trait]
impl SpeechBackend for StubSpeech {
    fn name(&self) -> &'static str {
        "stub-speech"
    }

    async fn recognize(
        &self,
        _audio: Bytes,
        config: &TranscriptionConfig,
    ) -> Result<Option<Recognition>, SpeechError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_sample_rate
            .store(config.sample_rate_hertz as usize, Ordering::SeqCst);
        match self.reply.clone() {
            SpeechReply::Text(text, confidence) => Ok(Some(Recognition {
                transcript: text.to_string(),
                confidence: Some(confidence),
            })),
            SpeechReply::NoSpeech => Ok(None),
            SpeechReply::Fault => Err(SpeechError::Api {
                status: 503,
                message: "unavailable".into(),
            }),
            SpeechReply::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(None)
            }
        }
    }
}

#[derive(Clone)]
enum FeedbackReply {
    Text(&'static str),
    Fault,
}

struct StubFeedback {
    reply: FeedbackReply,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl FeedbackBackend for StubFeedback {
    fn name(&self) -> &'static str {
        "stub-feedback"
    }

    async fn generate(
        &self,
        _prompt: String,
        _params: GenerationParams,
    ) -> Result<String, FeedbackError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            FeedbackReply::Text(text) => Ok(text.to_string()),
            FeedbackReply::Fault => Err(FeedbackError::Api {
                status: 500,
                message: "boom".into(),
            }),
        }
    }
}

struct Harness {
    pipeline: Pipeline,
    speech_calls: Arc<AtomicUsize>,
    feedback_calls: Arc<AtomicUsize>,
    last_sample_rate: Arc<AtomicUsize>,
}

fn harness(speech: SpeechReply, feedback: FeedbackReply) -> Harness {
    let speech_calls = Arc::new(AtomicUsize::new(0));
    let feedback_calls = Arc::new(AtomicUsize::new(0));
    let last_sample_rate = Arc::new(AtomicUsize::new(0));
    let speech_backend = StubSpeech {
        reply: speech,
        calls: Arc::clone(&speech_calls),
        last_sample_rate: Arc::clone(&last_sample_rate),
    };
    let feedback_backend = StubFeedback {
        reply: feedback,
        calls: Arc::clone(&feedback_calls),
    };
    let pipeline = Pipeline::new(
        AudioValidator::default(),
        FormatResolver::default(),
        TranscriptionClient::new(Arc::new(speech_backend), 4),
        FeedbackGenerator::new(Arc::new(feedback_backend), 4),
    );
    Harness {
        pipeline,
        speech_calls,
        feedback_calls,
        last_sample_rate,
    }
}

fn wav(len: usize) -> AudioPayload {
    AudioPayload::new(vec![0_u8; len], Some("audio/wav".into()), Some("clip.wav".into()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tiny_payload_rejected_without_backend_calls() {
    let h = harness(SpeechReply::Text("hi", 0.9), FeedbackReply::Text("ok"));
    let result = h.pipeline.run(&wav(50), "wav", FeedbackMode::Short, None).await;
    assert_matches!(result, Err(ValidationError::TooSmall { len: 50, .. }));
    assert_eq!(h.speech_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.feedback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_payload_rejected() {
    let h = harness(SpeechReply::Text("hi", 0.9), FeedbackReply::Text("ok"));
    let result = h.pipeline.run(&wav(0), "wav", FeedbackMode::Short, None).await;
    assert_matches!(result, Err(ValidationError::Empty));
    assert_eq!(h.speech_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_payload_rejected() {
    let h = harness(SpeechReply::Text("hi", 0.9), FeedbackReply::Text("ok"));
    let result = h
        .pipeline
        .run(&wav(10 * 1024 * 1024 + 1), "wav", FeedbackMode::Short, None)
        .await;
    assert_matches!(result, Err(ValidationError::TooLarge { .. }));
    assert_eq!(h.speech_calls.load(Ordering::SeqCst), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Happy path
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wav_payload_transcribed_and_praised() {
    let h = harness(
        SpeechReply::Text("I like apple", 0.92),
        FeedbackReply::Text("勇気を出して話せたね！"),
    );
    let result = h
        .pipeline
        .run(&wav(2048), "wav", FeedbackMode::Short, Some(7))
        .await
        .unwrap();

    assert_eq!(result.transcript, "I like apple");
    assert_eq!(result.confidence, Some(0.92));
    assert_eq!(result.feedback, Some(FeedbackResult::Text("勇気を出して話せたね！".into())));
    assert!(result.transcription_error.is_none());
    assert!(!result.backend_degraded.any());
    assert_eq!(h.last_sample_rate.load(Ordering::SeqCst), 16_000);
    assert_eq!(h.feedback_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_format_uses_webm_defaults() {
    let h = harness(SpeechReply::Text("hello", 0.8), FeedbackReply::Text("いいね"));
    let _ = h
        .pipeline
        .run(&wav(2048), "m4a", FeedbackMode::General, None)
        .await
        .unwrap();
    assert_eq!(h.last_sample_rate.load(Ordering::SeqCst), 48_000);
}

// ─────────────────────────────────────────────────────────────────────────────
// Short-circuit and degradation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_speech_skips_feedback_and_is_not_degraded() {
    let h = harness(SpeechReply::NoSpeech, FeedbackReply::Text("never"));
    let result = h
        .pipeline
        .run(&wav(2048), "webm", FeedbackMode::Detailed, None)
        .await
        .unwrap();

    assert_eq!(result.transcript, "");
    assert!(result.feedback.is_none());
    assert_eq!(result.transcription_error.as_deref(), Some("could not recognize speech"));
    assert!(!result.backend_degraded.speech);
    assert!(!result.backend_degraded.feedback);
    assert_eq!(h.feedback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn speech_fault_skips_feedback_and_flags_speech() {
    let h = harness(SpeechReply::Fault, FeedbackReply::Text("never"));
    let result = h
        .pipeline
        .run(&wav(2048), "wav", FeedbackMode::Short, None)
        .await
        .unwrap();

    assert!(result.feedback.is_none());
    assert!(result.transcription_error.is_some());
    assert!(result.backend_degraded.speech);
    assert_eq!(h.feedback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_speech_flags_speech() {
    let feedback_calls = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::new(
        AudioValidator::default(),
        FormatResolver::default(),
        TranscriptionClient::new(Arc::new(UnavailableSpeechBackend), 4),
        FeedbackGenerator::new(
            Arc::new(StubFeedback {
                reply: FeedbackReply::Text("never"),
                calls: Arc::clone(&feedback_calls),
            }),
            4,
        ),
    );
    let result = pipeline
        .run(&wav(2048), "wav", FeedbackMode::Short, None)
        .await
        .unwrap();
    assert!(result.backend_degraded.speech);
    assert_eq!(feedback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn feedback_fault_in_detailed_mode_returns_fixed_fallback() {
    let h = harness(SpeechReply::Text("I like apple", 0.92), FeedbackReply::Fault);
    let result = h
        .pipeline
        .run(&wav(2048), "wav", FeedbackMode::Detailed, Some(8))
        .await
        .unwrap();

    assert_eq!(result.transcript, "I like apple");
    let expected = fallback_structured("I like apple");
    assert!(!expected.note.is_empty());
    assert_eq!(result.feedback, Some(FeedbackResult::Structured(expected)));
    assert!(result.backend_degraded.feedback);
    assert!(!result.backend_degraded.speech);
}

#[tokio::test]
async fn feedback_fault_in_short_mode_returns_text_fallback() {
    let h = harness(SpeechReply::Text("hello there", 0.7), FeedbackReply::Fault);
    let result = h
        .pipeline
        .run(&wav(2048), "mp3", FeedbackMode::Short, None)
        .await
        .unwrap();
    assert_eq!(result.feedback, Some(FeedbackResult::Text(fallback_text("hello there"))));
    assert!(result.backend_degraded.feedback);
}

#[tokio::test]
async fn unparsed_structured_output_is_not_degraded() {
    let h = harness(
        SpeechReply::Text("I like apple", 0.92),
        FeedbackReply::Text("JSONではない返答です"),
    );
    let result = h
        .pipeline
        .run(&wav(2048), "wav", FeedbackMode::Detailed, None)
        .await
        .unwrap();
    let Some(FeedbackResult::Structured(s)) = result.feedback else {
        panic!("expected structured feedback");
    };
    assert_eq!(s.feedback_short, "JSONではない返答です");
    assert!(!result.backend_degraded.feedback);
}

// ─────────────────────────────────────────────────────────────────────────────
// Deadline and concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn deadline_exceeded_is_backend_timeout() {
    let h = harness(SpeechReply::Slow(Duration::from_secs(30)), FeedbackReply::Text("late"));
    let result = h
        .pipeline
        .run_with_deadline(&wav(2048), "wav", FeedbackMode::Short, None, Duration::from_secs(1))
        .await;
    assert_matches!(
        result,
        Err(PipelineError::BackendTimeout { deadline }) if deadline == Duration::from_secs(1)
    );
    assert_eq!(h.feedback_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn deadline_not_exceeded_passes_result_through() {
    let h = harness(SpeechReply::Text("hi", 0.9), FeedbackReply::Text("すごい"));
    let result = h
        .pipeline
        .run_with_deadline(&wav(2048), "wav", FeedbackMode::Short, None, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(result.transcript, "hi");
}

#[tokio::test]
async fn deadline_validation_error_passes_through() {
    let h = harness(SpeechReply::Text("hi", 0.9), FeedbackReply::Text("ok"));
    let result = h
        .pipeline
        .run_with_deadline(&wav(10), "wav", FeedbackMode::Short, None, Duration::from_secs(5))
        .await;
    assert_matches!(result, Err(PipelineError::Validation(ValidationError::TooSmall { .. })));
}

#[tokio::test]
async fn concurrent_runs_are_independent() {
    let h = Arc::new(harness(SpeechReply::Text("same", 0.9), FeedbackReply::Text("いいね")));
    let mut handles = Vec::new();
    for i in 0..16_usize {
        let h = Arc::clone(&h);
        handles.push(tokio::spawn(async move {
            let mode = if i % 2 == 0 { FeedbackMode::Short } else { FeedbackMode::General };
            h.pipeline.run(&wav(1024 + i), "wav", mode, None).await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.transcript, "same");
    }
    assert_eq!(h.speech_calls.load(Ordering::SeqCst), 16);
    assert_eq!(h.feedback_calls.load(Ordering::SeqCst), 16);
}
