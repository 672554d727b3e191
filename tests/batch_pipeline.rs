//! Integration Tests for the Batch Transcription Pipeline
//!
//! Tests the complete flow: scan_dir -> Dispatcher -> workers -> merged report -> result artifact
//!
//! These tests verify:
//! 1. Module interactions work correctly across the batch pipeline
//! 2. Per-item failures stay isolated from the rest of the batch
//! 3. The concurrency ceiling holds under load
//! 4. The artifact on disk matches the merged report

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use batchscribe::batch::Dispatcher;
use batchscribe::recognize::{
    RecognitionAudio, RecognitionConfig, RecognizeError, RecognizeResponse, Recognizer,
    RemoteRecognizer, SpeechAlternative, SpeechRecognitionResult,
};
use batchscribe::{sink, source};

// ============================================================================
// Test Fixtures and Mock Recognizers
// ============================================================================

/// What the scripted recognizer should do for one audio payload
#[derive(Clone)]
enum Script {
    Transcript(&'static str, f32),
    Empty,
    Fail(&'static str),
}

/// Recognizer that answers each payload according to a script
///
/// Payloads are keyed by the raw audio bytes, so tests can pin a
/// distinct answer to every file they write.
struct ScriptedRecognizer {
    scripts: HashMap<Vec<u8>, Script>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedRecognizer {
    fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            delay: None,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn on(mut self, payload: &[u8], script: Script) -> Self {
        self.scripts.insert(payload.to_vec(), script);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn recognize(
        &self,
        audio: RecognitionAudio,
        _config: &RecognitionConfig,
    ) -> Result<RecognizeResponse, RecognizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let payload = match &audio {
            RecognitionAudio::Content(encoded) => STANDARD.decode(encoded).unwrap_or_default(),
            RecognitionAudio::Uri(uri) => uri.clone().into_bytes(),
        };

        let script = self.scripts.get(&payload).unwrap_or_else(|| {
            panic!("No script for payload {:?}", String::from_utf8_lossy(&payload))
        });

        match script {
            Script::Transcript(text, confidence) => Ok(RecognizeResponse {
                results: vec![SpeechRecognitionResult {
                    alternatives: vec![SpeechAlternative {
                        transcript: text.to_string(),
                        confidence: *confidence,
                    }],
                }],
            }),
            Script::Empty => Ok(RecognizeResponse::default()),
            Script::Fail(reason) => Err(RecognizeError::Api(reason.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Write one audio file into the batch directory
fn write_clip(dir: &Path, name: &str, payload: &[u8]) {
    std::fs::write(dir.join(name), payload).unwrap();
}

/// The key a file will carry through the report and the artifact
fn key_for(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}

// ============================================================================
// SECTION 1: Directory to Artifact Flow
// ============================================================================

mod directory_flow {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_batch_from_directory_to_artifact() {
        let audio_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        write_clip(audio_dir.path(), "clip-01.raw", b"payload-one");
        write_clip(audio_dir.path(), "clip-02.raw", b"payload-two");
        write_clip(audio_dir.path(), "clip-03.raw", b"payload-three");
        write_clip(audio_dir.path(), "clip-04.raw", b"payload-four");

        let recognizer = ScriptedRecognizer::new()
            .on(b"payload-one", Script::Transcript("first clip", 0.91))
            .on(b"payload-two", Script::Transcript("second clip", 0.88))
            .on(b"payload-three", Script::Transcript("third clip", 0.95))
            .on(b"payload-four", Script::Transcript("fourth clip", 0.79));

        let items = source::scan_dir(audio_dir.path(), "*.raw").unwrap();
        assert_eq!(items.len(), 4);

        let dispatcher = Dispatcher::with_max_in_flight(
            Arc::new(recognizer),
            RecognitionConfig::default(),
            4,
        );
        let report = dispatcher.run(items).await;

        assert_eq!(report.total, 4);
        assert_eq!(report.completed(), 4);
        assert_eq!(
            report
                .transcripts
                .get(&key_for(audio_dir.path(), "clip-02.raw"))
                .map(String::as_str),
            Some("second clip")
        );

        let artifact = sink::write_results(out_dir.path(), &report.transcripts).unwrap();
        let contents = std::fs::read_to_string(artifact).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, report.transcripts);
    }

    #[tokio::test]
    async fn test_mixed_outcomes_partition_the_report() {
        let audio_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        write_clip(audio_dir.path(), "speech.raw", b"spoken");
        write_clip(audio_dir.path(), "silence.raw", b"quiet");
        write_clip(audio_dir.path(), "broken.raw", b"garbled");

        let recognizer = ScriptedRecognizer::new()
            .on(b"spoken", Script::Transcript("annyeong haseyo", 0.94))
            .on(b"quiet", Script::Empty)
            .on(b"garbled", Script::Fail("backend exploded"));

        let items = source::scan_dir(audio_dir.path(), "*").unwrap();
        let dispatcher =
            Dispatcher::new(Arc::new(recognizer), RecognitionConfig::default());
        let report = dispatcher.run(items).await;

        assert_eq!(report.completed(), 3);
        assert_eq!(report.transcripts.len(), 1);
        assert_eq!(
            report
                .transcripts
                .get(&key_for(audio_dir.path(), "speech.raw"))
                .map(String::as_str),
            Some("annyeong haseyo")
        );
        assert_eq!(
            report.no_speech,
            vec![key_for(audio_dir.path(), "silence.raw")]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, key_for(audio_dir.path(), "broken.raw"));
        assert!(report.failures[0].1.contains("backend exploded"));

        // Only successes make it into the artifact.
        let artifact = sink::write_results(out_dir.path(), &report.transcripts).unwrap();
        let contents = std::fs::read_to_string(artifact).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_previous_artifact() {
        let out_dir = TempDir::new().unwrap();

        let first_dir = TempDir::new().unwrap();
        write_clip(first_dir.path(), "old.raw", b"stale");
        let recognizer = ScriptedRecognizer::new().on(b"stale", Script::Transcript("old", 0.5));
        let items = source::scan_dir(first_dir.path(), "*").unwrap();
        let report = Dispatcher::new(Arc::new(recognizer), RecognitionConfig::default())
            .run(items)
            .await;
        sink::write_results(out_dir.path(), &report.transcripts).unwrap();

        let second_dir = TempDir::new().unwrap();
        write_clip(second_dir.path(), "new.raw", b"fresh");
        let recognizer = ScriptedRecognizer::new().on(b"fresh", Script::Transcript("new", 0.5));
        let items = source::scan_dir(second_dir.path(), "*").unwrap();
        let report = Dispatcher::new(Arc::new(recognizer), RecognitionConfig::default())
            .run(items)
            .await;
        let artifact = sink::write_results(out_dir.path(), &report.transcripts).unwrap();

        let contents = std::fs::read_to_string(artifact).unwrap();
        assert!(contents.contains("new.raw"));
        assert!(!contents.contains("old.raw"));
    }
}

// ============================================================================
// SECTION 2: Concurrency Under Load
// ============================================================================

mod concurrency {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ceiling_holds_across_the_batch() {
        let audio_dir = TempDir::new().unwrap();
        for i in 0..6 {
            write_clip(audio_dir.path(), &format!("clip-{:02}.raw", i), b"pcm");
        }

        let delay = Duration::from_millis(40);
        let recognizer = Arc::new(
            ScriptedRecognizer::new()
                .on(b"pcm", Script::Transcript("ok", 0.9))
                .with_delay(delay),
        );

        let items = source::scan_dir(audio_dir.path(), "*.raw").unwrap();
        let dispatcher = Dispatcher::with_max_in_flight(
            recognizer.clone(),
            RecognitionConfig::default(),
            2,
        );

        let start = Instant::now();
        let report = dispatcher.run(items).await;
        let elapsed = start.elapsed();

        assert_eq!(report.completed(), 6);
        assert_eq!(recognizer.calls(), 6);
        assert_eq!(recognizer.peak(), 2);
        assert!(report.peak_in_flight <= 2);
        // 6 items of 40ms over 2 lanes take at least 3 waves.
        assert!(
            elapsed >= Duration::from_millis(120),
            "Batch finished in {:?}, ceiling was not enforced",
            elapsed
        );
    }
}

// ============================================================================
// SECTION 3: End-to-End over HTTP
// ============================================================================

mod http_pipeline {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_full_pipeline_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/speech:recognize")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"results": [{"alternatives": [{"transcript": "uniform", "confidence": 0.8}]}]}"#,
            )
            .expect(3)
            .create_async()
            .await;

        let audio_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_clip(audio_dir.path(), "a.raw", b"one");
        write_clip(audio_dir.path(), "b.raw", b"two");
        write_clip(audio_dir.path(), "c.raw", b"three");

        let recognizer = RemoteRecognizer::with_endpoint("test-key", server.url());
        let items = source::scan_dir(audio_dir.path(), "*.raw").unwrap();
        let dispatcher = Dispatcher::with_max_in_flight(
            Arc::new(recognizer),
            RecognitionConfig::default(),
            2,
        );
        let report = dispatcher.run(items).await;

        mock.assert_async().await;
        assert_eq!(report.transcripts.len(), 3);
        assert!(report
            .transcripts
            .values()
            .all(|transcript| transcript == "uniform"));

        let artifact = sink::write_results(out_dir.path(), &report.transcripts).unwrap();
        let parsed: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(artifact).unwrap()).unwrap();
        assert_eq!(parsed.len(), 3);
    }

    #[tokio::test]
    async fn test_server_errors_leave_artifact_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/speech:recognize")
            .with_status(500)
            .with_body("backend down")
            .expect(2)
            .create_async()
            .await;

        let audio_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_clip(audio_dir.path(), "a.raw", b"one");
        write_clip(audio_dir.path(), "b.raw", b"two");

        let recognizer = RemoteRecognizer::with_endpoint("test-key", server.url());
        let items = source::scan_dir(audio_dir.path(), "*.raw").unwrap();
        let report = Dispatcher::new(Arc::new(recognizer), RecognitionConfig::default())
            .run(items)
            .await;

        mock.assert_async().await;
        assert!(report.transcripts.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|(_, reason)| reason.contains("backend down")));

        let artifact = sink::write_results(out_dir.path(), &report.transcripts).unwrap();
        assert_eq!(std::fs::read_to_string(artifact).unwrap(), "{}");
    }
}
