//! Batchscribe CLI
//!
//! Transcribes a directory of audio files concurrently, or captions a
//! single remote clip addressed by URI.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use batchscribe::batch::Dispatcher;
use batchscribe::config::Settings;
use batchscribe::recognize::{RecognitionAudio, RecognitionConfig, Recognizer, RemoteRecognizer};
use batchscribe::{sink, source};

#[derive(Parser)]
#[command(name = "batchscribe")]
#[command(about = "Batch speech transcription over the cloud recognition API")]
#[command(version)]
struct Cli {
    /// Directory of audio files, or a single URI (anything containing "://")
    input: String,

    /// Ceiling on concurrently processed files
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Filename pattern matched within the directory
    #[arg(short, long)]
    pattern: Option<String>,

    /// Language code of the audio (BCP-47)
    #[arg(short, long)]
    language: Option<String>,

    /// Sample rate of the audio in hertz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Recognition service endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// API key (defaults to $SPEECH_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    batchscribe::init_logging();

    let cli = Cli::parse();

    let mut settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!("Cannot load settings, using defaults: {}", e);
        Settings::default()
    });

    if let Some(concurrency) = cli.concurrency {
        settings.batch.max_in_flight = concurrency;
    }
    if let Some(pattern) = cli.pattern {
        settings.batch.pattern = pattern;
    }
    if let Some(language) = cli.language {
        settings.recognition.language = language;
    }
    if let Some(sample_rate) = cli.sample_rate {
        settings.recognition.sample_rate_hertz = sample_rate;
    }
    if let Some(endpoint) = cli.endpoint {
        settings.api.endpoint = endpoint;
    }

    settings.validate()?;

    let api_key = cli
        .api_key
        .or_else(|| std::env::var("SPEECH_API_KEY").ok())
        .context("No API key: pass --api-key or set SPEECH_API_KEY")?;

    let recognizer = RemoteRecognizer::with_config(
        api_key,
        &settings.api.endpoint,
        settings.api.timeout_seconds,
    );
    tracing::debug!(
        "Using {} recognizer against {}",
        recognizer.name(),
        settings.api.endpoint
    );

    let config = RecognitionConfig {
        sample_rate_hertz: settings.recognition.sample_rate_hertz,
        language_code: settings.recognition.language.clone(),
        ..RecognitionConfig::default()
    };

    if cli.input.contains("://") {
        caption_uri(&recognizer, &config, &cli.input).await
    } else {
        caption_directory(recognizer, config, &cli.input, &settings).await
    }
}

/// Caption one remote clip and print every candidate transcript
async fn caption_uri(
    recognizer: &RemoteRecognizer,
    config: &RecognitionConfig,
    uri: &str,
) -> anyhow::Result<()> {
    tracing::info!("Recognizing {}", uri);

    let response = recognizer
        .recognize(RecognitionAudio::from_uri(uri), config)
        .await
        .with_context(|| format!("Cannot recognize {}", uri))?;

    for alternative in response.alternatives() {
        println!(
            "\"{}\" (confidence={:.6})",
            alternative.transcript, alternative.confidence
        );
    }

    Ok(())
}

/// Transcribe every matching file in a directory and write the artifact
async fn caption_directory(
    recognizer: RemoteRecognizer,
    config: RecognitionConfig,
    dir: &str,
    settings: &Settings,
) -> anyhow::Result<()> {
    let dir = Path::new(dir);
    let items = source::scan_dir(dir, &settings.batch.pattern)
        .with_context(|| format!("Cannot scan {}", dir.display()))?;

    if items.is_empty() {
        tracing::warn!(
            "No files matching {:?} in {}",
            settings.batch.pattern,
            dir.display()
        );
    }

    let dispatcher = Dispatcher::with_max_in_flight(
        Arc::new(recognizer),
        config,
        settings.batch.max_in_flight,
    );
    let report = dispatcher.run(items).await;

    tracing::info!(
        "Batch finished in {:.2?}: {}/{} transcribed, {} without speech, {} failed (peak in-flight {})",
        report.elapsed,
        report.transcripts.len(),
        report.total,
        report.no_speech.len(),
        report.failures.len(),
        report.peak_in_flight
    );
    tracing::debug!("Merged results: {:?}", report.transcripts);

    sink::write_results(Path::new("."), &report.transcripts)
        .context("Cannot write result artifact")?;

    Ok(())
}
