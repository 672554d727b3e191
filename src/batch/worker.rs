//! Batch Worker
//!
//! Processes a single work item end to end.

use crate::recognize::{RecognitionAudio, RecognitionConfig, Recognizer};
use crate::source::WorkItem;

/// Outcome of one work item
///
/// Failures are folded into the outcome instead of propagated, so one
/// bad item never takes down its siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// The service returned at least one transcript
    Transcribed { transcript: String, confidence: f32 },
    /// The call succeeded but the service found no speech
    NoSpeech,
    /// The item could not be processed
    Failed(String),
}

impl ItemOutcome {
    pub fn is_transcribed(&self) -> bool {
        matches!(self, Self::Transcribed { .. })
    }
}

/// Read one audio file and run it through the recognizer
pub async fn process_item(
    recognizer: &dyn Recognizer,
    config: &RecognitionConfig,
    item: &WorkItem,
) -> ItemOutcome {
    let bytes = match tokio::fs::read(&item.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", item.key, e);
            return ItemOutcome::Failed(format!("read failed: {}", e));
        }
    };

    let audio = RecognitionAudio::from_bytes(&bytes);
    match recognizer.recognize(audio, config).await {
        Ok(response) => match response.top_alternative() {
            Some(alternative) => {
                tracing::debug!(
                    "Transcribed {}: {:?} (confidence={:.6})",
                    item.key,
                    alternative.transcript,
                    alternative.confidence
                );
                ItemOutcome::Transcribed {
                    transcript: alternative.transcript.clone(),
                    confidence: alternative.confidence,
                }
            }
            None => {
                tracing::info!("No speech detected in {}", item.key);
                ItemOutcome::NoSpeech
            }
        },
        Err(e) => {
            tracing::warn!("Recognition failed for {}: {}", item.key, e);
            ItemOutcome::Failed(e.to_string())
        }
    }
}
