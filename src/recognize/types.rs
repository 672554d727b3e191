//! Recognition Wire Types
//!
//! Request and response shapes for the speech recognition REST API.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Audio encoding of the request payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    /// 16-bit signed little-endian PCM
    #[default]
    Linear16,
    Flac,
}

/// Recognition parameters shared by every request in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub language_code: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: 16000,
            language_code: "ko-KR".to_string(),
        }
    }
}

/// Audio payload of a recognition request
///
/// Either the raw bytes inline (base64 on the wire) or a URI the
/// service fetches itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognitionAudio {
    Content(String),
    Uri(String),
}

impl RecognitionAudio {
    /// Inline audio bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::Content(STANDARD.encode(bytes))
    }

    /// Remote audio referenced by URI (e.g. gs://bucket/clip.raw)
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }
}

/// Recognition request body
#[derive(Debug, Clone, Serialize)]
pub struct RecognizeRequest {
    pub config: RecognitionConfig,
    pub audio: RecognitionAudio,
}

/// Recognition response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

impl RecognizeResponse {
    /// First alternative of the first result group, if any
    pub fn top_alternative(&self) -> Option<&SpeechAlternative> {
        self.results.first().and_then(|r| r.alternatives.first())
    }

    /// All alternatives across all result groups, in response order
    pub fn alternatives(&self) -> impl Iterator<Item = &SpeechAlternative> {
        self.results.iter().flat_map(|r| r.alternatives.iter())
    }
}

/// One result group within a response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechAlternative>,
}

/// One candidate transcript with its confidence score
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpeechAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}
