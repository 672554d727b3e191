//! Recognizer Trait
//!
//! Common interface for speech recognition backends.

use async_trait::async_trait;

use super::{RecognitionAudio, RecognitionConfig, RecognizeResponse};

/// Recognition errors
#[derive(Debug, thiserror::Error)]
pub enum RecognizeError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API key not configured")]
    MissingApiKey,
}

/// Trait for speech recognition backends
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize speech in the given audio
    async fn recognize(
        &self,
        audio: RecognitionAudio,
        config: &RecognitionConfig,
    ) -> Result<RecognizeResponse, RecognizeError>;

    /// Get backend name
    fn name(&self) -> &'static str;
}
