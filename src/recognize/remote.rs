//! Remote Recognizer
//!
//! Cloud speech recognition over the REST API.

use super::{
    RecognitionAudio, RecognitionConfig, RecognizeError, RecognizeRequest, RecognizeResponse,
    Recognizer,
};
use async_trait::async_trait;
use std::time::Duration;

/// Default recognition service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const RECOGNIZE_PATH: &str = "/v1/speech:recognize";

/// Remote speech recognition backend
///
/// Each call is a single request. Failed calls are reported to the
/// caller as-is; there is no retry here.
pub struct RemoteRecognizer {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteRecognizer {
    /// Create a recognizer against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Create a recognizer against a custom endpoint
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::with_config(api_key, endpoint, DEFAULT_TIMEOUT_SECONDS)
    }

    /// Create a recognizer with full configuration
    pub fn with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_seconds: u64,
    ) -> Self {
        let timeout = Duration::from_secs(timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
            timeout,
        }
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self) -> String {
        format!("{}{}", self.endpoint, RECOGNIZE_PATH)
    }
}

#[async_trait]
impl Recognizer for RemoteRecognizer {
    async fn recognize(
        &self,
        audio: RecognitionAudio,
        config: &RecognitionConfig,
    ) -> Result<RecognizeResponse, RecognizeError> {
        if self.api_key.is_empty() {
            return Err(RecognizeError::MissingApiKey);
        }

        let request = RecognizeRequest {
            config: config.clone(),
            audio,
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Recognition API network error: {}", e);
                RecognizeError::Network(e.to_string())
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Recognition API rate limited");
            return Err(RecognizeError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Recognition API error ({}): {}", status, error_text);
            return Err(RecognizeError::Api(error_text));
        }

        response
            .json::<RecognizeResponse>()
            .await
            .map_err(|e| RecognizeError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
