//! Settings Definition
//!
//! Application configuration schema.

use serde::{Deserialize, Serialize};

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub batch: BatchSettings,
    pub recognition: RecognitionSettings,
    pub api: ApiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch: BatchSettings::default(),
            recognition: RecognitionSettings::default(),
            api: ApiSettings::default(),
        }
    }
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.batch.max_in_flight == 0 {
            return Err(SettingsError::InvalidConcurrency(
                "max_in_flight must be at least 1".to_string(),
            ));
        }

        if self.recognition.language.trim().is_empty() {
            return Err(SettingsError::InvalidLanguage(
                "language code is empty".to_string(),
            ));
        }

        if !(8000..=48000).contains(&self.recognition.sample_rate_hertz) {
            return Err(SettingsError::InvalidSampleRate(
                self.recognition.sample_rate_hertz,
            ));
        }

        Ok(())
    }

    /// Load settings from disk
    pub fn load() -> Result<Self, SettingsError> {
        super::store::load_settings()
    }
}

/// Batch dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Ceiling on concurrently processed items
    pub max_in_flight: usize,
    /// Filename pattern matched against directory entries
    pub pattern: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_in_flight: crate::batch::DEFAULT_MAX_IN_FLIGHT,
            pattern: "*".to_string(),
        }
    }
}

/// Speech recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Language code (BCP-47)
    pub language: String,
    /// Sample rate of the submitted audio
    pub sample_rate_hertz: u32,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "ko-KR".to_string(),
            sample_rate_hertz: 16000,
        }
    }
}

/// Speech API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Service endpoint
    pub endpoint: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: crate::recognize::DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: crate::recognize::DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),
}
