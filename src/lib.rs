//! Batchscribe Library
//!
//! Core functionality for batch audio transcription.

pub mod batch;
pub mod config;
pub mod recognize;
pub mod sink;
pub mod source;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging
///
/// Honors `RUST_LOG` when set, otherwise logs the crate at info level.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "batchscribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
