//! Batch Dispatcher
//!
//! Runs one worker per item under a hard concurrency ceiling and
//! funnels all outcomes into a single report.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::recognize::{RecognitionConfig, Recognizer};
use crate::source::WorkItem;

use super::worker::{self, ItemOutcome};

/// Default ceiling on concurrently in-flight workers
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Dispatches one worker per work item with bounded concurrency
pub struct Dispatcher {
    recognizer: Arc<dyn Recognizer>,
    config: RecognitionConfig,
    max_in_flight: usize,
}

impl Dispatcher {
    /// Create a dispatcher with the default concurrency ceiling
    pub fn new(recognizer: Arc<dyn Recognizer>, config: RecognitionConfig) -> Self {
        Self::with_max_in_flight(recognizer, config, DEFAULT_MAX_IN_FLIGHT)
    }

    /// Create a dispatcher with a custom concurrency ceiling
    pub fn with_max_in_flight(
        recognizer: Arc<dyn Recognizer>,
        config: RecognitionConfig,
        max_in_flight: usize,
    ) -> Self {
        let max_in_flight = if max_in_flight == 0 {
            tracing::warn!("Concurrency ceiling of 0 is not runnable, raising to 1");
            1
        } else {
            max_in_flight
        };

        Self {
            recognizer,
            config,
            max_in_flight,
        }
    }

    /// Get the effective concurrency ceiling
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Run every item to completion and collect the outcomes
    ///
    /// Returns only after all launched workers have exited, so the
    /// report is a complete snapshot of the batch.
    pub async fn run(&self, items: Vec<WorkItem>) -> BatchReport {
        let started = Instant::now();
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let gauge = Arc::new(InFlightGauge::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();

        for item in items {
            // Admission gate: the next worker launches only once a
            // permit frees up.
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("batch semaphore is never closed");

            tracing::info!("Processing {}", item.key);

            let recognizer = self.recognizer.clone();
            let config = self.config.clone();
            let gauge = gauge.clone();
            let tx = tx.clone();

            workers.spawn(async move {
                let _permit = permit;
                let _running = gauge.enter();
                let outcome = worker::process_item(recognizer.as_ref(), &config, &item).await;
                let _ = tx.send((item.key, outcome));
            });
        }

        // Senders now live only inside workers; the channel closes
        // once the last worker exits, panics included.
        drop(tx);

        let mut report = BatchReport::new(total);
        while let Some((key, outcome)) = rx.recv().await {
            report.record(key, outcome);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task aborted: {}", e);
            }
        }

        report.peak_in_flight = gauge.peak();
        report.elapsed = started.elapsed();
        report
    }
}

/// Aggregated outcomes of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of items the batch started with
    pub total: usize,
    /// Successful transcripts, ordered by item key
    pub transcripts: BTreeMap<String, String>,
    /// Items the service found no speech in
    pub no_speech: Vec<String>,
    /// Items that failed, with the reason
    pub failures: Vec<(String, String)>,
    /// Highest number of workers observed in flight
    pub peak_in_flight: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, key: String, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Transcribed { transcript, .. } => {
                self.transcripts.insert(key, transcript);
            }
            ItemOutcome::NoSpeech => self.no_speech.push(key),
            ItemOutcome::Failed(reason) => self.failures.push((key, reason)),
        }
    }

    /// Number of items that finished, in any state
    pub fn completed(&self) -> usize {
        self.transcripts.len() + self.no_speech.len() + self.failures.len()
    }
}

/// Tracks how many workers are running and the high-water mark
#[derive(Debug, Default)]
pub struct InFlightGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    /// Count one worker as running until the returned guard drops
    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        let active = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        let mut peak = self.peak.load(Ordering::Relaxed);
        while active > peak {
            match self.peak.compare_exchange_weak(
                peak,
                active,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }

        InFlightGuard {
            gauge: Arc::clone(self),
        }
    }

    /// Workers running right now
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Highest concurrent count seen so far
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

/// Releases one slot of the gauge on drop
pub struct InFlightGuard {
    gauge: Arc<InFlightGauge>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.active.fetch_sub(1, Ordering::Relaxed);
    }
}
