//! HTTP client and fetch state machine for the global-warming.org API.
//!
//! The API is keyless; the only configuration is an optional `GW_API_BASE`
//! override (read via the environment / `.env`), which is also how tests and
//! mirrors point the client elsewhere. There is no caching, no automatic
//! retry, and no request timeout beyond transport defaults.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use reqwest::blocking::Client;

use crate::data::schema;
use crate::domain::{Dataset, RawRecord};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://global-warming.org/api";

/// Three-way status of the one outstanding request per view.
///
/// Exactly one variant holds at any time. `Ready` with zero matching records
/// after filtering is *not* `Failed`; the distinction is owned by the
/// projection stage.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Loading,
    Ready(Vec<RawRecord>),
    Failed(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from the environment (`.env` supported).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        match std::env::var("GW_API_BASE") {
            Ok(base) if base.trim().is_empty() => Err(AppError::new(
                2,
                "GW_API_BASE is set but empty; unset it to use the default API.",
            )),
            Ok(base) => Ok(Self::with_base_url(base)),
            Err(_) => Ok(Self::with_base_url(DEFAULT_BASE_URL)),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Issue one GET for the dataset and decode the payload.
    ///
    /// Non-2xx statuses and malformed bodies are surfaced verbatim as the
    /// failure reason; the caller decides how to render them.
    pub fn fetch(&self, dataset: Dataset) -> Result<Vec<RawRecord>, AppError> {
        let url = format!("{}{}", self.base_url, dataset.endpoint_path());
        tracing::debug!(%url, "fetching dataset");

        let resp = self.client.get(&url).send().map_err(|e| {
            AppError::network(format!(
                "Request for {} failed: {e}",
                dataset.display_name()
            ))
        })?;

        if !resp.status().is_success() {
            return Err(AppError::network(format!(
                "Request for {} failed with status {}.",
                dataset.display_name(),
                resp.status()
            )));
        }

        let body = resp.text().map_err(|e| {
            AppError::network(format!(
                "Failed to read {} response body: {e}",
                dataset.display_name()
            ))
        })?;

        schema::decode_records(dataset, &body)
    }
}

struct Completion {
    generation: u64,
    outcome: Result<Vec<RawRecord>, AppError>,
}

/// Runs fetches on background threads and hands results back over a channel.
///
/// Every `spawn` bumps a generation counter; `poll` drops completions whose
/// generation is not the latest, so a slow superseded request can never
/// overwrite the state of a newer one. In-flight requests are not cancelled,
/// only ignored on arrival.
pub struct FetchHandle {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    latest: u64,
}

impl FetchHandle {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, latest: 0 }
    }

    /// Start a fetch job on a background thread. Returns its generation.
    pub fn spawn<F>(&mut self, job: F) -> u64
    where
        F: FnOnce() -> Result<Vec<RawRecord>, AppError> + Send + 'static,
    {
        self.latest += 1;
        let generation = self.latest;
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = job();
            // The receiver may be gone if the view shut down; nothing to do.
            let _ = tx.send(Completion {
                generation,
                outcome,
            });
        });
        generation
    }

    /// Drain completed jobs, returning the newest current-generation result.
    ///
    /// Returns `None` while nothing (current) has completed. Never blocks.
    pub fn poll(&mut self) -> Option<FetchState> {
        let mut latest_state = None;
        while let Ok(done) = self.rx.try_recv() {
            if done.generation != self.latest {
                tracing::debug!(
                    generation = done.generation,
                    latest = self.latest,
                    "discarding stale fetch result"
                );
                continue;
            }
            latest_state = Some(match done.outcome {
                Ok(records) => FetchState::Ready(records),
                Err(err) => FetchState::Failed(err.to_string()),
            });
        }
        latest_state
    }
}

impl Default for FetchHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until(handle: &mut FetchHandle, timeout: Duration) -> Option<FetchState> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(state) = handle.poll() {
                return Some(state);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::with_base_url("http://localhost:9999/api/ ");
        assert_eq!(client.base_url, "http://localhost:9999/api");
    }

    #[test]
    fn failed_job_becomes_failed_state_with_reason() {
        let mut handle = FetchHandle::new();
        handle.spawn(|| Err(AppError::network("Request for CO2 failed with status 503.")));

        let state = poll_until(&mut handle, Duration::from_secs(2)).expect("job completes");
        match state {
            FetchState::Failed(reason) => {
                assert!(!reason.is_empty());
                assert!(reason.contains("503"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn successful_job_becomes_ready_state() {
        let mut handle = FetchHandle::new();
        handle.spawn(|| Ok(Vec::new()));

        let state = poll_until(&mut handle, Duration::from_secs(2)).expect("job completes");
        assert_eq!(state, FetchState::Ready(Vec::new()));
    }

    #[test]
    fn stale_generations_are_discarded() {
        let mut handle = FetchHandle::new();
        // Two requests raced: generation 1 finished after generation 2 was
        // already issued. Deliver both completions by hand so the test is
        // deterministic.
        handle.latest = 2;
        handle
            .tx
            .send(Completion {
                generation: 1,
                outcome: Ok(vec![RawRecord {
                    date: crate::domain::RecordDate::Period("190001".to_string()),
                    values: Vec::new(),
                }]),
            })
            .unwrap();
        assert_eq!(handle.poll(), None);

        handle
            .tx
            .send(Completion {
                generation: 2,
                outcome: Ok(Vec::new()),
            })
            .unwrap();
        assert_eq!(handle.poll(), Some(FetchState::Ready(Vec::new())));
    }
}
