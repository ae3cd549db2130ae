//! Anonymous HTTP probing for container candidates
//!
//! A container candidate is confirmed when an anonymous GET of its listing
//! URL answers HTTP 200: the container exists and allows public enumeration.
//! Everything else is a miss. The one exception is a connection reset, which
//! is retried exactly once; the retried attempt's outcome is the one that is
//! surfaced to the caller.

use crate::error::Result;
use crate::events::{EventSink, Level, Outcome, Phase, ProbeEvent};
use crate::types::{ProbeConfig, ProbeResult, ProbeTarget};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Upper bound on transient-error retries per target.
const MAX_RETRIES: u32 = 1;

/// Anonymous container listing URL. The query string must match the storage
/// service byte for byte; any deviation breaks exposure detection.
pub fn listing_url(account_fqdn: &str, container: &str) -> String {
    format!("https://{account_fqdn}/{container}?restype=container&comp=list")
}

/// Probe failure classes. Only `ConnectionReset` is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    ConnectionReset,
    TimedOut,
    Connect,
    Other(String),
}

/// HTTP transport seam. The production backend wraps one pooled
/// `reqwest::Client` shared across the whole batch; tests substitute a
/// scripted fixture.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn fetch_status(&self, url: &str) -> std::result::Result<u16, FetchError>;
}

/// Production backend over a connection-pooled client.
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.concurrency)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn fetch_status(&self, url: &str) -> std::result::Result<u16, FetchError> {
        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(err) => Err(classify(&err)),
        }
    }
}

fn classify(err: &reqwest::Error) -> FetchError {
    if is_connection_reset(err) {
        FetchError::ConnectionReset
    } else if err.is_timeout() {
        FetchError::TimedOut
    } else if err.is_connect() {
        FetchError::Connect
    } else {
        FetchError::Other(err.to_string())
    }
}

/// Walk the source chain looking for an OS-level connection reset.
fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Concurrent HTTP prober with a bounded in-flight window.
pub struct HttpProber {
    backend: Arc<dyn HttpBackend>,
    semaphore: Semaphore,
    sink: Arc<dyn EventSink>,
}

impl HttpProber {
    /// Prober over a fresh pooled client.
    pub fn new(config: &ProbeConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let backend = Arc::new(ReqwestBackend::new(config)?);
        Ok(Self::with_backend(backend, config.concurrency, sink))
    }

    /// Prober over a caller-supplied backend.
    pub fn with_backend(
        backend: Arc<dyn HttpBackend>,
        concurrency: usize,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            backend,
            semaphore: Semaphore::new(concurrency.max(1)),
            sink,
        }
    }

    /// Probe every target and return once all requests have settled.
    /// Cancellation follows the same contract as the DNS prober: unissued
    /// probes are skipped, in-flight ones settle normally.
    pub async fn probe(
        &self,
        targets: Vec<ProbeTarget>,
        cancel: &CancellationToken,
    ) -> Vec<ProbeResult> {
        let requests = targets.into_iter().map(|target| async move {
            let _permit = match self.semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return skipped(target),
            };
            if cancel.is_cancelled() {
                return skipped(target);
            }
            self.probe_one(target).await
        });

        join_all(requests).await
    }

    /// Probe one URL with an explicit bounded retry loop. Whatever the final
    /// attempt produced — confirmed or discarded — is the surfaced outcome.
    async fn probe_one(&self, target: ProbeTarget) -> ProbeResult {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let (confirmed, level, outcome, detail) =
                match self.backend.fetch_status(&target.endpoint).await {
                    Ok(200) => (true, Level::Info, Outcome::Confirmed, None),
                    Ok(status) => (
                        false,
                        Level::Debug,
                        Outcome::Discarded,
                        Some(format!("HTTP {status}")),
                    ),
                    Err(FetchError::ConnectionReset) if attempt <= MAX_RETRIES => {
                        self.emit(
                            &target,
                            Level::Warn,
                            Outcome::Retried,
                            Some("connection reset".to_string()),
                        );
                        continue;
                    }
                    Err(FetchError::ConnectionReset) => (
                        false,
                        Level::Warn,
                        Outcome::Discarded,
                        Some("connection reset after retry".to_string()),
                    ),
                    Err(FetchError::TimedOut) => (
                        false,
                        Level::Debug,
                        Outcome::Discarded,
                        Some("timed out".to_string()),
                    ),
                    Err(FetchError::Connect) => (
                        false,
                        Level::Debug,
                        Outcome::Discarded,
                        Some("connection failed".to_string()),
                    ),
                    Err(FetchError::Other(message)) => {
                        (false, Level::Error, Outcome::Discarded, Some(message))
                    }
                };

            self.emit(&target, level, outcome, detail);
            return ProbeResult {
                candidate: target.candidate,
                endpoint: target.endpoint,
                confirmed,
                attempt,
            };
        }
    }

    fn emit(&self, target: &ProbeTarget, level: Level, outcome: Outcome, detail: Option<String>) {
        self.sink.emit(ProbeEvent {
            level,
            phase: Phase::ContainerProbe,
            candidate: target.candidate.name.clone(),
            endpoint: target.endpoint.clone(),
            outcome,
            detail,
        });
    }
}

fn skipped(target: ProbeTarget) -> ProbeResult {
    ProbeResult {
        candidate: target.candidate,
        endpoint: target.endpoint,
        confirmed: false,
        attempt: 0,
    }
}
