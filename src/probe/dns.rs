//! DNS existence probing for storage account candidates
//!
//! A storage account candidate is confirmed when its FQDN resolves to an A
//! record. Resolution failures of any kind mean "no such account" and are
//! discarded without surfacing an error; negative outcomes vastly outnumber
//! hits on a real scan.

use crate::error::{BlobForgeError, Result};
use crate::events::{EventSink, Level, Outcome, Phase, ProbeEvent};
use crate::types::{ProbeConfig, ProbeResult, ProbeTarget};
use async_trait::async_trait;
use futures::future::join_all;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Resolver seam. The production backend wraps a shared `hickory` resolver;
/// tests substitute a fixture.
#[async_trait]
pub trait ResolveBackend: Send + Sync {
    /// True when an A record exists for `fqdn`.
    async fn resolve_a(&self, fqdn: &str) -> bool;
}

/// Production backend over a shared `hickory-resolver` handle. The resolver
/// is safe for concurrent use and holds no per-candidate state.
pub struct HickoryBackend {
    resolver: TokioResolver,
}

impl HickoryBackend {
    /// Build a resolver from the system configuration.
    pub fn from_system_conf() -> Result<Self> {
        let resolver = TokioResolver::builder(TokioConnectionProvider::default())
            .map_err(|e| BlobForgeError::config(format!("failed to read resolver config: {e}")))?
            .build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl ResolveBackend for HickoryBackend {
    async fn resolve_a(&self, fqdn: &str) -> bool {
        match self.resolver.ipv4_lookup(fqdn).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(_) => false,
        }
    }
}

/// Concurrent DNS prober with a bounded in-flight window.
pub struct DnsProber {
    backend: Arc<dyn ResolveBackend>,
    semaphore: Semaphore,
    sink: Arc<dyn EventSink>,
}

impl DnsProber {
    /// Prober over the system resolver.
    pub fn new(config: &ProbeConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let backend = Arc::new(HickoryBackend::from_system_conf()?);
        Ok(Self::with_backend(backend, config.concurrency, sink))
    }

    /// Prober over a caller-supplied backend.
    pub fn with_backend(
        backend: Arc<dyn ResolveBackend>,
        concurrency: usize,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            backend,
            semaphore: Semaphore::new(concurrency.max(1)),
            sink,
        }
    }

    /// Probe every target and return once all lookups have settled.
    ///
    /// Once `cancel` fires, targets that have not started are skipped
    /// (`attempt == 0`) while already-issued lookups run to completion, so
    /// the returned set is never corrupted by cancellation.
    pub async fn probe(
        &self,
        targets: Vec<ProbeTarget>,
        cancel: &CancellationToken,
    ) -> Vec<ProbeResult> {
        let lookups = targets.into_iter().map(|target| async move {
            let _permit = match self.semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return skipped(target),
            };
            if cancel.is_cancelled() {
                return skipped(target);
            }

            let confirmed = self.backend.resolve_a(&target.endpoint).await;
            self.sink.emit(ProbeEvent {
                level: if confirmed { Level::Info } else { Level::Debug },
                phase: Phase::AccountProbe,
                candidate: target.candidate.name.clone(),
                endpoint: target.endpoint.clone(),
                outcome: if confirmed {
                    Outcome::Confirmed
                } else {
                    Outcome::Discarded
                },
                detail: None,
            });

            ProbeResult {
                candidate: target.candidate,
                endpoint: target.endpoint,
                confirmed,
                attempt: 1,
            }
        });

        join_all(lookups).await
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::types::{Candidate, Namespace, Strategy};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixtureBackend {
        live: HashSet<String>,
        calls: AtomicUsize,
    }

    impl FixtureBackend {
        fn new(live: &[&str]) -> Self {
            Self {
                live: live.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResolveBackend for FixtureBackend {
        async fn resolve_a(&self, fqdn: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.live.contains(fqdn)
        }
    }

    fn target(name: &str, suffix: &str) -> ProbeTarget {
        ProbeTarget {
            candidate: Candidate::new(name, Namespace::Account, Strategy::Bare),
            endpoint: format!("{name}.{suffix}"),
        }
    }

    fn targets() -> Vec<ProbeTarget> {
        [
            "acme", "acmebackup", "backupacme", "acmedata", "dataacme", "acmedev", "devacme",
            "acmeprod", "prodacme", "acmetest",
        ]
        .iter()
        .map(|name| target(name, "blob.core.windows.net"))
        .collect()
    }

    #[tokio::test]
    async fn confirms_only_resolving_fqdns() {
        let backend = Arc::new(FixtureBackend::new(&["acmebackup.blob.core.windows.net"]));
        let prober = DnsProber::with_backend(backend.clone(), 4, Arc::new(MemorySink::new()));

        let results = prober.probe(targets(), &CancellationToken::new()).await;

        assert_eq!(results.len(), 10);
        let confirmed: Vec<_> = results
            .iter()
            .filter(|r| r.confirmed)
            .map(|r| r.endpoint.as_str())
            .collect();
        assert_eq!(confirmed, vec!["acmebackup.blob.core.windows.net"]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn probing_is_idempotent() {
        let backend = Arc::new(FixtureBackend::new(&["acmebackup.blob.core.windows.net"]));
        let prober = DnsProber::with_backend(backend, 4, Arc::new(MemorySink::new()));

        let first: HashSet<String> = prober
            .probe(targets(), &CancellationToken::new())
            .await
            .into_iter()
            .filter(|r| r.confirmed)
            .map(|r| r.endpoint)
            .collect();
        let second: HashSet<String> = prober
            .probe(targets(), &CancellationToken::new())
            .await
            .into_iter()
            .filter(|r| r.confirmed)
            .map(|r| r.endpoint)
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn cancelled_token_issues_no_lookups() {
        let backend = Arc::new(FixtureBackend::new(&["acmebackup.blob.core.windows.net"]));
        let prober = DnsProber::with_backend(backend.clone(), 4, Arc::new(MemorySink::new()));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let results = prober.probe(targets(), &cancel).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(results.iter().all(|r| !r.confirmed && r.attempt == 0));
    }
}
