//! Scan orchestration
//!
//! Drives the per-organization pipeline: generate account candidates,
//! DNS-probe them, then for each confirmed account generate container
//! candidates and HTTP-probe their listing URLs. Each phase completes fully
//! before the next begins; container probing consumes the confirmed-account
//! set as input. Organizations are processed sequentially by default, with
//! `ScanConfig::org_parallelism` as the opt-in cross-organization degree.

use crate::error::Result;
use crate::events::{EventSink, TracingSink};
use crate::naming::CandidateGenerator;
use crate::probe::{listing_url, DnsProber, HttpProber};
use crate::types::{ContainerHit, ProbeTarget, ScanConfig, ScanProgress};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Findings for one organization.
#[derive(Debug, Clone)]
pub struct OrganizationReport {
    pub organization: String,
    /// Confirmed storage account FQDNs.
    pub accounts: Vec<String>,
    /// Confirmed publicly-listable containers.
    pub containers: Vec<ContainerHit>,
}

/// Pipeline orchestrator.
pub struct Scanner {
    config: ScanConfig,
    generator: CandidateGenerator,
    dns: DnsProber,
    http: HttpProber,
    cancel: CancellationToken,
}

impl Scanner {
    /// Scanner over the system resolver and a fresh HTTP client, reporting
    /// through `tracing`.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Scanner reporting through a caller-supplied event sink.
    pub fn with_sink(config: ScanConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let dns = DnsProber::new(&config.probe, Arc::clone(&sink))?;
        let http = HttpProber::new(&config.probe, sink)?;
        Ok(Self::from_parts(config, dns, http))
    }

    /// Scanner over caller-supplied probers.
    pub fn from_parts(config: ScanConfig, dns: DnsProber, http: HttpProber) -> Self {
        Self {
            config,
            generator: CandidateGenerator::new(),
            dns,
            http,
            cancel: CancellationToken::new(),
        }
    }

    /// Handle for external cancellation (deadline, Ctrl-C). Once cancelled,
    /// no new probes are issued; in-flight ones settle and already-collected
    /// findings remain valid.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the full pipeline for every organization, invoking `on_progress`
    /// after each one completes.
    pub async fn scan<F>(
        &self,
        organizations: &[String],
        keywords: &[String],
        suffixes: &[String],
        on_progress: F,
    ) -> Vec<OrganizationReport>
    where
        F: Fn(&ScanProgress) + Send + Sync,
    {
        let parallelism = self.config.org_parallelism.max(1);
        let mut pipelines = stream::iter(
            organizations
                .iter()
                .map(|org| self.scan_organization(org, keywords, suffixes)),
        )
        .buffer_unordered(parallelism);

        let mut reports = Vec::with_capacity(organizations.len());
        let mut accounts_confirmed = 0;
        let mut containers_confirmed = 0;
        while let Some(report) = pipelines.next().await {
            accounts_confirmed += report.accounts.len();
            containers_confirmed += report.containers.len();
            reports.push(report);
            on_progress(&ScanProgress {
                organizations_done: reports.len(),
                organizations_total: organizations.len(),
                accounts_confirmed,
                containers_confirmed,
            });
        }
        reports
    }

    /// Run the pipeline for a single organization.
    pub async fn scan_organization(
        &self,
        organization: &str,
        keywords: &[String],
        suffixes: &[String],
    ) -> OrganizationReport {
        let accounts = self
            .probe_accounts(organization, keywords, suffixes)
            .await;

        let mut containers = Vec::new();
        for account_fqdn in &accounts {
            if self.cancel.is_cancelled() {
                break;
            }
            containers.extend(
                self.probe_containers(organization, account_fqdn, keywords)
                    .await,
            );
        }

        OrganizationReport {
            organization: organization.to_string(),
            accounts,
            containers,
        }
    }

    /// Account phase: candidate × suffix cross product, DNS-probed. Returns
    /// confirmed FQDNs.
    async fn probe_accounts(
        &self,
        organization: &str,
        keywords: &[String],
        suffixes: &[String],
    ) -> Vec<String> {
        let candidates = self.generator.account_candidates(organization, keywords);

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(candidates.len() * suffixes.len());
        for suffix in suffixes {
            for candidate in &candidates {
                let fqdn = format!("{}.{}", candidate.name, suffix);
                if seen.insert(fqdn.clone()) {
                    targets.push(ProbeTarget {
                        candidate: candidate.clone(),
                        endpoint: fqdn,
                    });
                }
            }
        }

        self.dns
            .probe(targets, &self.cancel)
            .await
            .into_iter()
            .filter(|result| result.confirmed)
            .map(|result| result.endpoint)
            .collect()
    }

    /// Container phase for one confirmed account.
    async fn probe_containers(
        &self,
        organization: &str,
        account_fqdn: &str,
        keywords: &[String],
    ) -> Vec<ContainerHit> {
        let account_base = account_fqdn.split('.').next().unwrap_or(account_fqdn);
        let candidates = self
            .generator
            .container_candidates(organization, account_base, keywords);

        let targets = candidates
            .into_iter()
            .map(|candidate| {
                let endpoint = listing_url(account_fqdn, &candidate.name);
                ProbeTarget {
                    candidate,
                    endpoint,
                }
            })
            .collect();

        self.http
            .probe(targets, &self.cancel)
            .await
            .into_iter()
            .filter(|result| result.confirmed)
            .map(|result| ContainerHit {
                storage_account: account_fqdn.to_string(),
                container_name: result.candidate.name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::probe::{FetchError, HttpBackend, ResolveBackend};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FixtureResolver {
        live: Vec<String>,
    }

    #[async_trait]
    impl ResolveBackend for FixtureResolver {
        async fn resolve_a(&self, fqdn: &str) -> bool {
            self.live.iter().any(|l| l == fqdn)
        }
    }

    struct FixtureHttp {
        listable: Vec<String>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpBackend for FixtureHttp {
        async fn fetch_status(&self, url: &str) -> std::result::Result<u16, FetchError> {
            self.requested.lock().push(url.to_string());
            if self.listable.iter().any(|l| l == url) {
                Ok(200)
            } else {
                Ok(404)
            }
        }
    }

    fn scanner(
        live_fqdns: &[&str],
        listable_urls: &[&str],
    ) -> (Scanner, Arc<FixtureHttp>) {
        let sink = Arc::new(MemorySink::new());
        let resolver = Arc::new(FixtureResolver {
            live: live_fqdns.iter().map(|s| s.to_string()).collect(),
        });
        let http = Arc::new(FixtureHttp {
            listable: listable_urls.iter().map(|s| s.to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        });

        let dns = DnsProber::with_backend(resolver, 8, sink.clone());
        let http_prober = HttpProber::with_backend(http.clone(), 8, sink);
        (
            Scanner::from_parts(ScanConfig::default(), dns, http_prober),
            http,
        )
    }

    #[tokio::test]
    async fn pipeline_confirms_account_then_container() {
        let (scanner, http) = scanner(
            &["acmebackup.blob.core.windows.net"],
            &["https://acmebackup.blob.core.windows.net/backup?restype=container&comp=list"],
        );

        let report = scanner
            .scan_organization(
                "acme",
                &["backup".to_string()],
                &["blob.core.windows.net".to_string()],
            )
            .await;

        assert_eq!(report.accounts, vec!["acmebackup.blob.core.windows.net"]);
        assert_eq!(
            report.containers,
            vec![ContainerHit {
                storage_account: "acmebackup.blob.core.windows.net".to_string(),
                container_name: "backup".to_string(),
            }]
        );

        // Containers were only probed under the DNS-confirmed account.
        assert!(http
            .requested
            .lock()
            .iter()
            .all(|url| url.starts_with("https://acmebackup.blob.core.windows.net/")));
    }

    #[tokio::test]
    async fn unconfirmed_account_gets_no_container_probes() {
        let (scanner, http) = scanner(&[], &[]);

        let report = scanner
            .scan_organization(
                "acme",
                &["backup".to_string()],
                &["blob.core.windows.net".to_string()],
            )
            .await;

        assert!(report.accounts.is_empty());
        assert!(report.containers.is_empty());
        assert!(http.requested.lock().is_empty());
    }

    #[tokio::test]
    async fn scan_reports_progress_per_organization() {
        let (scanner, _http) = scanner(&["acmebackup.blob.core.windows.net"], &[]);

        let progress = Mutex::new(Vec::new());
        let reports = scanner
            .scan(
                &["acme".to_string(), "globex".to_string()],
                &["backup".to_string()],
                &["blob.core.windows.net".to_string()],
                |p| progress.lock().push((p.organizations_done, p.accounts_confirmed)),
            )
            .await;

        assert_eq!(reports.len(), 2);
        let progress = progress.lock();
        assert_eq!(progress.len(), 2);
        assert_eq!(progress.last(), Some(&(2, 1)));
    }

    #[tokio::test]
    async fn cancelled_scanner_confirms_nothing() {
        let (scanner, http) = scanner(
            &["acmebackup.blob.core.windows.net"],
            &["https://acmebackup.blob.core.windows.net/backup?restype=container&comp=list"],
        );
        scanner.cancellation_token().cancel();

        let report = scanner
            .scan_organization(
                "acme",
                &["backup".to_string()],
                &["blob.core.windows.net".to_string()],
            )
            .await;

        assert!(report.accounts.is_empty());
        assert!(report.containers.is_empty());
        assert!(http.requested.lock().is_empty());
    }
}
