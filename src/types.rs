//! Core types and configuration for blob-forge

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Naming namespace a candidate belongs to.
///
/// Azure storage accounts and containers follow different naming rules, so
/// every candidate carries the namespace it was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Account,
    Container,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Account => write!(f, "account"),
            Namespace::Container => write!(f, "container"),
        }
    }
}

/// How a candidate string was derived from the organization identifier and
/// the keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// The organization identifier (or account base name) used verbatim.
    Bare,
    /// A keyword used on its own.
    KeywordOnly,
    /// keyword + identifier, no separator.
    Prepend,
    /// identifier + keyword, no separator.
    Append,
    /// keyword-identifier. Container namespace only.
    PrependDashed,
    /// identifier-keyword. Container namespace only.
    AppendDashed,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Bare => write!(f, "bare"),
            Strategy::KeywordOnly => write!(f, "keyword-only"),
            Strategy::Prepend => write!(f, "prepend"),
            Strategy::Append => write!(f, "append"),
            Strategy::PrependDashed => write!(f, "prepend-dashed"),
            Strategy::AppendDashed => write!(f, "append-dashed"),
        }
    }
}

/// A generated name proposed for probing.
///
/// Candidates are ephemeral: they exist for one generate-validate-probe cycle
/// and are discarded with the batch results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub namespace: Namespace,
    pub strategy: Strategy,
}

impl Candidate {
    pub fn new(name: impl Into<String>, namespace: Namespace, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            namespace,
            strategy,
        }
    }
}

/// A candidate bound to the concrete endpoint that will be probed: an FQDN
/// for the DNS phase, a listing URL for the HTTP phase.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub candidate: Candidate,
    pub endpoint: String,
}

/// Settled outcome of probing one target.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub candidate: Candidate,
    pub endpoint: String,
    pub confirmed: bool,
    /// Which attempt produced this outcome. 1 for a first-try result, 2 for
    /// an outcome settled by the single transient-error retry, 0 if the probe
    /// was never issued (cancelled before start).
    pub attempt: u32,
}

/// Handoff record for a confirmed publicly-listable container, consumed by
/// the blob-enumeration collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHit {
    /// Storage account FQDN, e.g. `acmebackup.blob.core.windows.net`.
    pub storage_account: String,
    /// Container name, e.g. `backup`.
    pub container_name: String,
}

impl ContainerHit {
    /// Account base name: the leftmost DNS label of the account FQDN.
    pub fn account_base(&self) -> &str {
        self.storage_account
            .split('.')
            .next()
            .unwrap_or(&self.storage_account)
    }
}

/// Configuration shared by both probers.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Maximum in-flight probes per phase.
    pub concurrency: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with HTTP probes.
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 50,
            timeout: Duration::from_secs(10),
            user_agent: format!("blob-forge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration for a whole scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub probe: ProbeConfig,
    /// Degree of cross-organization parallelism. 1 (the default) processes
    /// organizations strictly sequentially; probes within each phase are
    /// always concurrent.
    pub org_parallelism: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            org_parallelism: 1,
        }
    }
}

/// Progress snapshot handed to the scan progress callback after each
/// organization completes.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub organizations_done: usize,
    pub organizations_total: usize,
    pub accounts_confirmed: usize,
    pub containers_confirmed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_display() {
        assert_eq!(Namespace::Account.to_string(), "account");
        assert_eq!(Namespace::Container.to_string(), "container");
    }

    #[test]
    fn account_base_strips_suffix() {
        let hit = ContainerHit {
            storage_account: "acmebackup.blob.core.windows.net".to_string(),
            container_name: "backup".to_string(),
        };
        assert_eq!(hit.account_base(), "acmebackup");
    }

    #[test]
    fn default_scan_config_is_sequential() {
        let config = ScanConfig::default();
        assert_eq!(config.org_parallelism, 1);
        assert!(config.probe.concurrency > 0);
    }
}
