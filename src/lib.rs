//! Blob Forge - Azure storage exposure scanning
//!
//! Derives storage account and container name candidates from an
//! organization identifier plus a keyword list, then confirms them against
//! live infrastructure with concurrent DNS and anonymous HTTP probes.

pub mod error;
pub mod events;
pub mod export;
pub mod naming;
pub mod probe;
pub mod scan;
pub mod types;
pub mod wordlist;

// Re-export commonly used types
pub use error::{BlobForgeError, Result};
pub use events::{EventSink, MemorySink, ProbeEvent, TracingSink};
pub use naming::{CandidateGenerator, NameValidator};
pub use probe::{listing_url, DnsProber, HttpProber};
pub use scan::{OrganizationReport, Scanner};
pub use types::{
    Candidate, ContainerHit, Namespace, ProbeConfig, ProbeResult, ProbeTarget, ScanConfig,
    ScanProgress, Strategy,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
