//! Concurrent network probing: DNS existence checks for storage accounts and
//! anonymous HTTP listing checks for containers.
//!
//! Both probers share the same batch contract: the call settles every target
//! in the batch before returning (gather semantics), per-target outcomes are
//! independent, one slow or failing probe never blocks or cancels a sibling,
//! and in-flight fan-out is bounded by the configured concurrency limit.

pub mod dns;
pub mod http;

pub use dns::{DnsProber, ResolveBackend};
pub use http::{listing_url, FetchError, HttpBackend, HttpProber};
