//! Blob enumeration for confirmed containers
//!
//! The scan core hands over `ContainerHit` records; this collaborator lists
//! the blobs inside each exposed container. Listing stays anonymous: the
//! same `?restype=container&comp=list` endpoint that confirmed the exposure
//! also returns the container's enumeration XML, so no SDK or credentials
//! are involved.

use crate::error::{BlobForgeError, Result};
use crate::probe::listing_url;
use crate::types::{ContainerHit, ProbeConfig};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;

/// One blob inside an exposed container. Service-returned timestamps are
/// kept verbatim (RFC 1123 strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobRecord {
    pub name: String,
    pub container: String,
    pub url: String,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

/// Collaborator seam for blob enumeration.
#[async_trait]
pub trait BlobEnumerator: Send + Sync {
    async fn list_blobs(&self, hit: &ContainerHit) -> Result<Vec<BlobRecord>>;
}

/// Anonymous REST-based blob lister.
pub struct RestBlobEnumerator {
    client: Client,
}

impl RestBlobEnumerator {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BlobEnumerator for RestBlobEnumerator {
    async fn list_blobs(&self, hit: &ContainerHit) -> Result<Vec<BlobRecord>> {
        let url = listing_url(&hit.storage_account, &hit.container_name);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlobForgeError::network(
                format!("listing request failed with status {status}"),
                Some(status.as_u16()),
                Some(url),
            ));
        }

        let body = response.text().await?;
        Ok(parse_listing(&body, hit))
    }
}

/// Extract blob records from an EnumerationResults document.
fn parse_listing(xml: &str, hit: &ContainerHit) -> Vec<BlobRecord> {
    let blob_block = Regex::new(r"(?s)<Blob>(.*?)</Blob>").expect("static pattern");

    blob_block
        .captures_iter(xml)
        .filter_map(|block| {
            let block = block.get(1)?.as_str();
            let name = tag_text(block, "Name")?;
            Some(BlobRecord {
                url: format!(
                    "https://{}/{}/{}",
                    hit.storage_account, hit.container_name, name
                ),
                container: hit.container_name.clone(),
                last_modified: tag_text(block, "Last-Modified"),
                etag: tag_text(block, "Etag"),
                content_length: tag_text(block, "Content-Length")
                    .and_then(|v| v.parse().ok()),
                content_type: tag_text(block, "Content-Type"),
                name,
            })
        })
        .collect()
}

fn tag_text(block: &str, tag: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"<{tag}>([^<]*)</{tag}>")).ok()?;
    pattern
        .captures(block)
        .map(|c| c[1].to_string())
        .filter(|s| !s.is_empty())
}
