//! CSV export of blob listings
//!
//! One file per exposed container, grouped under a per-organization
//! directory: `<output>/<org>/<org>_<accountbase>_<container>_<date>.csv`.
//! An existing file for the same container and date is overwritten.

use crate::error::{BlobForgeError, Result};
use crate::export::BlobRecord;
use crate::types::ContainerHit;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes blob listings as CSV under a fixed output root.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write one container's blobs. Returns the created file path.
    pub fn write_blobs(
        &self,
        organization: &str,
        hit: &ContainerHit,
        blobs: &[BlobRecord],
    ) -> Result<PathBuf> {
        let dir = self.output_dir.join(organization);
        fs::create_dir_all(&dir).map_err(|e| {
            BlobForgeError::io(
                format!("failed to create output directory: {e}"),
                Some(dir.display().to_string()),
            )
        })?;

        let filename = format!(
            "{}_{}_{}_{}.csv",
            organization,
            hit.account_base(),
            hit.container_name,
            Utc::now().format("%Y-%m-%d"),
        );
        let path = dir.join(filename);

        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| csv_error(&path, e))?;
        for blob in blobs {
            writer.serialize(blob).map_err(|e| csv_error(&path, e))?;
        }
        writer.flush().map_err(|e| {
            BlobForgeError::io(e.to_string(), Some(path.display().to_string()))
        })?;

        Ok(path)
    }
}

fn csv_error(path: &Path, err: csv::Error) -> BlobForgeError {
    BlobForgeError::io(err.to_string(), Some(path.display().to_string()))
}
