//! External collaborators fed by the scan core: blob enumeration for
//! confirmed containers and tabular export of the results.

pub mod blobs;
pub mod report;

pub use blobs::{BlobEnumerator, BlobRecord, RestBlobEnumerator};
pub use report::CsvExporter;
