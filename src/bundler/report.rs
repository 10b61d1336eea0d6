//! Results handed back by staging and packaging.

use crate::bundler::{error::Error, planner::BundleLayout};
use std::path::PathBuf;

/// One top-level source entry that could not be copied.
#[derive(Debug)]
pub struct CopyFailure {
    /// Entry name relative to the source directory.
    pub entry: String,
    /// Why the copy failed.
    pub error: Error,
}

/// Outcome of the best-effort bulk copy of the source tree.
#[derive(Debug, Default)]
pub struct SourceCopyReport {
    /// Entries considered after exclusions.
    pub attempted: usize,
    /// Entries copied successfully, in copy order.
    pub copied: Vec<String>,
    /// Entries that failed, in copy order.
    pub failures: Vec<CopyFailure>,
}

impl SourceCopyReport {
    /// Returns true if every attempted entry was copied.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of entries copied.
    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }
}

/// Result of a successful staging run ("bundle ready").
#[derive(Debug)]
pub struct BuildReport {
    /// Layout that was materialised.
    pub layout: BundleLayout,
    /// Bulk copy outcome.
    pub source_copy: SourceCopyReport,
}

impl BuildReport {
    /// Bundle root.
    pub fn root(&self) -> PathBuf {
        self.layout.root().to_path_buf()
    }
}

/// A produced AppImage with its artifact metadata.
///
/// Mirrors the size/checksum reporting of bundled artifacts so callers can
/// publish the checksum next to the image.
#[derive(Debug, Clone)]
pub struct PackagedImage {
    /// Output image path.
    pub path: PathBuf,
    /// Image size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the image.
    pub checksum: String,
    /// Captured tool stdout.
    pub stdout: String,
    /// Captured tool stderr.
    pub stderr: String,
}
