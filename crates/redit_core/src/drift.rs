//! Pre-edit drift detection.
//!
//! Before a checkout the working file is compared against the store's latest
//! recorded revision. Any byte-level difference is drift: the file changed
//! out of band since the last checkin.

use crate::backend::VersionStore;
use crate::error::Result;
use std::path::Path;

/// Result of comparing a working file against the store head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftStatus {
    /// Working file matches the latest committed revision.
    Clean,
    /// Working file differs; carries the unified diff.
    Diverged(String),
}

/// Compares the working file against the store head.
pub fn check(store: &dyn VersionStore, entry: &Path, working: &Path) -> Result<DriftStatus> {
    let diff = store.diff_head(entry, working)?;
    if diff.trim().is_empty() {
        Ok(DriftStatus::Clean)
    } else {
        Ok(DriftStatus::Diverged(diff))
    }
}
