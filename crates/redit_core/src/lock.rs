//! Edit-lock coordination.
//!
//! Exclusivity is enforced entirely by the external backend; this module's
//! job is to query and respect the reported holder. The holder is derived on
//! demand from the backend's log output, never stored.

use crate::backend::VersionStore;
use crate::error::Result;
use std::path::Path;

/// Coordinates the exclusive edit lock on one store entry.
pub struct LockCoordinator<'a> {
    store: &'a dyn VersionStore,
}

impl<'a> LockCoordinator<'a> {
    /// Creates a coordinator over the given backend.
    pub fn new(store: &'a dyn VersionStore) -> Self {
        Self { store }
    }

    /// Name of the current lock holder; empty string means unlocked.
    pub fn holder(&self, entry: &Path) -> Result<String> {
        let log = self.store.log(entry)?;
        Ok(parse_holder(&log))
    }

    /// Acquires the lock on the entry's head revision.
    pub fn lock(&self, entry: &Path) -> Result<()> {
        self.store.lock(entry)
    }

    /// Releases the lock, whoever holds it.
    pub fn unlock(&self, entry: &Path) -> Result<()> {
        self.store.unlock(entry)
    }
}

/// Extracts the `locked by: NAME` token from backend log output. The token
/// appears mid-line as a revision annotation
/// (`revision 1.2\tlocked by: alice;`) or, in some log sources, on a line of
/// its own.
fn parse_holder(log: &str) -> String {
    log.lines()
        .find_map(|line| {
            let idx = line.find("locked by:")?;
            let name = line[idx + "locked by:".len()..]
                .split(';')
                .next()
                .unwrap_or_default()
                .trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .unwrap_or_default()
}
