//! Revision history parsing and structured log queries.
//!
//! The backend's native log output lists revisions newest first. Everything
//! exposed from this module is re-presented oldest first.

use crate::backend::VersionStore;
use crate::error::{ReditError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A two-component revision identifier, e.g. `1.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevisionId {
    /// Branch component.
    pub major: u32,
    /// Sequence component within the branch.
    pub minor: u32,
}

impl FromStr for RevisionId {
    type Err = ReditError;

    /// Parses `<non-negative integer>.<non-negative integer>`, nothing else.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ReditError::InvalidRevision(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        if major.is_empty()
            || minor.is_empty()
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// One parsed revision record. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Revision identifier.
    pub revision: RevisionId,
    /// Timestamp string as printed by the backend (`YYYY/MM/DD HH:MM:SS`).
    pub timestamp: String,
    /// Author recorded for the revision.
    pub author: String,
    /// Commit message, possibly multi-line.
    pub message: String,
}

/// Marker separating revision blocks in the backend's log output.
const REVISION_SEPARATOR: &str = "----------------------------";
/// Marker terminating the backend's log output.
const LOG_TERMINATOR: &str = "=============================================================================";

/// Queries the backend log and diff primitives on behalf of the CLI.
pub struct HistoryQueryService<'a> {
    store: &'a dyn VersionStore,
}

impl<'a> HistoryQueryService<'a> {
    /// Creates a query service over the given backend.
    pub fn new(store: &'a dyn VersionStore) -> Self {
        Self { store }
    }

    /// Returns the full revision history for a store entry, oldest first.
    pub fn log(&self, entry: &Path) -> Result<Vec<HistoryEntry>> {
        let raw = self.store.log(entry)?;
        Ok(parse_log(&raw))
    }

    /// Renders the diff between two revisions, or between `rev1` and the
    /// current working file when `rev2` is omitted.
    pub fn diff(
        &self,
        entry: &Path,
        working: &Path,
        rev1: RevisionId,
        rev2: Option<RevisionId>,
    ) -> Result<String> {
        self.store.diff_revs(entry, working, rev1, rev2)
    }
}

/// Parses the backend's native log text into structured entries.
///
/// Recognizes `revision X.Y` lines following a separator, a
/// `date: ...; author: ...; state: ...;` line, and accumulates everything up
/// to the next separator (or the terminator) as the message. Input order is
/// newest first; the returned vector is oldest first.
pub fn parse_log(raw: &str) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();
    let mut lines = raw.lines().peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with(REVISION_SEPARATOR) {
            continue;
        }
        let Some(rev_line) = lines.next() else { break };
        let Some(rev) = rev_line.strip_prefix("revision ") else {
            continue;
        };
        // Trailing lock annotations ("revision 1.3\tlocked by: alice;") are
        // not part of the identifier.
        let rev = rev.split_whitespace().next().unwrap_or(rev);
        let Ok(revision) = rev.parse::<RevisionId>() else {
            continue;
        };

        let mut timestamp = String::new();
        let mut author = String::new();
        if let Some(meta) = lines.next() {
            for field in meta.split(';') {
                let field = field.trim();
                if let Some(v) = field.strip_prefix("date: ") {
                    timestamp = v.trim().to_string();
                } else if let Some(v) = field.strip_prefix("author: ") {
                    author = v.trim().to_string();
                }
            }
        }

        let mut message = String::new();
        while let Some(peek) = lines.peek() {
            if peek.starts_with(REVISION_SEPARATOR) || peek.starts_with(LOG_TERMINATOR) {
                break;
            }
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(lines.next().unwrap_or_default());
        }

        entries.push(HistoryEntry {
            revision,
            timestamp,
            author,
            message,
        });
    }

    entries.reverse();
    entries
}
