//! Error types for redit_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for redit_core operations.
#[derive(Error, Debug)]
pub enum ReditError {
    /// A store root for the file could not be determined or created.
    #[error("cannot resolve a revision store for {}: {}", path.display(), reason)]
    StoreResolution {
        /// The working file whose store could not be resolved
        path: PathBuf,
        /// Description of what went wrong
        reason: String,
    },

    /// The store entry is locked by another identity and the override was declined.
    #[error("locked by {holder}")]
    LockConflict {
        /// Name of the current lock holder
        holder: String,
    },

    /// The working file diverged from the store head and the session was aborted.
    #[error("working file diverged from the latest revision")]
    DriftAborted,

    /// The file has more than one hard link; its identity under mode
    /// manipulation is ambiguous.
    #[error("{} has {count} hard links, refusing to edit", path.display())]
    MultipleHardLinks {
        /// The offending file
        path: PathBuf,
        /// Observed link count
        count: u64,
    },

    /// A store backend command exited non-zero.
    #[error("backend command failed: {command} (exit {status}): {stderr}")]
    BackendInvocation {
        /// The command line that was run
        command: String,
        /// Exit status (or -1 if terminated by signal)
        status: i32,
        /// Captured standard error, trimmed
        stderr: String,
    },

    /// A revision identifier did not match `<number>.<number>`.
    #[error("invalid revision id: {0}")]
    InvalidRevision(String),

    /// More files were requested than the batch ceiling allows.
    #[error("{requested} files requested, at most {max} may be edited at once")]
    BatchTooLarge {
        /// Number of files on the command line
        requested: usize,
        /// Configured ceiling
        max: usize,
    },

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The user declined a prompt that was required to continue.
    #[error("declined: {0}")]
    Declined(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReditError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::LockConflict { .. } => {
                Some("Wait for the holder to check the file back in, or re-run and accept the force-unlock prompt.")
            }
            Self::BatchTooLarge { .. } => {
                Some("Edit fewer files per invocation, or raise the ceiling with --max-files.")
            }
            Self::StoreResolution { .. } => {
                Some("Check that the cached store hint points at an existing directory; re-running will re-prompt.")
            }
            Self::MultipleHardLinks { .. } => {
                Some("Break the extra hard links first; editing a multiply-linked file would desynchronize its aliases.")
            }
            _ => None,
        }
    }
}

/// Convenience Result type for redit_core operations.
pub type Result<T> = std::result::Result<T, ReditError>;
