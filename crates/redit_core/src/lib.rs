//! redit core library
//!
//! Transactional version-control semantics for ad-hoc file editing:
//! - Store-location resolution (local vs. shared remote, cached via
//!   directory metadata)
//! - Exclusive edit locks and conflict handling
//! - Pre-edit drift detection with three-way resolution
//! - Permission-bit bookkeeping across the edit lifecycle
//! - Multi-file batch sessions sharing one editor invocation
//!
//! Revision storage itself is an external backend reached through the
//! [`VersionStore`] command contract; this crate re-derives consistent
//! session state from the filesystem and the store on every invocation.
//!
//! # Quick start
//!
//! ```no_run
//! use redit_core::{
//!     Config, FileMetadata, RcsBackend, SentinelSummarizer, SessionOrchestrator, TermInteract,
//! };
//!
//! let config = Config::load().unwrap();
//! let store = RcsBackend::new();
//! let metadata = FileMetadata;
//! let summarizer = SentinelSummarizer;
//! let orchestrator = SessionOrchestrator::new(&config, &store, &metadata, &summarizer);
//!
//! let mut ui = TermInteract::new();
//! let report = orchestrator
//!     .run_batch(&["notes.txt".into()], &mut ui, "vi", None)
//!     .unwrap();
//! assert!(report.is_clean());
//! ```

mod backend;
mod config;
mod drift;
mod editor;
mod error;
mod history;
mod interact;
mod lock;
mod metadata;
mod perms;
mod resolver;
mod session;
mod summary;


pub use backend::{RcsBackend, VersionStore};
pub use config::{home_dir, Config, SessionConfig, StoreConfig, SummaryConfig};
pub use drift::{check as check_drift, DriftStatus};
pub use editor::{edit_files, resolve_editor, resolve_editor_from, syntax_check};
pub use error::{ReditError, Result};
pub use history::{parse_log, HistoryEntry, HistoryQueryService, RevisionId};
pub use interact::{Interact, ScriptedInteract, TermInteract};
pub use lock::LockCoordinator;
pub use metadata::{platform_metadata, DirectoryMetadata, FileMetadata, XattrMetadata, HINT_KEY};
pub use perms::{capture as capture_mode, restore as restore_mode, strip_write};
pub use resolver::{StoreKind, StoreLocationResolver, StoreRoot, LOCAL_HINT};
pub use session::{BatchReport, FileSession, SessionOrchestrator};
pub use summary::{
    sanitize, CommandSummarizer, CommitMessageProvider, SentinelSummarizer, SENTINEL_MESSAGE,
};
