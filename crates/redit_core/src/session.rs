//! Checkout/checkin session orchestration.
//!
//! Drives one file through
//! resolve -> initialize-if-new -> lock-conflict-check -> drift-check -> acquire-lock
//! and symmetrically back through
//! diff -> summarize -> checkin -> unlock -> restore-permissions,
//! batching multiple files into a single editor invocation. Every step
//! failure aborts that file only; other files in the batch are unaffected.

use crate::backend::VersionStore;
use crate::config::Config;
use crate::drift::{self, DriftStatus};
use crate::editor;
use crate::error::{ReditError, Result};
use crate::interact::Interact;
use crate::lock::LockCoordinator;
use crate::metadata::DirectoryMetadata;
use crate::perms;
use crate::resolver::{StoreLocationResolver, StoreRoot};
use crate::summary::{CommitMessageProvider, SENTINEL_MESSAGE};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Message used when drifted content is committed before checkout.
const SYNC_MESSAGE: &str = "checked in by redit (sync)";

/// One checked-out edit session.
///
/// Created only by a fully successful checkout sequence and consumed by
/// checkin; owned exclusively by the orchestrator for one edit cycle.
#[derive(Debug, Clone)]
pub struct FileSession {
    /// The working file being edited.
    pub working_path: PathBuf,
    /// Resolved store root holding the file's history.
    pub store_root: StoreRoot,
    /// Entry file inside the store root (`<basename>,<suffix>`).
    pub entry_path: PathBuf,
    /// Mode bits captured before any store interaction; restored at the
    /// very end of the session.
    pub original_mode: u32,
    /// Lock holder recorded after checkout (always non-empty).
    pub lock_holder: String,
}

/// Outcome of checking one batch back in.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files that completed the whole cycle: checked out, edited, and
    /// checked back in.
    pub edited: Vec<PathBuf>,
    /// Files that failed checkout and were excluded from the batch.
    pub checkout_failures: Vec<(PathBuf, ReditError)>,
    /// Files whose checkin failed after editing.
    pub checkin_failures: Vec<(PathBuf, ReditError)>,
}

impl BatchReport {
    /// True when nothing went wrong anywhere in the batch.
    pub fn is_clean(&self) -> bool {
        self.checkout_failures.is_empty() && self.checkin_failures.is_empty()
    }
}

/// Drives checkout/edit/checkin cycles.
pub struct SessionOrchestrator<'a> {
    config: &'a Config,
    store: &'a dyn VersionStore,
    metadata: &'a dyn DirectoryMetadata,
    summarizer: &'a dyn CommitMessageProvider,
    actor: String,
    home: Option<PathBuf>,
}

impl<'a> SessionOrchestrator<'a> {
    /// Creates an orchestrator acting as the invoking user.
    pub fn new(
        config: &'a Config,
        store: &'a dyn VersionStore,
        metadata: &'a dyn DirectoryMetadata,
        summarizer: &'a dyn CommitMessageProvider,
    ) -> Self {
        let actor = std::env::var("USER")
            .or_else(|_| std::env::var("LOGNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            config,
            store,
            metadata,
            summarizer,
            actor,
            home: crate::config::home_dir(),
        }
    }

    /// Overrides the acting identity. For testing.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Overrides the home directory used for store resolution. For testing.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Runs a full edit cycle over a batch of files: check out what can be
    /// checked out, spawn the editor once over the successes, then check
    /// every session back in, in the original order.
    pub fn run_batch(
        &self,
        files: &[PathBuf],
        ui: &mut dyn Interact,
        editor_cmd: &str,
        syntax_check: Option<&str>,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let sessions = self.checkout_batch(files, ui, &mut report)?;

        if sessions.is_empty() {
            return Ok(report);
        }

        let paths: Vec<PathBuf> = sessions.iter().map(|s| s.working_path.clone()).collect();

        // The editor needs the terminal to itself.
        ui.release();
        let edit_result = editor::edit_files(editor_cmd, &paths);
        ui.reacquire();
        if let Err(e) = edit_result {
            // The editor never ran; back every session out so no locks or
            // mode changes leak.
            for session in sessions {
                self.abandon(session);
            }
            return Err(e);
        }

        if let Some(checker) = syntax_check {
            for path in &paths {
                if !editor::syntax_check(checker, path) {
                    ui.show(&format!("syntax check failed for {}", path.display()))?;
                }
            }
        }

        // Checkins run strictly in the original per-file order; one failure
        // is reported and does not block the rest.
        for session in sessions {
            let path = session.working_path.clone();
            match self.checkin(session) {
                Ok(()) => report.edited.push(path),
                Err(e) => {
                    ui.show(&format!("checkin failed for {}: {}", path.display(), e))?;
                    report.checkin_failures.push((path, e));
                }
            }
        }

        Ok(report)
    }

    /// Checks out every file in the batch, skipping (and recording) the ones
    /// that abort. The ceiling is enforced once, before any per-file work.
    pub fn checkout_batch(
        &self,
        files: &[PathBuf],
        ui: &mut dyn Interact,
        report: &mut BatchReport,
    ) -> Result<Vec<FileSession>> {
        let max = self.config.session.max_files;
        if files.len() > max {
            return Err(ReditError::BatchTooLarge {
                requested: files.len(),
                max,
            });
        }

        let mut sessions = Vec::with_capacity(files.len());
        for file in files {
            match self.checkout(file, ui) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    ui.show(&format!("skipping {}: {}", file.display(), e))?;
                    report.checkout_failures.push((file.clone(), e));
                }
            }
        }
        Ok(sessions)
    }

    /// Checks a single file out for editing.
    pub fn checkout(&self, file: &Path, ui: &mut dyn Interact) -> Result<FileSession> {
        let working = self.confirm_target(file, ui)?;

        // Captured before any store interaction; also the hard-link gate.
        let original_mode = perms::capture(&working)?;

        match self.checkout_inner(&working, original_mode, ui) {
            Ok(session) => Ok(session),
            Err(e) => {
                // An aborted checkout leaves the file the way it was found.
                perms::restore(&working, original_mode);
                Err(e)
            }
        }
    }

    fn checkout_inner(
        &self,
        working: &Path,
        original_mode: u32,
        ui: &mut dyn Interact,
    ) -> Result<FileSession> {
        let resolver = self.resolver();
        let store_root = resolver.resolve(working, ui)?;
        let entry_path = self.entry_path(working, &store_root)?;
        let locks = LockCoordinator::new(self.store);

        if !entry_path.exists() {
            info!(entry = %entry_path.display(), "no store entry yet, creating initial revision");
            self.store.initialize(&entry_path, working)?;
        }

        self.resolve_lock_conflict(&entry_path, &locks, ui)?;

        let original_mode =
            self.resolve_drift(&entry_path, working, original_mode, &locks, ui)?;

        // Acquire the lock by checking out. The backend refuses to overwrite
        // a writable working copy.
        perms::strip_write(working);
        self.store.checkout(&entry_path, working)?;

        // A successful checkout implies holding the lock. An empty holder
        // here is indistinguishable from a backend failure.
        let lock_holder = locks.holder(&entry_path)?;
        if lock_holder.is_empty() {
            return Err(ReditError::BackendInvocation {
                command: format!("checkout {}", entry_path.display()),
                status: 0,
                stderr: "backend reported success but no lock was recorded".to_string(),
            });
        }

        Ok(FileSession {
            working_path: working.to_path_buf(),
            store_root,
            entry_path,
            original_mode,
            lock_holder,
        })
    }

    /// Editing through a symbolic link requires confirming the resolved
    /// target; declining aborts this file.
    fn confirm_target(&self, file: &Path, ui: &mut dyn Interact) -> Result<PathBuf> {
        let meta = std::fs::symlink_metadata(file)?;
        if !meta.file_type().is_symlink() {
            return Ok(file.to_path_buf());
        }
        let target = std::fs::canonicalize(file)?;
        if ui.confirm(&format!(
            "{} is a symbolic link to {}. Edit the target?",
            file.display(),
            target.display()
        ))? {
            Ok(target)
        } else {
            Err(ReditError::Declined(format!(
                "not editing symlink target {}",
                target.display()
            )))
        }
    }

    /// Reports a foreign lock holder and offers a force-unlock; declining
    /// aborts this file's checkout entirely.
    fn resolve_lock_conflict(
        &self,
        entry: &Path,
        locks: &LockCoordinator<'_>,
        ui: &mut dyn Interact,
    ) -> Result<()> {
        let holder = locks.holder(entry)?;
        if holder.is_empty() || holder == self.actor {
            return Ok(());
        }
        ui.show(&format!("currently locked by {}", holder))?;
        if ui.confirm("Break the lock?")? {
            warn!(holder = %holder, entry = %entry.display(), "breaking foreign lock");
            locks.unlock(entry)?;
            Ok(())
        } else {
            Err(ReditError::LockConflict { holder })
        }
    }

    /// Three-way drift resolution: commit the drifted content, abort, or
    /// proceed anyway. Anything unrecognized aborts.
    ///
    /// Returns the mode bits the session should carry forward; the sync
    /// checkin mutates modes, so the original capture is re-applied and
    /// re-read on that path.
    fn resolve_drift(
        &self,
        entry: &Path,
        working: &Path,
        original_mode: u32,
        locks: &LockCoordinator<'_>,
        ui: &mut dyn Interact,
    ) -> Result<u32> {
        let diff = match drift::check(self.store, entry, working)? {
            DriftStatus::Clean => return Ok(original_mode),
            DriftStatus::Diverged(diff) => diff,
        };

        ui.show(&format!(
            "{} has changed since its last recorded revision:",
            working.display()
        ))?;
        ui.show(&diff)?;
        let answer = ui.prompt_line(
            "(c)ommit it as a new revision, (a)bort, or (e)dit anyway discarding nothing yet \
             -- editing anyway will overwrite the unrecorded changes at checkout [c/a/e]: ",
        )?;

        match answer.as_str() {
            "c" | "C" => {
                locks.lock(entry)?;
                self.store.checkin(entry, working, SYNC_MESSAGE)?;
                // The checkin just rewrote the mode bits; put the original
                // capture back and carry a fresh capture forward.
                perms::restore(working, original_mode);
                perms::capture(working)
            }
            "e" | "E" => {
                warn!(file = %working.display(), "proceeding over uncommitted drift");
                Ok(original_mode)
            }
            _ => Err(ReditError::DriftAborted),
        }
    }

    /// Checks one session back in and consumes it.
    pub fn checkin(&self, session: FileSession) -> Result<()> {
        let FileSession {
            working_path,
            entry_path,
            original_mode,
            ..
        } = session;

        let result = self.checkin_inner(&entry_path, &working_path);

        // Restored regardless of how the checkin went; intermediate mode
        // changes by the backend never leak out of the session.
        perms::restore(&working_path, original_mode);
        result
    }

    /// Backs a checked-out session out without committing anything: the
    /// lock is released if this actor holds it and the captured mode is
    /// restored.
    fn abandon(&self, session: FileSession) {
        let locks = LockCoordinator::new(self.store);
        match locks.holder(&session.entry_path) {
            Ok(holder) if holder == self.actor => {
                if let Err(e) = locks.unlock(&session.entry_path) {
                    warn!(entry = %session.entry_path.display(), "cannot release lock: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(entry = %session.entry_path.display(), "cannot query lock holder: {}", e)
            }
        }
        perms::restore(&session.working_path, session.original_mode);
    }

    fn checkin_inner(&self, entry: &Path, working: &Path) -> Result<()> {
        let diff = self.store.diff_head(entry, working)?;
        let message = if diff.trim().is_empty() {
            SENTINEL_MESSAGE.to_string()
        } else {
            self.summarizer.summarize(&diff)
        };

        self.store.checkin(entry, working, &message)?;

        let locks = LockCoordinator::new(self.store);
        if locks.holder(entry)? == self.actor {
            locks.unlock(entry)?;
        }
        Ok(())
    }

    /// Resolves the store root and entry path for a file without starting a
    /// session. Used by the history query surface.
    pub fn locate_entry(
        &self,
        file: &Path,
        ui: &mut dyn Interact,
    ) -> Result<(StoreRoot, PathBuf)> {
        let root = self.resolver().resolve(file, ui)?;
        let entry = self.entry_path(file, &root)?;
        Ok((root, entry))
    }

    fn resolver(&self) -> StoreLocationResolver<'a> {
        let resolver = StoreLocationResolver::new(&self.config.store, self.metadata);
        match &self.home {
            Some(home) => resolver.with_home(home.clone()),
            None => resolver,
        }
    }

    fn entry_path(&self, working: &Path, root: &StoreRoot) -> Result<PathBuf> {
        let basename = working
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ReditError::StoreResolution {
                path: working.to_path_buf(),
                reason: "file name is not valid UTF-8".to_string(),
            })?;
        Ok(root.path.join(self.config.store.entry_name(basename)))
    }
}
