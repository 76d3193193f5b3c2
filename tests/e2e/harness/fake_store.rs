//! In-memory `VersionStore` fake with inspectable state.
//!
//! Behaves like the real backend contract: entries keyed by entry path (a
//! marker file is kept on disk so existence checks work), lock annotations
//! on the head revision line of log output, newest-first revision blocks,
//! checkout/checkin mode-bit side effects.

use redit_core::{ReditError, Result, RevisionId, VersionStore};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FakeRevision {
    pub id: RevisionId,
    pub author: String,
    pub message: String,
    pub content: String,
}

#[derive(Debug, Default)]
struct FakeEntry {
    revisions: Vec<FakeRevision>,
    locked_by: Option<String>,
}

pub struct FakeStore {
    actor: String,
    entries: RefCell<HashMap<PathBuf, FakeEntry>>,
    /// When set, checkouts succeed without recording a lock.
    drop_locks: Cell<bool>,
    /// When set, checkins fail for entries whose path contains the string.
    fail_checkin_matching: RefCell<Option<String>>,
}

impl FakeStore {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            entries: RefCell::new(HashMap::new()),
            drop_locks: Cell::new(false),
            fail_checkin_matching: RefCell::new(None),
        }
    }

    pub fn drop_locks_silently(&self) {
        self.drop_locks.set(true);
    }

    pub fn fail_checkins_matching(&self, needle: &str) {
        *self.fail_checkin_matching.borrow_mut() = Some(needle.to_string());
    }

    /// Creates an entry with one committed revision authored by `author`.
    pub fn seed_as(&self, entry: &Path, author: &str, content: &str) {
        self.touch_marker(entry);
        self.entries.borrow_mut().insert(
            entry.to_path_buf(),
            FakeEntry {
                revisions: vec![FakeRevision {
                    id: RevisionId { major: 1, minor: 1 },
                    author: author.to_string(),
                    message: "initial revision".to_string(),
                    content: content.to_string(),
                }],
                locked_by: None,
            },
        );
    }

    pub fn seed(&self, entry: &Path, content: &str) {
        let actor = self.actor.clone();
        self.seed_as(entry, &actor, content);
    }

    /// Appends a revision directly, bypassing the working file.
    pub fn push_revision(&self, entry: &Path, message: &str, content: &str) {
        let mut entries = self.entries.borrow_mut();
        let e = entries.entry(entry.to_path_buf()).or_default();
        let next = e
            .revisions
            .last()
            .map(|r| RevisionId {
                major: r.id.major,
                minor: r.id.minor + 1,
            })
            .unwrap_or(RevisionId { major: 1, minor: 1 });
        e.revisions.push(FakeRevision {
            id: next,
            author: self.actor.clone(),
            message: message.to_string(),
            content: content.to_string(),
        });
        drop(entries);
        self.touch_marker(entry);
    }

    pub fn set_lock(&self, entry: &Path, holder: &str) {
        if let Some(e) = self.entries.borrow_mut().get_mut(entry) {
            e.locked_by = Some(holder.to_string());
        }
    }

    pub fn lock_holder(&self, entry: &Path) -> Option<String> {
        self.entries.borrow().get(entry)?.locked_by.clone()
    }

    pub fn revisions(&self, entry: &Path) -> Vec<FakeRevision> {
        self.entries
            .borrow()
            .get(entry)
            .map(|e| e.revisions.clone())
            .unwrap_or_default()
    }

    pub fn revision_count(&self, entry: &Path) -> usize {
        self.revisions(entry).len()
    }

    pub fn head_message(&self, entry: &Path) -> Option<String> {
        self.revisions(entry).last().map(|r| r.message.clone())
    }

    fn head_content(&self, entry: &Path) -> Option<String> {
        self.revisions(entry).last().map(|r| r.content.clone())
    }

    fn touch_marker(&self, entry: &Path) {
        if let Some(parent) = entry.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(entry, "fake-store entry\n");
    }

    fn missing(&self, entry: &Path) -> ReditError {
        ReditError::BackendInvocation {
            command: format!("fake-store {}", entry.display()),
            status: 1,
            stderr: "no such entry".to_string(),
        }
    }

    #[cfg(unix)]
    fn set_mode(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
    }

    #[cfg(not(unix))]
    fn set_mode(_path: &Path, _mode: u32) {}
}

impl VersionStore for FakeStore {
    fn initialize(&self, entry: &Path, working: &Path) -> Result<()> {
        let content = fs::read_to_string(working)?;
        self.seed(entry, &content);
        Self::set_mode(working, 0o444);
        Ok(())
    }

    fn checkout(&self, entry: &Path, working: &Path) -> Result<()> {
        let head = self
            .head_content(entry)
            .ok_or_else(|| self.missing(entry))?;
        let _ = fs::remove_file(working);
        fs::write(working, head)?;
        Self::set_mode(working, 0o644);
        if !self.drop_locks.get() {
            self.set_lock(entry, &self.actor.clone());
        }
        Ok(())
    }

    fn lock(&self, entry: &Path) -> Result<()> {
        if !self.entries.borrow().contains_key(entry) {
            return Err(self.missing(entry));
        }
        self.set_lock(entry, &self.actor.clone());
        Ok(())
    }

    fn unlock(&self, entry: &Path) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        let e = entries.get_mut(entry).ok_or_else(|| self.missing(entry))?;
        e.locked_by = None;
        Ok(())
    }

    fn diff_head(&self, entry: &Path, working: &Path) -> Result<String> {
        let head = self
            .head_content(entry)
            .ok_or_else(|| self.missing(entry))?;
        let current = fs::read_to_string(working)?;
        if head == current {
            Ok(String::new())
        } else {
            Ok(format!(
                "--- {}\n+++ {}\n-{}+{}",
                entry.display(),
                working.display(),
                head,
                current
            ))
        }
    }

    fn diff_revs(
        &self,
        entry: &Path,
        working: &Path,
        rev1: RevisionId,
        rev2: Option<RevisionId>,
    ) -> Result<String> {
        let entries = self.entries.borrow();
        let e = entries.get(entry).ok_or_else(|| self.missing(entry))?;
        let find = |id: RevisionId| -> Result<&FakeRevision> {
            e.revisions
                .iter()
                .find(|r| r.id == id)
                .ok_or_else(|| ReditError::InvalidRevision(id.to_string()))
        };

        let from = find(rev1)?.content.clone();
        let to = match rev2 {
            Some(rev2) => find(rev2)?.content.clone(),
            None => fs::read_to_string(working)?,
        };
        if from == to {
            Ok(String::new())
        } else {
            Ok(format!("-{}+{}", from, to))
        }
    }

    fn log(&self, entry: &Path) -> Result<String> {
        let entries = self.entries.borrow();
        let e = entries.get(entry).ok_or_else(|| self.missing(entry))?;

        let mut out = format!("Store entry: {}\n", entry.display());
        out.push_str(&format!("total revisions: {}\n", e.revisions.len()));
        for (i, rev) in e.revisions.iter().rev().enumerate() {
            out.push_str("----------------------------\n");
            // A held lock is annotated on the head revision line, the way
            // the real log source prints it.
            let lock_note = match (&e.locked_by, i) {
                (Some(holder), 0) => format!("\tlocked by: {};", holder),
                _ => String::new(),
            };
            out.push_str(&format!("revision {}{}\n", rev.id, lock_note));
            out.push_str(&format!(
                "date: 2024/01/{:02} 00:00:00;  author: {};  state: Exp;\n",
                rev.id.minor.min(28).max(1),
                rev.author
            ));
            out.push_str(&rev.message);
            out.push('\n');
        }
        out.push_str(
            "=============================================================================\n",
        );
        Ok(out)
    }

    fn checkin(&self, entry: &Path, working: &Path, message: &str) -> Result<()> {
        if let Some(needle) = self.fail_checkin_matching.borrow().as_deref() {
            if entry.to_string_lossy().contains(needle) {
                return Err(ReditError::BackendInvocation {
                    command: format!("fake-store checkin {}", entry.display()),
                    status: 2,
                    stderr: "injected checkin failure".to_string(),
                });
            }
        }
        let content = fs::read_to_string(working)?;
        self.push_revision(entry, message, &content);
        let mut entries = self.entries.borrow_mut();
        if let Some(e) = entries.get_mut(entry) {
            e.locked_by = None;
        }
        Self::set_mode(working, 0o444);
        Ok(())
    }
}
