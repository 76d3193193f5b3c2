//! Version store backend capability.
//!
//! Revision storage primitives are provided by an external backend reached
//! through a fixed command contract. The `VersionStore` trait keeps the
//! session state machine independent of the backend's exact invocation
//! syntax; `RcsBackend` is the one production adapter, shelling out to the
//! RCS command family with the store entry path passed explicitly.

use crate::error::{ReditError, Result};
use crate::history::RevisionId;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Capability interface over the external revision store.
///
/// All operations address one store entry (the `<basename>,<suffix>` file
/// inside a store root) and, where relevant, the working file it tracks.
pub trait VersionStore {
    /// Creates the entry with an initial revision from the working file.
    /// The working file is left in place.
    fn initialize(&self, entry: &Path, working: &Path) -> Result<()>;

    /// Checks the head revision out locked, overwriting the working file.
    fn checkout(&self, entry: &Path, working: &Path) -> Result<()>;

    /// Acquires the edit lock on the entry's head revision.
    fn lock(&self, entry: &Path) -> Result<()>;

    /// Releases the edit lock on the entry's head revision, whoever holds it.
    fn unlock(&self, entry: &Path) -> Result<()>;

    /// Unified diff between the head revision and the working file.
    /// Empty output means they are identical.
    fn diff_head(&self, entry: &Path, working: &Path) -> Result<String>;

    /// Unified diff between `rev1` and `rev2`, or between `rev1` and the
    /// working file when `rev2` is `None`.
    fn diff_revs(
        &self,
        entry: &Path,
        working: &Path,
        rev1: RevisionId,
        rev2: Option<RevisionId>,
    ) -> Result<String>;

    /// Raw native log output for the entry (newest-first revision blocks,
    /// optional `locked by: NAME` header line).
    fn log(&self, entry: &Path) -> Result<String>;

    /// Checks the working file in as a new revision with the given message,
    /// leaving a read-only working copy behind.
    fn checkin(&self, entry: &Path, working: &Path, message: &str) -> Result<()>;
}

/// Production adapter shelling out to the RCS command family.
#[derive(Debug, Default)]
pub struct RcsBackend;

impl RcsBackend {
    /// Creates the adapter.
    pub fn new() -> Self {
        Self
    }

    /// Checks whether the backend commands are reachable on PATH.
    pub fn is_available() -> bool {
        Command::new("co")
            .arg("-V")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Runs one backend command, treating any exit code not in `ok_codes`
    /// as a failure.
    fn run(&self, program: &str, args: &[OsString], ok_codes: &[i32]) -> Result<String> {
        let rendered = render_command(program, args);
        debug!(command = %rendered, "invoking store backend");

        let output = Command::new(program).args(args).output().map_err(|e| {
            ReditError::BackendInvocation {
                command: rendered.clone(),
                status: -1,
                stderr: e.to_string(),
            }
        })?;

        let code = output.status.code().unwrap_or(-1);
        if !ok_codes.contains(&code) {
            return Err(ReditError::BackendInvocation {
                command: rendered,
                status: code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn render_command(program: &str, args: &[OsString]) -> String {
    let mut s = program.to_string();
    for a in args {
        s.push(' ');
        s.push_str(&a.to_string_lossy());
    }
    s
}

fn os(s: &str) -> OsString {
    OsString::from(s)
}

impl VersionStore for RcsBackend {
    fn initialize(&self, entry: &Path, working: &Path) -> Result<()> {
        self.run(
            "ci",
            &[
                os("-q"),
                os("-i"),
                os("-u"),
                os("-t-initial revision"),
                os("-minitial revision"),
                entry.into(),
                working.into(),
            ],
            &[0],
        )?;
        Ok(())
    }

    fn checkout(&self, entry: &Path, working: &Path) -> Result<()> {
        self.run(
            "co",
            &[os("-q"), os("-l"), entry.into(), working.into()],
            &[0],
        )?;
        Ok(())
    }

    fn lock(&self, entry: &Path) -> Result<()> {
        self.run("rcs", &[os("-q"), os("-l"), entry.into()], &[0])?;
        Ok(())
    }

    fn unlock(&self, entry: &Path) -> Result<()> {
        // -M suppresses the courtesy mail RCS sends when breaking a lock.
        self.run("rcs", &[os("-q"), os("-u"), os("-M"), entry.into()], &[0])?;
        Ok(())
    }

    fn diff_head(&self, entry: &Path, working: &Path) -> Result<String> {
        // Exit 1 from the diff primitive means "differs", not failure.
        self.run(
            "rcsdiff",
            &[os("-q"), os("-u"), entry.into(), working.into()],
            &[0, 1],
        )
    }

    fn diff_revs(
        &self,
        entry: &Path,
        working: &Path,
        rev1: RevisionId,
        rev2: Option<RevisionId>,
    ) -> Result<String> {
        let mut args = vec![os("-q"), os("-u"), os(&format!("-r{}", rev1))];
        if let Some(rev2) = rev2 {
            args.push(os(&format!("-r{}", rev2)));
        }
        args.push(entry.into());
        args.push(working.into());
        self.run("rcsdiff", &args, &[0, 1])
    }

    fn log(&self, entry: &Path) -> Result<String> {
        self.run("rlog", &[entry.into()], &[0])
    }

    fn checkin(&self, entry: &Path, working: &Path, message: &str) -> Result<()> {
        self.run(
            "ci",
            &[
                os("-q"),
                os("-u"),
                os(&format!("-m{}", message)),
                entry.into(),
                working.into(),
            ],
            &[0],
        )?;
        Ok(())
    }
}
