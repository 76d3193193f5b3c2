//! External editor and syntax-checker collaborators.

use crate::error::{ReditError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Resolves the preferred editor: `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn resolve_editor() -> String {
    resolve_editor_from(|name| std::env::var(name).ok())
}

/// Editor resolution over an explicit variable lookup. Blank values are
/// treated as unset.
pub fn resolve_editor_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .find_map(|name| lookup(name).filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string())
}

/// Spawns the editor once with every checked-out file and waits
/// unconditionally for it to exit. The caller must have released the
/// interactive input handle first.
pub fn edit_files(editor: &str, files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    debug!(editor = editor, count = files.len(), "spawning editor");

    // The editor value may carry its own flags ("code -w"), so it goes
    // through the shell with the file list appended.
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("{} \"$@\"", editor))
        .arg(editor);
    for f in files {
        cmd.arg(f);
    }

    let status = cmd.status().map_err(|e| ReditError::BackendInvocation {
        command: editor.to_string(),
        status: -1,
        stderr: e.to_string(),
    })?;

    // Exit 127 is the shell reporting the editor command itself could not
    // be run; nothing was edited and the caller must back the sessions out.
    if status.code() == Some(127) {
        return Err(ReditError::BackendInvocation {
            command: editor.to_string(),
            status: 127,
            stderr: "editor command not found".to_string(),
        });
    }
    if !status.success() {
        // Any other non-zero editor exit is reported but does not abort
        // checkin; the user may have saved before quitting with an error.
        warn!(status = ?status.code(), "editor exited non-zero");
    }
    Ok(())
}

/// Runs a syntax-check command on one edited file. Report-only: failures
/// never block checkin.
pub fn syntax_check(command: &str, file: &Path) -> bool {
    let result = Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$1\"", command))
        .arg(command)
        .arg(file)
        .status();

    match result {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!(file = %file.display(), status = ?status.code(), "syntax check failed");
            false
        }
        Err(e) => {
            warn!(file = %file.display(), "syntax checker did not run: {}", e);
            false
        }
    }
}
