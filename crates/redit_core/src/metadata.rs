//! Per-directory metadata capability.
//!
//! The store hint is cached as a single opaque string attached to a
//! directory. Two mechanisms exist: the platform's extended-attribute tools
//! and a plain dotfile. The resolver never branches on platform; one
//! implementation is selected once at startup.

use crate::error::Result;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Attribute name under which the hint is stored.
pub const HINT_KEY: &str = "user.redit.store";

/// Capability interface for a single key-value slot per directory.
///
/// All operations are best-effort from the caller's point of view: the
/// metadata is a cache, not a source of truth, so callers treat `set`/`clear`
/// failures as non-fatal.
pub trait DirectoryMetadata {
    /// Returns the cached value for the directory, if any.
    fn get(&self, dir: &Path) -> Result<Option<String>>;

    /// Stores a value on the directory, replacing any previous one.
    fn set(&self, dir: &Path, value: &str) -> Result<()>;

    /// Removes the value from the directory.
    fn clear(&self, dir: &Path) -> Result<()>;
}

/// Selects the metadata implementation for this platform.
///
/// Uses the extended-attribute tools when they are present, otherwise the
/// dotfile fallback.
pub fn platform_metadata() -> Box<dyn DirectoryMetadata> {
    if XattrMetadata::is_available() {
        Box::new(XattrMetadata)
    } else {
        Box::new(FileMetadata)
    }
}

/// Extended-attribute implementation shelling out to the platform tools.
#[derive(Debug, Default)]
pub struct XattrMetadata;

#[cfg(target_os = "macos")]
impl XattrMetadata {
    fn is_available() -> bool {
        probe("xattr")
    }

    fn read(dir: &Path) -> Option<String> {
        let out = Command::new("xattr")
            .arg("-p")
            .arg(HINT_KEY)
            .arg(dir)
            .output()
            .ok()?;
        out.status.success().then(|| stdout_value(&out.stdout))
    }

    fn write(dir: &Path, value: &str) -> bool {
        run_ok(Command::new("xattr").arg("-w").arg(HINT_KEY).arg(value).arg(dir))
    }

    fn remove(dir: &Path) -> bool {
        run_ok(Command::new("xattr").arg("-d").arg(HINT_KEY).arg(dir))
    }
}

#[cfg(not(target_os = "macos"))]
impl XattrMetadata {
    fn is_available() -> bool {
        probe("getfattr") && probe("setfattr")
    }

    fn read(dir: &Path) -> Option<String> {
        let out = Command::new("getfattr")
            .args(["--only-values", "-n", HINT_KEY])
            .arg(dir)
            .output()
            .ok()?;
        out.status.success().then(|| stdout_value(&out.stdout))
    }

    fn write(dir: &Path, value: &str) -> bool {
        run_ok(Command::new("setfattr").args(["-n", HINT_KEY, "-v", value]).arg(dir))
    }

    fn remove(dir: &Path) -> bool {
        run_ok(Command::new("setfattr").args(["-x", HINT_KEY]).arg(dir))
    }
}

impl DirectoryMetadata for XattrMetadata {
    fn get(&self, dir: &Path) -> Result<Option<String>> {
        Ok(Self::read(dir).filter(|v| !v.is_empty()))
    }

    fn set(&self, dir: &Path, value: &str) -> Result<()> {
        if !Self::write(dir, value) {
            debug!(dir = %dir.display(), "xattr write failed");
        }
        Ok(())
    }

    fn clear(&self, dir: &Path) -> Result<()> {
        Self::remove(dir);
        Ok(())
    }
}

/// Dotfile implementation: the value lives in `.redit-store` inside the
/// directory. Fallback for filesystems without extended attributes, and the
/// implementation tests use.
#[derive(Debug, Default)]
pub struct FileMetadata;

impl FileMetadata {
    const FILE_NAME: &'static str = ".redit-store";
}

impl DirectoryMetadata for FileMetadata {
    fn get(&self, dir: &Path) -> Result<Option<String>> {
        match fs::read_to_string(dir.join(Self::FILE_NAME)) {
            Ok(s) => {
                let s = s.trim().to_string();
                Ok((!s.is_empty()).then_some(s))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, dir: &Path, value: &str) -> Result<()> {
        fs::write(dir.join(Self::FILE_NAME), format!("{}\n", value))?;
        Ok(())
    }

    fn clear(&self, dir: &Path) -> Result<()> {
        match fs::remove_file(dir.join(Self::FILE_NAME)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn probe(program: &str) -> bool {
    Command::new(program)
        .arg("--help")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn run_ok(cmd: &mut Command) -> bool {
    cmd.output().map(|o| o.status.success()).unwrap_or(false)
}

fn stdout_value(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
