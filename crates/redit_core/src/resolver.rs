//! Store-location resolution.
//!
//! Determines where a working file's revision history lives. An adjacent
//! local store always wins; otherwise a hint cached on the file's metadata
//! directory (the nearest bundle root, else the file's own directory) maps
//! to either a local store or one under the remote base. Missing or dangling
//! hints fall back to an interactive prompt.

use crate::config::StoreConfig;
use crate::error::{ReditError, Result};
use crate::interact::Interact;
use crate::metadata::DirectoryMetadata;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Kind of store root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Store directory beside the working file.
    Local,
    /// Store directory under the remote base, keyed by the hint path.
    Remote,
}

/// A resolved revision store root.
///
/// Invariant: `path` exists on disk by the time this value is handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRoot {
    /// Local or remote.
    pub kind: StoreKind,
    /// Absolute path of the store directory.
    pub path: PathBuf,
    /// The hint this root was derived from (`"."` for local).
    pub hint: String,
}

/// Hint value meaning "local store beside the file".
pub const LOCAL_HINT: &str = ".";

/// Resolves (and provisions) store roots for working files.
pub struct StoreLocationResolver<'a> {
    config: &'a StoreConfig,
    metadata: &'a dyn DirectoryMetadata,
    home: Option<PathBuf>,
}

impl<'a> StoreLocationResolver<'a> {
    /// Creates a resolver using the invoking user's home directory.
    pub fn new(config: &'a StoreConfig, metadata: &'a dyn DirectoryMetadata) -> Self {
        Self {
            config,
            metadata,
            home: crate::config::home_dir(),
        }
    }

    /// Overrides the home directory. For testing.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolves the store root for a working file, prompting if no usable
    /// cached hint exists and provisioning the directory if absent.
    pub fn resolve(&self, file: &Path, ui: &mut dyn Interact) -> Result<StoreRoot> {
        let file_dir = parent_dir(file)?;

        // An existing local store beside the file wins over any cached hint.
        let local = file_dir.join(&self.config.dir_name);
        if local.is_dir() {
            return Ok(StoreRoot {
                kind: StoreKind::Local,
                path: local,
                hint: LOCAL_HINT.to_string(),
            });
        }

        let meta_dir = self.metadata_dir(&file_dir);

        if let Some(hint) = self.metadata.get(&meta_dir)? {
            let root = self.root_for_hint(&file_dir, &hint)?;
            if root.path.is_dir() {
                return Ok(root);
            }
            // Dangling hint: the cache lied, purge it and re-prompt.
            warn!(hint = %hint, dir = %meta_dir.display(), "cached store hint is dangling, clearing");
            if let Err(e) = self.metadata.clear(&meta_dir) {
                warn!("failed to clear dangling store hint: {}", e);
            }
        }

        let hint = self.prompt_for_hint(&meta_dir, ui)?;
        let root = self.root_for_hint(&file_dir, &hint)?;
        self.provision(file, &root)?;

        // The hint is a cache, not a source of truth; persist best-effort.
        if let Err(e) = self.metadata.set(&meta_dir, &hint) {
            warn!(dir = %meta_dir.display(), "failed to persist store hint: {}", e);
        }

        Ok(root)
    }

    /// The directory metadata attaches to: the nearest bundle root on the
    /// walk from the file's directory up to the home directory or the
    /// filesystem root, else the file's own directory.
    fn metadata_dir(&self, file_dir: &Path) -> PathBuf {
        let mut current = Some(file_dir);
        while let Some(dir) = current {
            if self.home.as_deref() == Some(dir) {
                break;
            }
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(&self.config.bundle_suffix) {
                    return dir.to_path_buf();
                }
            }
            current = dir.parent();
        }
        file_dir.to_path_buf()
    }

    fn root_for_hint(&self, file_dir: &Path, hint: &str) -> Result<StoreRoot> {
        if hint == LOCAL_HINT {
            Ok(StoreRoot {
                kind: StoreKind::Local,
                path: file_dir.join(&self.config.dir_name),
                hint: LOCAL_HINT.to_string(),
            })
        } else {
            Ok(StoreRoot {
                kind: StoreKind::Remote,
                path: self.config.remote_base()?.join(hint),
                hint: hint.to_string(),
            })
        }
    }

    fn prompt_for_hint(&self, meta_dir: &Path, ui: &mut dyn Interact) -> Result<String> {
        let suggested = self.suggest_hint(meta_dir);
        let answer = ui.prompt_line(&format!(
            "No revision store recorded for {}.\n\
             Press enter for a local {} directory, or type a shared store path [{}]: ",
            meta_dir.display(),
            self.config.dir_name,
            suggested
        ))?;

        if answer.is_empty() {
            Ok(LOCAL_HINT.to_string())
        } else {
            Ok(answer.trim_matches('/').to_string())
        }
    }

    /// Suggested hint: the metadata directory's path with the home-directory
    /// prefix (or a volume-mount prefix) stripped and separators trimmed.
    fn suggest_hint(&self, meta_dir: &Path) -> String {
        let stripped = if let Some(home) = &self.home {
            meta_dir.strip_prefix(home).ok()
        } else {
            None
        };
        let stripped = stripped.or_else(|| {
            ["/Volumes", "/mnt", "/media"]
                .iter()
                .find_map(|prefix| meta_dir.strip_prefix(prefix).ok())
        });

        let suggestion = match stripped {
            Some(rest) => rest.to_string_lossy().into_owned(),
            None => meta_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let trimmed = suggestion.trim_matches('/');
        if trimmed.is_empty() {
            LOCAL_HINT.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Creates the store directory if missing. Creation failure is fatal for
    /// this file.
    fn provision(&self, file: &Path, root: &StoreRoot) -> Result<()> {
        if root.path.is_dir() {
            return Ok(());
        }
        create_store_dir(&root.path).map_err(|e| ReditError::StoreResolution {
            path: file.to_path_buf(),
            reason: format!("cannot create {}: {}", root.path.display(), e),
        })
    }
}

fn parent_dir(file: &Path) -> Result<PathBuf> {
    file.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| ReditError::StoreResolution {
            path: file.to_path_buf(),
            reason: "file has no parent directory".to_string(),
        })
}

/// Group-writable so a shared store root works for a workgroup.
#[cfg(unix)]
fn create_store_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o775).create(path)
}

#[cfg(not(unix))]
fn create_store_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}
