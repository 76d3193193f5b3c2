//! Configuration types for redit sessions.

use crate::error::{ReditError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Comprehensive configuration for a redit invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Session (batch) configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Store location and naming configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Commit-message summarizer configuration.
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Reads `$REDIT_CONFIG` if set, otherwise `~/.config/redit/config.toml`.
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("REDIT_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => match home_dir() {
                Some(home) => home.join(".config/redit/config.toml"),
                None => return Ok(Config::default()),
            },
        };
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ReditError::Config(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| ReditError::Config(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReditError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| ReditError::Config(format!("failed to write config: {}", e)))?;
        Ok(())
    }
}

/// Session (batch) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of files per invocation (default: 3).
    pub max_files: usize,

    /// External syntax-check command run per file when `--syntax-check` is
    /// given. Report-only; never blocks checkin.
    pub syntax_check_command: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_files: 3,
            syntax_check_command: None,
        }
    }
}

/// Store location and naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name of the local store directory beside the file (default: "RCS").
    pub dir_name: String,

    /// Suffix appended to entry names inside the store root (default: "v",
    /// giving entries named `<basename>,v`).
    pub entry_suffix: String,

    /// Base directory for remote store roots. Defaults to
    /// `~/.redit/stores` when unset.
    pub remote_base: Option<PathBuf>,

    /// Directory name suffix marking a bundle root (default: ".bundle").
    pub bundle_suffix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir_name: "RCS".to_string(),
            entry_suffix: "v".to_string(),
            remote_base: None,
            bundle_suffix: ".bundle".to_string(),
        }
    }
}

impl StoreConfig {
    /// Returns the base directory for remote store roots.
    pub fn remote_base(&self) -> Result<PathBuf> {
        if let Some(base) = &self.remote_base {
            return Ok(base.clone());
        }
        home_dir()
            .map(|home| home.join(".redit/stores"))
            .ok_or_else(|| ReditError::Config("cannot determine home directory".to_string()))
    }

    /// Entry name for a working file's basename, e.g. `notes.txt` -> `notes.txt,v`.
    pub fn entry_name(&self, basename: &str) -> String {
        format!("{},{}", basename, self.entry_suffix)
    }
}

/// Commit-message summarizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// External summarizer command. When unset, checkins use the sentinel
    /// message.
    pub command: Option<String>,

    /// Upper bound on summarizer wait time in seconds (default: 10).
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: 10,
        }
    }
}

impl SummaryConfig {
    /// Returns the summarizer timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Returns the invoking user's home directory from `$HOME`.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
