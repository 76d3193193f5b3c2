//! Commit-message generation.
//!
//! The summarizer is an external collaborator: it receives a unified diff
//! and produces a one-line summary. It is never load-bearing — an
//! unavailable, erroring, or slow backend degrades to the sentinel message,
//! and a checkin always proceeds.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed placeholder used when no meaningful summary is available.
pub const SENTINEL_MESSAGE: &str = "-";

/// Hard cap on sanitized message length, in characters.
const MAX_MESSAGE_CHARS: usize = 200;

/// Turns a unified diff into a one-line commit summary.
pub trait CommitMessageProvider {
    /// Returns a sanitized single-line summary, or [`SENTINEL_MESSAGE`].
    fn summarize(&self, diff: &str) -> String;
}

/// Provider that always answers with the sentinel. Used when no summarizer
/// command is configured.
#[derive(Debug, Default)]
pub struct SentinelSummarizer;

impl CommitMessageProvider for SentinelSummarizer {
    fn summarize(&self, _diff: &str) -> String {
        SENTINEL_MESSAGE.to_string()
    }
}

/// Provider shelling out to a configured command, diff on stdin, summary on
/// stdout. Accepts plain text or a JSON object with a `summary` field.
pub struct CommandSummarizer {
    command: String,
    timeout: Duration,
}

impl CommandSummarizer {
    /// Creates a provider for the given shell command and wait bound.
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn run(&self, diff: &str) -> Option<String> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| warn!(command = %self.command, "summarizer failed to start: {}", e))
            .ok()?;

        let stdin = child.stdin.take();
        let payload = diff.to_string();

        // The stdin write and the wait both happen on a worker thread so the
        // bound applies to the whole call even when the diff exceeds the pipe
        // buffer and the command never reads it; on timeout the child is
        // abandoned to finish on its own.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(payload.as_bytes());
            }
            let _ = tx.send(child.wait_with_output());
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(output)) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => {
                debug!(status = ?output.status.code(), "summarizer exited non-zero");
                None
            }
            Ok(Err(e)) => {
                warn!("summarizer wait failed: {}", e);
                None
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "summarizer timed out");
                None
            }
        }
    }
}

impl CommitMessageProvider for CommandSummarizer {
    fn summarize(&self, diff: &str) -> String {
        if diff.trim().is_empty() {
            return SENTINEL_MESSAGE.to_string();
        }
        match self.run(diff) {
            Some(raw) => sanitize(&extract_summary(&raw)),
            None => SENTINEL_MESSAGE.to_string(),
        }
    }
}

/// Pulls the summary text out of raw summarizer output: either the whole
/// output, or the `summary` field of a JSON object.
fn extract_summary(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(s) = value.get("summary").and_then(|v| v.as_str()) {
                return s.to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Sanitization guarantees: no double quotes, no newlines, at most
/// [`MAX_MESSAGE_CHARS`] characters, never empty.
pub fn sanitize(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\n' | '\r' => ' ',
            c => c,
        })
        .take(MAX_MESSAGE_CHARS)
        .collect();

    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        SENTINEL_MESSAGE.to_string()
    } else {
        cleaned
    }
}
