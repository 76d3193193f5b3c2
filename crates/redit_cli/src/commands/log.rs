//! Revision history display.

use anyhow::Result;
use chrono::NaiveDateTime;
use console::style;
use redit_core::{
    platform_metadata, Config, HistoryQueryService, RcsBackend, SentinelSummarizer,
    SessionOrchestrator, TermInteract,
};
use std::path::PathBuf;

pub fn run(files: &[PathBuf]) -> Result<()> {
    let config = Config::load()?;
    let store = RcsBackend::new();
    let metadata = platform_metadata();
    let summarizer = SentinelSummarizer;
    let orchestrator =
        SessionOrchestrator::new(&config, &store, metadata.as_ref(), &summarizer);
    let history = HistoryQueryService::new(&store);
    let mut ui = TermInteract::new();

    for file in files {
        let (_, entry) = orchestrator.locate_entry(file, &mut ui)?;
        let entries = history.log(&entry)?;

        println!("{}", style(file.display()).bold());
        for entry in entries {
            // First message line only; full messages stay in the store.
            let summary = entry.message.lines().next().unwrap_or_default();
            println!(
                "  {:>8}  {}  {:<10}  {}",
                entry.revision.to_string(),
                render_timestamp(&entry.timestamp),
                entry.author,
                summary
            );
        }
    }

    Ok(())
}

/// Re-renders the backend's `YYYY/MM/DD HH:MM:SS` timestamps; anything
/// unparseable is shown as-is.
fn render_timestamp(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y/%m/%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
