//! Revision-to-revision and revision-to-working-copy diffs.

use anyhow::{bail, Result};
use redit_core::{
    platform_metadata, Config, HistoryQueryService, RcsBackend, RevisionId, SentinelSummarizer,
    SessionOrchestrator, TermInteract,
};
use std::path::PathBuf;

pub fn run(revs: &[String], files: &[PathBuf]) -> Result<()> {
    let [file] = files else {
        bail!("--diff works on exactly one file, got {}", files.len());
    };

    let rev1: RevisionId = revs[0].parse()?;
    let rev2: Option<RevisionId> = match revs.get(1) {
        Some(r) => Some(r.parse()?),
        None => None,
    };

    let config = Config::load()?;
    let store = RcsBackend::new();
    let metadata = platform_metadata();
    let summarizer = SentinelSummarizer;
    let orchestrator =
        SessionOrchestrator::new(&config, &store, metadata.as_ref(), &summarizer);
    let history = HistoryQueryService::new(&store);
    let mut ui = TermInteract::new();

    let (_, entry) = orchestrator.locate_entry(file, &mut ui)?;
    let diff = history.diff(&entry, file, rev1, rev2)?;
    print!("{}", diff);

    Ok(())
}
