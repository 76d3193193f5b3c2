//! The default command: check out, edit, check back in.

use anyhow::Result;
use console::style;
use redit_core::{
    platform_metadata, CommandSummarizer, CommitMessageProvider, Config, RcsBackend,
    SentinelSummarizer, SessionOrchestrator, TermInteract,
};
use std::path::PathBuf;
use tracing::warn;

pub fn run(files: &[PathBuf], syntax_check: bool, max_files: Option<usize>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(n) = max_files {
        config.session.max_files = n;
    }

    let store = RcsBackend::new();
    let metadata = platform_metadata();
    let summarizer: Box<dyn CommitMessageProvider> = match &config.summary.command {
        Some(cmd) => Box::new(CommandSummarizer::new(cmd.clone(), config.summary.timeout())),
        None => Box::new(SentinelSummarizer),
    };

    let checker = if syntax_check {
        let configured = config.session.syntax_check_command.clone();
        if configured.is_none() {
            warn!("--syntax-check given but no syntax_check_command configured");
        }
        configured
    } else {
        None
    };

    let orchestrator =
        SessionOrchestrator::new(&config, &store, metadata.as_ref(), summarizer.as_ref());
    let mut ui = TermInteract::new();
    let editor = redit_core::resolve_editor();

    let report = orchestrator.run_batch(files, &mut ui, &editor, checker.as_deref())?;

    for path in &report.edited {
        println!("{} checked in", path.display());
    }
    for (path, err) in report.checkout_failures.iter().chain(&report.checkin_failures) {
        eprintln!("{} {}: {}", style("error:").red().bold(), path.display(), err);
        if let Some(hint) = err.recovery_suggestion() {
            eprintln!("  {}", style(hint).dim());
        }
    }

    if report.is_clean() {
        Ok(())
    } else {
        let failed = report.checkout_failures.len() + report.checkin_failures.len();
        Err(anyhow::anyhow!("{} of {} files failed", failed, files.len()))
    }
}
