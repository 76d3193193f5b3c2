//! Multi-file batch behavior: the ceiling, partial failure, and ordering.

use crate::harness::{FakeStore, TestWorkspace, APPEND_EDITOR};
use anyhow::Result;
use redit_core::{
    FileMetadata, ReditError, ScriptedInteract, SentinelSummarizer, SessionOrchestrator,
};
use std::path::PathBuf;

#[test]
fn test_over_ceiling_batch_is_rejected_before_any_work() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    let config = ws.config();
    ws.create_local_store()?;
    let files: Vec<PathBuf> = (0..4)
        .map(|i| ws.write_file(&format!("f{}.txt", i), "x\n"))
        .collect::<Result<_>>()?;

    let store = FakeStore::new("me");
    let metadata = FileMetadata;
    let summarizer = SentinelSummarizer;
    let orch = SessionOrchestrator::new(&config, &store, &metadata, &summarizer)
        .with_actor("me")
        .with_home(ws.path());

    let mut ui = ScriptedInteract::default();
    let err = orch
        .run_batch(&files, &mut ui, APPEND_EDITOR, None)
        .unwrap_err();

    assert!(matches!(
        err,
        ReditError::BatchTooLarge { requested: 4, max: 3 }
    ));
    // No file got as far as the store.
    for i in 0..4 {
        assert_eq!(store.revision_count(&ws.entry_path(&format!("f{}.txt", i))), 0);
    }
    assert!(ui.prompts.is_empty());
    Ok(())
}

#[test]
fn test_configured_ceiling_admits_larger_batches() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    let mut config = ws.config();
    config.session.max_files = 5;
    ws.create_local_store()?;
    let files: Vec<PathBuf> = (0..4)
        .map(|i| ws.write_file(&format!("f{}.txt", i), "x\n"))
        .collect::<Result<_>>()?;

    let store = FakeStore::new("me");
    let metadata = FileMetadata;
    let summarizer = SentinelSummarizer;
    let orch = SessionOrchestrator::new(&config, &store, &metadata, &summarizer)
        .with_actor("me")
        .with_home(ws.path());

    let mut ui = ScriptedInteract::default();
    let report = orch.run_batch(&files, &mut ui, "true", None)?;

    assert!(report.is_clean());
    assert_eq!(report.edited, files);
    Ok(())
}

#[test]
fn test_one_failing_checkout_does_not_sink_the_batch() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    let config = ws.config();
    ws.create_local_store()?;
    let good_a = ws.write_file("a.txt", "a\n")?;
    let missing = ws.work_dir().join("missing.txt");
    let good_b = ws.write_file("b.txt", "b\n")?;

    let store = FakeStore::new("me");
    let metadata = FileMetadata;
    let summarizer = SentinelSummarizer;
    let orch = SessionOrchestrator::new(&config, &store, &metadata, &summarizer)
        .with_actor("me")
        .with_home(ws.path());

    let mut ui = ScriptedInteract::default();
    let report = orch.run_batch(
        &[good_a.clone(), missing.clone(), good_b.clone()],
        &mut ui,
        APPEND_EDITOR,
        None,
    )?;

    assert_eq!(report.checkout_failures.len(), 1);
    assert_eq!(report.checkout_failures[0].0, missing);
    // Order of the survivors is preserved.
    assert_eq!(report.edited, vec![good_a, good_b]);
    assert_eq!(store.revision_count(&ws.entry_path("a.txt")), 2);
    assert_eq!(store.revision_count(&ws.entry_path("b.txt")), 2);
    Ok(())
}

#[test]
fn test_one_failing_checkin_does_not_block_the_rest() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    let config = ws.config();
    ws.create_local_store()?;
    let good = ws.write_file("a.txt", "a\n")?;
    let bad = ws.write_file("b.txt", "b\n")?;
    #[cfg(unix)]
    ws.set_mode("b.txt", 0o640)?;

    let store = FakeStore::new("me");
    store.fail_checkins_matching("b.txt");
    let metadata = FileMetadata;
    let summarizer = SentinelSummarizer;
    let orch = SessionOrchestrator::new(&config, &store, &metadata, &summarizer)
        .with_actor("me")
        .with_home(ws.path());

    let mut ui = ScriptedInteract::default();
    let report = orch.run_batch(&[good.clone(), bad.clone()], &mut ui, APPEND_EDITOR, None)?;

    assert_eq!(report.edited, vec![good]);
    assert_eq!(report.checkin_failures.len(), 1);
    assert_eq!(report.checkin_failures[0].0, bad);
    assert!(!report.is_clean());

    // The good file completed its cycle.
    assert_eq!(store.revision_count(&ws.entry_path("a.txt")), 2);
    assert_eq!(store.lock_holder(&ws.entry_path("a.txt")), None);
    // The bad file keeps its lock for a retry, but its mode is restored.
    assert_eq!(store.revision_count(&ws.entry_path("b.txt")), 1);
    assert_eq!(
        store.lock_holder(&ws.entry_path("b.txt")).as_deref(),
        Some("me")
    );
    #[cfg(unix)]
    assert_eq!(ws.mode_of("b.txt")?, 0o640);
    Ok(())
}
