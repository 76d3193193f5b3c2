//! History queries through the structured log surface.

use crate::harness::{FakeStore, TestWorkspace};
use anyhow::Result;
use redit_core::{HistoryQueryService, RevisionId};

#[test]
fn test_log_is_presented_oldest_first() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.create_local_store()?;
    let entry = ws.entry_path("notes.txt");

    let store = FakeStore::new("me");
    store.seed(&entry, "one\n");
    store.push_revision(&entry, "second change", "two\n");
    store.push_revision(&entry, "third change", "three\n");

    let history = HistoryQueryService::new(&store);
    let entries = history.log(&entry)?;

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].revision.to_string(), "1.1");
    assert_eq!(entries[0].message, "initial revision");
    assert_eq!(entries[1].message, "second change");
    assert_eq!(entries[2].revision.to_string(), "1.3");
    assert_eq!(entries[2].message, "third change");
    Ok(())
}

#[test]
fn test_log_tolerates_a_held_lock() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.create_local_store()?;
    let entry = ws.entry_path("notes.txt");

    let store = FakeStore::new("me");
    store.seed(&entry, "one\n");
    store.set_lock(&entry, "alice");

    let history = HistoryQueryService::new(&store);
    let entries = history.log(&entry)?;
    assert_eq!(entries.len(), 1);
    Ok(())
}

#[test]
fn test_diff_between_revisions_ignores_the_working_file() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.create_local_store()?;
    let working = ws.write_file("notes.txt", "unrelated\n")?;
    let entry = ws.entry_path("notes.txt");

    let store = FakeStore::new("me");
    store.seed(&entry, "one\n");
    store.push_revision(&entry, "second change", "two\n");
    store.push_revision(&entry, "third change", "three\n");

    let history = HistoryQueryService::new(&store);
    let rev1: RevisionId = "1.1".parse()?;
    let rev3: RevisionId = "1.3".parse()?;

    let first = history.diff(&entry, &working, rev1, Some(rev3))?;
    ws.write_file("notes.txt", "changed again\n")?;
    let second = history.diff(&entry, &working, rev1, Some(rev3))?;

    assert_eq!(first, second);
    assert!(!first.contains("unrelated"));
    Ok(())
}

#[test]
fn test_diff_against_working_file_when_second_revision_omitted() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.create_local_store()?;
    let working = ws.write_file("notes.txt", "unrelated\n")?;
    let entry = ws.entry_path("notes.txt");

    let store = FakeStore::new("me");
    store.seed(&entry, "one\n");

    let history = HistoryQueryService::new(&store);
    let rev1: RevisionId = "1.1".parse()?;
    let diff = history.diff(&entry, &working, rev1, None)?;
    assert!(diff.contains("unrelated"));
    Ok(())
}

#[test]
fn test_diff_rejects_unknown_revision() -> Result<()> {
    let ws = TestWorkspace::empty()?;
    ws.create_local_store()?;
    let working = ws.write_file("notes.txt", "one\n")?;
    let entry = ws.entry_path("notes.txt");

    let store = FakeStore::new("me");
    store.seed(&entry, "one\n");

    let history = HistoryQueryService::new(&store);
    let rev9: RevisionId = "9.9".parse()?;
    assert!(history.diff(&entry, &working, rev9, None).is_err());
    Ok(())
}
