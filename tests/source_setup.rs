mod common;

use common::{write_bundle, FakeFetcher};
use qflow_core::{ArtifactStore, PipelineError, Slot};
use quantflow::{prepare_source, SourceStatus};

#[test]
fn fetches_into_source_slot_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::rooted_at(dir.path());
    let fetcher = FakeFetcher::new();

    let status = prepare_source(&store, &fetcher, "microsoft/DialoGPT-small", false).unwrap();
    assert_eq!(status, SourceStatus::Fetched);
    assert!(store.is_complete(Slot::Source));
    assert!(!store.staging_path(Slot::Source).exists());
    assert_eq!(*fetcher.calls.lock().unwrap(), vec!["microsoft/DialoGPT-small".to_string()]);
}

#[test]
fn complete_source_is_not_fetched_again_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::rooted_at(dir.path());
    write_bundle(store.path(Slot::Source));
    let fetcher = FakeFetcher::new();

    assert_eq!(prepare_source(&store, &fetcher, "m", false).unwrap(), SourceStatus::AlreadyPresent);
    assert!(fetcher.calls.lock().unwrap().is_empty());

    assert_eq!(prepare_source(&store, &fetcher, "m", true).unwrap(), SourceStatus::Fetched);
    assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
}

#[test]
fn failed_or_incomplete_download_leaves_source_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::rooted_at(dir.path());

    let offline = FakeFetcher { fail: true,
                                ..FakeFetcher::new() };
    let err = prepare_source(&store, &offline, "m", false).unwrap_err();
    assert!(matches!(err, PipelineError::MissingSourceArtifact(msg) if msg.contains("offline")));
    assert!(!store.exists(Slot::Source));

    let truncated = FakeFetcher { complete: false,
                                  ..FakeFetcher::new() };
    let err = prepare_source(&store, &truncated, "m", false).unwrap_err();
    assert!(matches!(err, PipelineError::Store(_)));
    assert!(!store.exists(Slot::Source));
    assert!(!store.staging_path(Slot::Source).exists());
}
