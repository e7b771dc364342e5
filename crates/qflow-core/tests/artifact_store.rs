mod test_support;

use std::fs;

use qflow_core::{ArtifactStore, ModelArtifact, Slot, StoreError};
use test_support::{list_dir, write_bundle};

#[test]
fn save_creates_parents_and_overwrites_previous_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::rooted_at(&dir.path().join("nested").join("workspace"));
    let download = dir.path().join("download");
    write_bundle(&download, "weights-v1");
    let artifact = ModelArtifact::open(&download).expect("open download");

    assert!(!store.exists(Slot::Source));
    store.save(&artifact, Slot::Source).expect("first save");
    assert!(store.exists(Slot::Source));

    // basura de una corrida anterior que no pertenece al bundle nuevo
    fs::write(store.path(Slot::Source).join("stale.bin"), "old").expect("write stale");
    let saved = store.save(&artifact, Slot::Source).expect("second save");

    assert!(saved.is_complete());
    assert_eq!(list_dir(store.path(Slot::Source)), list_dir(&download));
    assert_eq!(saved.manifest().expect("manifest").fingerprint,
               artifact.manifest().expect("manifest").fingerprint);
    assert!(!store.staging_path(Slot::Source).exists());
}

#[test]
fn save_rejects_incomplete_bundle_without_touching_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::rooted_at(dir.path());
    write_bundle(store.path(Slot::Source), "weights-v1");

    let partial = dir.path().join("partial");
    fs::create_dir_all(&partial).expect("mkdir");
    fs::write(partial.join("model.safetensors"), "w").expect("write");
    let artifact = ModelArtifact::open(&partial).expect("open");

    let err = store.save(&artifact, Slot::Source).unwrap_err();
    assert!(matches!(err, StoreError::Incomplete { .. }));
    assert!(store.is_complete(Slot::Source));
}

#[test]
fn saving_a_slot_onto_itself_is_a_noop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::rooted_at(dir.path());
    write_bundle(store.path(Slot::Source), "weights-v1");
    let artifact = store.open(Slot::Source).expect("open");
    let before = list_dir(store.path(Slot::Source));

    store.save(&artifact, Slot::Source).expect("save onto itself");
    assert_eq!(before, list_dir(store.path(Slot::Source)));
}

#[test]
fn empty_directory_does_not_exist_as_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::rooted_at(dir.path());
    fs::create_dir_all(store.path(Slot::Optimized)).expect("mkdir");
    assert!(!store.exists(Slot::Optimized));
    assert!(!store.is_complete(Slot::Optimized));
    assert!(!store.clear(Slot::Exported).expect("clear missing"));
    assert!(store.clear(Slot::Optimized).expect("clear empty dir"));
}
