use std::fs;

use qflow_adapters::{LocalDirFetcher, OptimumCli};
use qflow_core::{BackendError, Exporter, ModelArtifact, ModelFetcher, OptimizationProfile, Quantizer, TaskDescriptor};

fn bundle(dir: &std::path::Path) {
    fs::create_dir_all(dir).expect("mkdir");
    fs::write(dir.join("model.safetensors"), "w").expect("weights");
    fs::write(dir.join("config.json"), "{}").expect("config");
    fs::write(dir.join("tokenizer.json"), "{}").expect("tokenizer");
}

#[test]
fn missing_program_is_a_launch_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    bundle(&dir.path().join("model"));
    let source = ModelArtifact::open(&dir.path().join("model")).expect("open");
    let cli = OptimumCli::new(dir.path().join("definitely-not-optimum-cli"));

    let err = cli.export(&source, &TaskDescriptor::default(), &dir.path().join("out"))
                 .unwrap_err();
    assert!(matches!(err, BackendError::Launch { .. }), "{err}");

    let err = cli.quantize(&dir.path().join("out"), &OptimizationProfile::default(), &dir.path().join("q"))
                 .unwrap_err();
    assert!(matches!(err, BackendError::Launch { .. }));
}

#[test]
fn local_fetcher_copies_complete_bundle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let from = dir.path().join("cache");
    bundle(&from);
    let dest = dir.path().join("model");

    LocalDirFetcher::new(&from).fetch("microsoft/DialoGPT-small", &dest)
                               .expect("fetch");
    assert!(ModelArtifact::open(&dest).expect("open").is_complete());
}

#[test]
fn local_fetcher_rejects_incomplete_bundle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let from = dir.path().join("cache");
    fs::create_dir_all(&from).expect("mkdir");
    fs::write(from.join("config.json"), "{}").expect("config");

    let err = LocalDirFetcher::new(&from).fetch("x", &dir.path().join("model"))
                                         .unwrap_err();
    assert!(matches!(err, BackendError::Unavailable(msg) if msg.contains("weights")));
}
