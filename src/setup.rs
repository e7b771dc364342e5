//! Adquisición del modelo fuente.
use log::info;
use qflow_core::store::remove_path;
use qflow_core::{ArtifactStore, ModelFetcher, PipelineError, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    AlreadyPresent,
    Fetched,
}

/// Descarga `model_id` al slot fuente si falta o está incompleto (o si
/// `force`). La descarga se escribe en staging y sólo se promueve completa.
pub fn prepare_source<F: ModelFetcher + ?Sized>(store: &ArtifactStore,
                                                fetcher: &F,
                                                model_id: &str,
                                                force: bool)
                                                -> Result<SourceStatus, PipelineError> {
    if !force && store.is_complete(Slot::Source) {
        info!("source model already present at {}", store.path(Slot::Source).display());
        return Ok(SourceStatus::AlreadyPresent);
    }
    let staging = store.staging_path(Slot::Source);
    remove_path(&staging).map_err(|e| PipelineError::Store(e.to_string()))?;
    let promoted = fetcher.fetch(model_id, &staging)
                          .map_err(|e| PipelineError::MissingSourceArtifact(format!("could not fetch {model_id}: {e}")))
                          .and_then(|_| store.promote(&staging, Slot::Source).map_err(PipelineError::from));
    if let Err(e) = promoted {
        let _ = remove_path(&staging);
        return Err(e);
    }
    Ok(SourceStatus::Fetched)
}
