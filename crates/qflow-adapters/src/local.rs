//! Fetcher desde un directorio local (modelo ya descargado en otra ruta).

use std::path::PathBuf;

use log::info;
use qflow_core::{BackendError, ModelArtifact, ModelFetcher};

#[derive(Debug, Clone)]
pub struct LocalDirFetcher {
    from: PathBuf,
}

impl LocalDirFetcher {
    pub fn new(from: impl Into<PathBuf>) -> Self {
        Self { from: from.into() }
    }
}

impl ModelFetcher for LocalDirFetcher {
    /// `model_id` sólo se usa para el log: el contenido sale de `from`.
    fn fetch(&self, model_id: &str, dest: &std::path::Path) -> Result<(), BackendError> {
        let artifact = ModelArtifact::open(&self.from).map_err(|e| BackendError::Unavailable(e.to_string()))?;
        artifact.ensure_complete()
                .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        info!("copying {model_id} from {} to {}", self.from.display(), dest.display());
        artifact.copy_into(dest)
                .map_err(|e| BackendError::Unavailable(e.to_string()))
    }
}
