//! Errores del core.
//!
//! `PipelineError` es la taxonomía observable (se guarda en eventos y en el
//! reporte, por eso es `Clone + Serialize`). `StoreError` cubre el acceso al
//! filesystem y se degrada a `PipelineError::Store` al cruzar el orquestador.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum PipelineError {
    #[error("missing source artifact: {0}")]
    MissingSourceArtifact(String),
    #[error("export failed: {0}")]
    ExportFailed(String),
    #[error("quantization failed: {0}")]
    QuantizationFailed(String),
    #[error("inference load failed: {0}")]
    InferenceLoadFailed(String),
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    #[error("artifact store: {0}")]
    Store(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PipelineError {
    /// `true` para fallos que el sistema absorbe (fallback o respuesta in-band).
    pub fn is_recoverable(&self) -> bool {
        matches!(self,
                 PipelineError::ExportFailed(_) | PipelineError::QuantizationFailed(_) | PipelineError::GenerationFailed(_))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no artifact found at {0}")]
    NotFound(PathBuf),
    #[error("artifact at {path} is incomplete (missing: {missing})")]
    Incomplete { path: PathBuf, missing: String },
    #[error("report serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io { path: path.to_path_buf(),
                                       source }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::Store(err.to_string())
    }
}
