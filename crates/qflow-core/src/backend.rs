//! Contratos con los colaboradores externos.
//!
//! Export, quantización, descarga, carga y generación son llamadas a
//! librerías o herramientas de terceros. El core sólo conoce estos traits;
//! las implementaciones viven en `qflow-adapters` (procesos externos) y
//! `qflow-engine` (puente Python en proceso).

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::model::{ModelArtifact, OptimizationProfile, TaskDescriptor};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Process { program: String, status: String, stderr: String },
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("python: {0}")]
    Python(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Convierte un artifact fuente en un grafo portable escrito en `output`.
pub trait Exporter {
    fn name(&self) -> &str;
    fn export(&self, source: &ModelArtifact, task: &TaskDescriptor, output: &Path) -> Result<(), BackendError>;
}

/// Reduce la precisión del grafo exportado y escribe el resultado en
/// `save_dir` (que existe y está vacío al llamar).
pub trait Quantizer {
    fn name(&self) -> &str;
    fn quantize(&self, exported: &Path, profile: &OptimizationProfile, save_dir: &Path) -> Result<(), BackendError>;
}

/// Obtiene un modelo preentrenado y lo guarda como bundle en `dest`.
pub trait ModelFetcher {
    fn fetch(&self, model_id: &str, dest: &Path) -> Result<(), BackendError>;
}

/// Carga tokenizer + modelo desde un directorio de artifact.
pub trait ModelLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn TextGenerator + Send>, BackendError>;
}

/// Modelo cargado. `generate` devuelve el texto decodificado completo (puede
/// incluir el prompt o estar vacío; el servicio de inferencia lo normaliza).
pub trait TextGenerator {
    fn generate(&mut self, prompt: &str, max_length: usize, temperature: f32) -> Result<String, BackendError>;
}
