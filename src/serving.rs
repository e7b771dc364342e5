//! Servicio de inferencia: recurso de proceso construido una vez al
//! arrancar y compartido por todos los handlers.
//!
//! Las llamadas a `generate` se serializan con un mutex. Los fallos de
//! generación nunca escapan: se devuelven en banda como texto.
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{info, warn};
use qflow_core::{ArtifactStore, ModelArtifact, ModelLoader, PipelineError, PipelineOutcome, Slot, TextGenerator};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const FALLBACK_RESPONSE: &str = "I'm not sure how to respond to that.";
pub const MIN_MAX_LENGTH: usize = 50;
pub const MAX_MAX_LENGTH: usize = 200;
pub const DEFAULT_MAX_LENGTH: usize = 100;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Parámetros de generación validados: `max_length` en [50, 200],
/// `temperature` en (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    max_length: usize,
    temperature: f32,
}

impl GenerationParams {
    pub fn new(max_length: usize, temperature: f32) -> Result<Self, ConfigError> {
        if !(MIN_MAX_LENGTH..=MAX_MAX_LENGTH).contains(&max_length) {
            return Err(ConfigError::MaxLengthOutOfRange { value: max_length,
                                                          min: MIN_MAX_LENGTH,
                                                          max: MAX_MAX_LENGTH });
        }
        if !(temperature > 0.0 && temperature <= 1.0) {
            return Err(ConfigError::TemperatureOutOfRange(temperature));
        }
        Ok(Self { max_length, temperature })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { max_length: DEFAULT_MAX_LENGTH,
               temperature: DEFAULT_TEMPERATURE }
    }
}

/// Directorio que debe cargar el serving: el slot final del último reporte
/// o, sin reporte, el slot optimizado. Un reporte que designe un slot no
/// servible se rechaza.
pub fn resolve_model_path(store: &ArtifactStore) -> Result<PathBuf, PipelineError> {
    match PipelineOutcome::load_if_present(store.report_path())? {
        Some(outcome) if !outcome.final_slot.is_servable() => {
            Err(PipelineError::InferenceLoadFailed(format!("report {} designates non-servable slot {}",
                                                           store.report_path().display(),
                                                           outcome.final_slot)))
        }
        Some(outcome) => Ok(outcome.final_path),
        None => Ok(store.path(Slot::Optimized).to_path_buf()),
    }
}

/// Quita el prompt del texto decodificado y sustituye la respuesta vacía.
pub fn clean_response(prompt: &str, decoded: &str) -> String {
    let stripped = if prompt.is_empty() {
        decoded.to_string()
    } else {
        decoded.replace(prompt, "")
    };
    match stripped.trim() {
        "" => FALLBACK_RESPONSE.to_string(),
        text => text.to_string(),
    }
}

pub struct InferenceService {
    model_path: PathBuf,
    generator: Mutex<Box<dyn TextGenerator + Send>>,
}

impl InferenceService {
    /// Falla con `InferenceLoadFailed` si `path` no existe o el bundle está
    /// incompleto. Nunca sustituye otro modelo.
    pub fn load<L: ModelLoader + ?Sized>(loader: &L, path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::InferenceLoadFailed(format!("model not found at {}; run `quantflow setup` first",
                                                                  path.display())));
        }
        let artifact = ModelArtifact::open(path).map_err(|e| PipelineError::InferenceLoadFailed(e.to_string()))?;
        artifact.ensure_complete()
                .map_err(|e| PipelineError::InferenceLoadFailed(e.to_string()))?;
        let generator = loader.load(path)
                              .map_err(|e| PipelineError::InferenceLoadFailed(e.to_string()))?;
        info!("model loaded from {}", path.display());
        Ok(Self { model_path: path.to_path_buf(),
                  generator: Mutex::new(generator) })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn try_generate(&self, prompt: &str, params: GenerationParams) -> Result<String, PipelineError> {
        // un panic previo no invalida el modelo cargado
        let mut generator = self.generator.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let decoded = generator.generate(prompt, params.max_length(), params.temperature())
                               .map_err(|e| PipelineError::GenerationFailed(e.to_string()))?;
        Ok(clean_response(prompt, &decoded))
    }

    /// Nunca falla y nunca devuelve una cadena vacía.
    pub fn generate(&self, prompt: &str, params: GenerationParams) -> String {
        match self.try_generate(prompt, params) {
            Ok(text) => text,
            Err(PipelineError::GenerationFailed(detail)) => {
                warn!("generation failed: {detail}");
                format!("Error generating response: {detail}")
            }
            Err(other) => format!("Error generating response: {other}"),
        }
    }
}
