//! Configuración de la aplicación.
//! Carga `.env` una sola vez y lee variables `QUANTFLOW_*`; los flags de la
//! CLI se aplican encima del resultado.
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use qflow_core::constants::DEFAULT_OPSET;
use qflow_core::{ArtifactStore, OptimizationProfile, StoreLayout, TaskDescriptor};

use crate::errors::ConfigError;
use crate::serving::GenerationParams;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_MODEL_NAME: &str = "microsoft/DialoGPT-small";

#[derive(Debug, Clone, PartialEq)]
pub struct QuantflowConfig {
    /// Identificador del modelo preentrenado a descargar en `setup`.
    pub model_name: String,
    pub model_dir: PathBuf,
    pub export_path: PathBuf,
    pub quantized_dir: PathBuf,
    pub report_path: PathBuf,
    pub opset: u32,
    pub profile: OptimizationProfile,
    pub optimum_cli: PathBuf,
    pub generation: GenerationParams,
}

impl Default for QuantflowConfig {
    fn default() -> Self {
        let layout = StoreLayout::default();
        Self { model_name: DEFAULT_MODEL_NAME.to_string(),
               model_dir: layout.source,
               export_path: layout.exported,
               quantized_dir: layout.optimized,
               report_path: layout.report,
               opset: DEFAULT_OPSET,
               profile: OptimizationProfile::default(),
               optimum_cli: PathBuf::from("optimum-cli"),
               generation: GenerationParams::default() }
    }
}

impl QuantflowConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let model_dir = lookup("QUANTFLOW_MODEL_DIR").map(PathBuf::from)
                                                     .unwrap_or(defaults.model_dir);
        // el grafo exportado vive dentro del directorio fuente salvo override
        let export_path = lookup("QUANTFLOW_EXPORT_PATH").map(PathBuf::from)
                                                         .unwrap_or_else(|| model_dir.join("model.onnx"));
        let generation = GenerationParams::new(parse_var(&lookup, "QUANTFLOW_MAX_LENGTH")?.unwrap_or(defaults.generation.max_length()),
                                               parse_var(&lookup, "QUANTFLOW_TEMPERATURE")?.unwrap_or(defaults.generation.temperature()))?;
        Ok(Self { model_name: lookup("QUANTFLOW_MODEL_NAME").unwrap_or(defaults.model_name),
                  model_dir,
                  export_path,
                  quantized_dir: lookup("QUANTFLOW_QUANTIZED_DIR").map(PathBuf::from)
                                                                  .unwrap_or(defaults.quantized_dir),
                  report_path: lookup("QUANTFLOW_REPORT_PATH").map(PathBuf::from)
                                                              .unwrap_or(defaults.report_path),
                  opset: parse_var(&lookup, "QUANTFLOW_OPSET")?.unwrap_or(defaults.opset),
                  profile: parse_var(&lookup, "QUANTFLOW_PROFILE")?.unwrap_or(defaults.profile),
                  optimum_cli: lookup("QUANTFLOW_OPTIMUM_CLI").map(PathBuf::from)
                                                              .unwrap_or(defaults.optimum_cli),
                  generation })
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout { source: self.model_dir.clone(),
                      exported: self.export_path.clone(),
                      optimized: self.quantized_dir.clone(),
                      report: self.report_path.clone() }
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.layout())
    }

    pub fn task(&self) -> TaskDescriptor {
        TaskDescriptor::text_generation(self.opset)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
    where F: Fn(&str) -> Option<String>,
          T: FromStr,
          T::Err: Display
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim()
                        .parse()
                        .map(Some)
                        .map_err(|e: T::Err| ConfigError::Invalid { key: key.to_string(),
                                                                    value: raw.clone(),
                                                                    reason: e.to_string() }),
    }
}
