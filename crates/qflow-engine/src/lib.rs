//! qflow-engine: puente en proceso hacia `transformers` / `optimum`.
//!
//! Con la feature `python` expone `HfEngine`, que implementa los cuatro
//! contratos de backend (descarga, export, quantización y carga) llamando a
//! un módulo Python embebido. Sin la feature el crate sólo aporta los tipos
//! compartidos.
use qflow_core::{BackendError, InstructionSet, OptimizationProfile};
use serde::Deserialize;
use thiserror::Error;

#[cfg(feature = "python")]
pub mod core;
#[cfg(feature = "python")]
mod hf;

#[cfg(feature = "python")]
pub use hf::{HfEngine, HfModel};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Error inicializando Python: {0}")]
    Init(String),
    #[error("Error en {call}: {detail}")]
    Call { call: &'static str, detail: String },
}

impl From<EngineError> for BackendError {
    fn from(e: EngineError) -> Self {
        BackendError::Python(e.to_string())
    }
}

/// Resumen de un directorio de modelo tal como lo ve el runtime Python.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    pub path: String,
    pub runtime: String,
    pub files: Vec<String>,
}

impl ModelInfo {
    /// Línea para `quantflow status`.
    pub fn summary(&self) -> String {
        format!("{} ({} files)", self.runtime, self.files.len())
    }
}

/// Nombre del preset de `AutoQuantizationConfig` para un perfil.
pub fn quantization_preset(profile: &OptimizationProfile) -> &'static str {
    match profile.target {
        InstructionSet::Arm64 => "arm64",
        InstructionSet::Avx2 => "avx2",
        InstructionSet::Avx512 => "avx512",
        InstructionSet::Avx512Vnni => "avx512_vnni",
        InstructionSet::TensorRt => "tensorrt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_info_from_bridge_json() {
        let info: ModelInfo =
            serde_json::from_str(r#"{"path":"q","runtime":"onnxruntime","files":["config.json","model_quantized.onnx"]}"#).unwrap();
        assert_eq!(info.summary(), "onnxruntime (2 files)");
    }

    #[test]
    fn presets_match_profile_names() {
        for target in InstructionSet::ALL {
            let profile = OptimizationProfile::new(target);
            assert_eq!(quantization_preset(&profile), profile.name());
        }
    }

    #[test]
    fn engine_error_maps_to_python_backend_error() {
        let e: BackendError = EngineError::Call { call: "load", detail: "boom".into() }.into();
        assert!(matches!(e, BackendError::Python(msg) if msg.contains("boom")));
    }
}
