use std::path::Path;

use log::info;
use pyo3::prelude::*;
use qflow_core::{BackendError, Exporter, ModelArtifact, ModelFetcher, ModelLoader, OptimizationProfile, Quantizer,
                 TaskDescriptor, TextGenerator};

use crate::{core, quantization_preset, EngineError, ModelInfo};

/// Backend en proceso. Construirlo inicializa el intérprete y el módulo
/// puente una sola vez.
pub struct HfEngine {
    _private: (),
}

impl HfEngine {
    pub fn init() -> Result<Self, EngineError> {
        core::init_python().map_err(|e| EngineError::Init(e.to_string()))?;
        Ok(Self { _private: () })
    }

    pub fn describe(&self, path: &Path) -> Result<ModelInfo, EngineError> {
        core::describe(path).map_err(|e| call_error("describe", e))
    }
}

fn call_error(call: &'static str, e: PyErr) -> EngineError {
    EngineError::Call { call, detail: e.to_string() }
}

impl ModelFetcher for HfEngine {
    fn fetch(&self, model_id: &str, dest: &Path) -> Result<(), BackendError> {
        info!("downloading {model_id} into {}", dest.display());
        core::fetch_model(model_id, dest).map_err(|e| call_error("fetch_model", e).into())
    }
}

impl Exporter for HfEngine {
    fn name(&self) -> &str {
        "optimum-python"
    }

    fn export(&self, source: &ModelArtifact, task: &TaskDescriptor, output: &Path) -> Result<(), BackendError> {
        core::export_onnx(source.root(), output, &task.task, task.opset).map_err(|e| call_error("export_onnx", e).into())
    }
}

impl Quantizer for HfEngine {
    fn name(&self) -> &str {
        "optimum-python"
    }

    fn quantize(&self, exported: &Path, profile: &OptimizationProfile, save_dir: &Path) -> Result<(), BackendError> {
        core::quantize(exported, save_dir, quantization_preset(profile), profile.per_channel)
            .map_err(|e| call_error("quantize", e).into())
    }
}

impl ModelLoader for HfEngine {
    fn load(&self, path: &Path) -> Result<Box<dyn TextGenerator + Send>, BackendError> {
        let inner = core::load(path).map_err(|e| BackendError::from(call_error("load", e)))?;
        Ok(Box::new(HfModel { inner }))
    }
}

/// Tokenizer + modelo vivos en el intérprete.
pub struct HfModel {
    inner: Py<PyAny>,
}

impl TextGenerator for HfModel {
    fn generate(&mut self, prompt: &str, max_length: usize, temperature: f32) -> Result<String, BackendError> {
        core::generate(&self.inner, prompt, max_length, temperature).map_err(|e| call_error("generate", e).into())
    }
}
