#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use qflow_core::{BackendError, Exporter, ModelArtifact, OptimizationProfile, Quantizer, TaskDescriptor};

/// Escribe un bundle completo (pesos + config + tokenizer) en `dir`.
pub fn write_bundle(dir: &Path, weights: &str) {
    fs::create_dir_all(dir).expect("create bundle dir");
    fs::write(dir.join("pytorch_model.bin"), weights).expect("weights");
    fs::write(dir.join("config.json"), r#"{"model_type":"gpt2","vocab_size":50257}"#).expect("config");
    fs::write(dir.join("vocab.json"), r#"{"hello":0}"#).expect("vocab");
    fs::write(dir.join("merges.txt"), "#version: 0.2").expect("merges");
    fs::write(dir.join("tokenizer_config.json"), "{}").expect("tokenizer config");
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir).expect("read dir")
                                                  .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
                                                  .collect();
    names.sort();
    names
}

/// Entradas `*.onnx` de primer nivel: lo que el loader tomaría como grafo.
pub fn onnx_entries(dir: &Path) -> Vec<String> {
    list_dir(dir).into_iter().filter(|name| name.ends_with(".onnx")).collect()
}

#[derive(Clone, Default)]
pub struct FakeExporter {
    pub fail_with: Option<String>,
    /// Escribe el grafo antes de fallar.
    pub write_before_failing: bool,
    pub calls: Rc<Cell<usize>>,
}

impl FakeExporter {
    pub fn failing(message: &str) -> Self {
        Self { fail_with: Some(message.to_string()),
               ..Default::default() }
    }

    pub fn failing_midway(message: &str) -> Self {
        Self { write_before_failing: true,
               ..Self::failing(message) }
    }
}

impl Exporter for FakeExporter {
    fn name(&self) -> &str {
        "fake-export"
    }

    fn export(&self, source: &ModelArtifact, task: &TaskDescriptor, output: &Path) -> Result<(), BackendError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(msg) = &self.fail_with {
            if self.write_before_failing {
                fs::create_dir_all(output)?;
                fs::write(output.join("model.onnx"), "truncated graph")?;
            }
            return Err(BackendError::Io(io::Error::new(io::ErrorKind::Other, msg.clone())));
        }
        let weights = fs::read_to_string(source.root().join("pytorch_model.bin"))?;
        fs::create_dir_all(output)?;
        fs::write(output.join("model.onnx"), format!("graph[{}|opset={}]:{weights}", task.task, task.opset))?;
        fs::write(output.join("config.json"), "{}")?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantMode {
    Succeed,
    RejectProfile,
    /// Escribe un archivo y luego falla.
    Partial,
    /// Escribe sólo config: el bundle queda sin pesos.
    NoWeights,
}

#[derive(Clone)]
pub struct FakeQuantizer {
    pub mode: QuantMode,
    pub calls: Rc<Cell<usize>>,
}

impl FakeQuantizer {
    pub fn new(mode: QuantMode) -> Self {
        Self { mode,
               calls: Rc::new(Cell::new(0)) }
    }
}

impl Quantizer for FakeQuantizer {
    fn name(&self) -> &str {
        "fake-quantize"
    }

    fn quantize(&self, exported: &Path, profile: &OptimizationProfile, save_dir: &Path) -> Result<(), BackendError> {
        self.calls.set(self.calls.get() + 1);
        match self.mode {
            QuantMode::RejectProfile => Err(BackendError::Unsupported(format!("profile {profile} not supported"))),
            QuantMode::Partial => {
                fs::write(save_dir.join("model_quantized.onnx"), "half-written")?;
                Err(BackendError::Python("out of memory".into()))
            }
            QuantMode::NoWeights => {
                fs::write(save_dir.join("ort_config.json"), "{}")?;
                Ok(())
            }
            QuantMode::Succeed => {
                let graph = fs::read_to_string(exported.join("model.onnx"))?;
                fs::write(save_dir.join("model_quantized.onnx"), format!("q[{profile}]:{graph}"))?;
                fs::write(save_dir.join("ort_config.json"), "{}")?;
                Ok(())
            }
        }
    }
}
