#![allow(dead_code)]
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use qflow_core::{BackendError, ModelFetcher, ModelLoader, TextGenerator};

pub fn write_bundle(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("pytorch_model.bin"), b"weights").unwrap();
    fs::write(dir.join("config.json"), br#"{"model_type":"gpt2"}"#).unwrap();
    fs::write(dir.join("vocab.json"), b"{}").unwrap();
    fs::write(dir.join("merges.txt"), b"").unwrap();
}

/// Generador de prueba: devuelve `prompt + suffix` o falla.
pub struct EchoGenerator {
    pub suffix: String,
    pub fail: bool,
    pub calls: Arc<Mutex<Vec<(String, usize, f32)>>>,
}

impl TextGenerator for EchoGenerator {
    fn generate(&mut self, prompt: &str, max_length: usize, temperature: f32) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push((prompt.to_string(), max_length, temperature));
        if self.fail {
            return Err(BackendError::Python("CUDA out of memory".into()));
        }
        Ok(format!("{prompt}{}", self.suffix))
    }
}

#[derive(Default)]
pub struct EchoLoader {
    pub suffix: String,
    pub fail_generate: bool,
    pub fail_load: bool,
    pub calls: Arc<Mutex<Vec<(String, usize, f32)>>>,
}

impl EchoLoader {
    pub fn replying(suffix: &str) -> Self {
        Self { suffix: suffix.to_string(),
               ..Self::default() }
    }
}

impl ModelLoader for EchoLoader {
    fn load(&self, _path: &Path) -> Result<Box<dyn TextGenerator + Send>, BackendError> {
        if self.fail_load {
            return Err(BackendError::Python("corrupt weights".into()));
        }
        Ok(Box::new(EchoGenerator { suffix: self.suffix.clone(),
                                    fail: self.fail_generate,
                                    calls: Arc::clone(&self.calls) }))
    }
}

/// Fetcher de prueba: escribe un bundle (completo o no) en `dest`.
pub struct FakeFetcher {
    pub complete: bool,
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self { complete: true,
               fail: false,
               calls: Mutex::new(Vec::new()) }
    }
}

impl ModelFetcher for FakeFetcher {
    fn fetch(&self, model_id: &str, dest: &Path) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(model_id.to_string());
        if self.fail {
            return Err(BackendError::Unavailable("offline".into()));
        }
        write_bundle(dest);
        if !self.complete {
            fs::remove_file(dest.join("config.json")).unwrap();
        }
        Ok(())
    }
}
