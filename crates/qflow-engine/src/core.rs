use pyo3::ffi::c_str;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use std::ffi::CString;
use std::path::Path;
use std::sync::OnceLock;

use crate::ModelInfo;

static BRIDGE_MODULE: OnceLock<Py<PyModule>> = OnceLock::new();

pub fn init_python() -> PyResult<()> {
    if BRIDGE_MODULE.get().is_some() {
        return Ok(());
    }
    Python::attach(|py| {
        let code = CString::new(include_str!("../python/hf_bridge.py"))?;
        let module = PyModule::from_code(py, code.as_c_str(), c_str!("hf_bridge.py"), c_str!("hf_bridge"))?;
        BRIDGE_MODULE.set(module.unbind()).ok();
        Ok(())
    })
}

fn get_module(py: Python<'_>) -> PyResult<Py<PyModule>> {
    BRIDGE_MODULE.get()
                 .map(|module| module.clone_ref(py))
                 .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>("init_python() debe llamarse antes de usar el puente"))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn fetch_model(model_id: &str, dest: &Path) -> PyResult<()> {
    Python::attach(|py| {
        let bridge = get_module(py)?;
        bridge.bind(py).getattr("fetch_model")?.call1((model_id, path_arg(dest)))?;
        Ok(())
    })
}

pub fn export_onnx(source: &Path, output: &Path, task: &str, opset: u32) -> PyResult<()> {
    Python::attach(|py| {
        let bridge = get_module(py)?;
        bridge.bind(py)
              .getattr("export_onnx")?
              .call1((path_arg(source), path_arg(output), task, opset))?;
        Ok(())
    })
}

pub fn quantize(exported: &Path, save_dir: &Path, preset: &str, per_channel: bool) -> PyResult<()> {
    Python::attach(|py| {
        let bridge = get_module(py)?;
        bridge.bind(py)
              .getattr("quantize")?
              .call1((path_arg(exported), path_arg(save_dir), preset, per_channel))?;
        Ok(())
    })
}

/// Devuelve el objeto `LoadedModel` (tokenizer + modelo) del lado Python.
pub fn load(path: &Path) -> PyResult<Py<PyAny>> {
    Python::attach(|py| {
        let bridge = get_module(py)?;
        let loaded = bridge.bind(py).getattr("load")?.call1((path_arg(path),))?;
        Ok(loaded.unbind())
    })
}

pub fn generate(model: &Py<PyAny>, prompt: &str, max_length: usize, temperature: f32) -> PyResult<String> {
    Python::attach(|py| {
        model.bind(py)
             .call_method1("generate", (prompt, max_length, temperature))?
             .extract()
    })
}

pub fn describe(path: &Path) -> PyResult<ModelInfo> {
    Python::attach(|py| {
        let bridge = get_module(py)?;
        let binding = bridge.bind(py).getattr("describe")?.call1((path_arg(path),))?;
        let info = binding.downcast::<PyDict>()?;
        let json_str: String = py.import("json")?.call_method1("dumps", (info,))?.extract()?;
        serde_json::from_str(&json_str).map_err(|e| {
                                           PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Deserialization error: {}", e))
                                       })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_python().expect("init");
        init_python().expect("second init");
    }

    #[test]
    fn describe_detects_onnx_weights() {
        init_python().expect("init");
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("model_quantized.onnx"), "w").unwrap();
        let info = describe(dir.path()).expect("describe");
        assert_eq!(info.runtime, "onnxruntime");
        assert_eq!(info.files, vec!["config.json", "model_quantized.onnx"]);
    }

    #[test]
    fn graph_directory_inside_source_is_not_an_onnx_model() {
        init_python().expect("init");
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(dir.path().join("pytorch_model.bin"), "w").unwrap();
        std::fs::create_dir(dir.path().join("model.onnx")).unwrap();
        std::fs::write(dir.path().join("model.onnx").join("model.onnx"), "graph").unwrap();
        let info = describe(dir.path()).expect("describe");
        assert_eq!(info.runtime, "pytorch");
    }
}
