use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Slot con nombre: la salida de una etapa del pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Modelo tal como se descargó.
    Source,
    /// Grafo intermedio exportado. Nunca se sirve directamente.
    Exported,
    /// Artifact final optimizado.
    Optimized,
}

impl Slot {
    pub fn name(&self) -> &'static str {
        match self {
            Slot::Source => "source",
            Slot::Exported => "exported",
            Slot::Optimized => "optimized",
        }
    }

    /// Slots que el loader de inferencia puede consumir.
    pub fn is_servable(&self) -> bool {
        !matches!(self, Slot::Exported)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rutas concretas de cada slot y del reporte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLayout {
    pub source: PathBuf,
    pub exported: PathBuf,
    pub optimized: PathBuf,
    pub report: PathBuf,
}

impl StoreLayout {
    pub fn rooted_at(root: &Path) -> Self {
        let source = root.join("model");
        Self { exported: source.join("model.onnx"),
               source,
               optimized: root.join("quantized_model"),
               report: root.join("pipeline_report.json") }
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self { source: PathBuf::from("model"),
               exported: PathBuf::from("model/model.onnx"),
               optimized: PathBuf::from("quantized_model"),
               report: PathBuf::from("pipeline_report.json") }
    }
}
