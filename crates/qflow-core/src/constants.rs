//! Constantes del pipeline.
//!
//! `PIPELINE_VERSION` entra en el cálculo de fingerprints (stages, manifest
//! y run). Cambiarla invalida deterministamente los fingerprints previos
//! aunque los artifacts no cambien.

/// Versión lógica del pipeline.
pub const PIPELINE_VERSION: &str = "P1.0";

/// Tarea de exportación usada para modelos causales.
pub const TEXT_GENERATION_TASK: &str = "text-generation";

/// Versión de operator-set ONNX por defecto.
pub const DEFAULT_OPSET: u32 = 14;

/// Sufijo del directorio de staging junto a cada slot.
pub const STAGING_SUFFIX: &str = "partial";
