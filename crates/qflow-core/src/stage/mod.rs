//! Etapas del pipeline.
//!
//! Una etapa es una unidad bloqueante que envuelve una llamada a un
//! colaborador externo. Nunca propaga errores: devuelve un resultado
//! etiquetado (`StageRunResult`) que el orquestador usa para decidir el
//! fallback.

pub mod export;
pub mod quantize;
mod result;

pub use export::ExportStage;
pub use quantize::QuantizationStage;
pub use result::{PipelineStageResult, StageRunResult, StageStatus};

use std::path::Path;

use serde_json::Value;

use crate::model::ModelArtifact;
use crate::store::ArtifactStore;

/// Contexto entregado a `Stage::run`.
pub struct StageContext<'a> {
    pub store: &'a ArtifactStore,
    /// Bundle fuente ya validado en `Init`.
    pub source: &'a ModelArtifact,
    /// Salida de la etapa previa (`None` para la primera).
    pub input: Option<&'a Path>,
}

pub trait Stage {
    /// Identificador estable, usado como `stage_name` en los resultados.
    fn id(&self) -> &str;

    /// Parámetros deterministas; entran en el fingerprint de la etapa.
    fn params(&self) -> Value;

    fn run(&self, ctx: &StageContext<'_>) -> StageRunResult;
}
