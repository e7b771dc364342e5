use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Resultado etiquetado de ejecutar una etapa.
#[derive(Debug)]
pub enum StageRunResult {
    Success { output: PathBuf },
    Failed { error: PipelineError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Success,
    Failed,
}

/// Registro de una etapa tal como lo consume el orquestador y el reporte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStageResult {
    pub stage_name: String,
    pub status: StageStatus,
    pub output_location: Option<PathBuf>,
    pub error_detail: Option<PipelineError>,
}

impl PipelineStageResult {
    pub fn success(stage_name: &str, output: PathBuf) -> Self {
        Self { stage_name: stage_name.to_string(),
               status: StageStatus::Success,
               output_location: Some(output),
               error_detail: None }
    }

    pub fn failed(stage_name: &str, error: PipelineError) -> Self {
        Self { stage_name: stage_name.to_string(),
               status: StageStatus::Failed,
               output_location: None,
               error_detail: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

impl StageRunResult {
    pub fn into_record(self, stage_name: &str) -> PipelineStageResult {
        match self {
            StageRunResult::Success { output } => PipelineStageResult::success(stage_name, output),
            StageRunResult::Failed { error } => PipelineStageResult::failed(stage_name, error),
        }
    }
}
