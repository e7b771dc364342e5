//! Resultado de una corrida y su persistencia como reporte JSON.
//!
//! El reporte es la designación del slot final: el lado de serving lo lee
//! para saber qué directorio cargar.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PipelineState;
use crate::errors::{PipelineError, StoreError};
use crate::event::PipelineEvent;
use crate::stage::PipelineStageResult;
use crate::store::Slot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    /// Único slot designado como final. Nunca `Exported`.
    pub final_slot: Slot,
    pub final_path: PathBuf,
    pub final_fingerprint: String,
    pub run_fingerprint: String,
    pub stages: Vec<PipelineStageResult>,
    pub trace: Vec<PipelineState>,
    /// Fallo de etapa que provocó el fallback, si lo hubo.
    pub degradation: Option<PipelineError>,
    pub events: Vec<PipelineEvent>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineOutcome {
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    pub fn failure(&self) -> Option<&PipelineError> {
        self.degradation.as_ref()
    }

    pub fn stage(&self, name: &str) -> Option<&PipelineStageResult> {
        self.stages.iter().find(|s| s.stage_name == name)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(StoreError::io(path))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).map_err(StoreError::io(path))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Carga el reporte si existe; `Ok(None)` si nunca se corrió el pipeline.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>, StoreError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }
}
