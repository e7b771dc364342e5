//! Tipos de evento del pipeline.
//!
//! Cada corrida del orquestador emite eventos append-only a un `EventStore`.
//! La secuencia queda en el reporte y permite auditar qué etapa falló y qué
//! fallback se aplicó.
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::PipelineState;
use crate::errors::PipelineError;
use crate::store::Slot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEventKind {
    /// Primer evento de un `run_id`: fija el fuente y la configuración.
    PipelineInitialized {
        source_fingerprint: String,
        task: String,
        opset: u32,
        profile: String,
    },
    StageStarted { stage_index: usize, stage_id: String },
    StageFinished {
        stage_index: usize,
        stage_id: String,
        output: PathBuf,
        fingerprint: String,
    },
    StageFailed {
        stage_index: usize,
        stage_id: String,
        error: PipelineError,
        fingerprint: String,
    },
    /// Se limpió un slot para que no quede contenido obsoleto o parcial.
    SlotCleared { slot: Slot },
    FallbackApplied {
        from: PipelineState,
        final_slot: Slot,
        reason: PipelineError,
    },
    /// Evento de cierre: exactamente un slot final.
    PipelineCompleted { final_slot: Slot, run_fingerprint: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub seq: u64,
    pub run_id: Uuid,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
