//! Implementación del orquestador.

use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use chrono::Utc;

use super::{PipelineOutcome, PipelineState, StateMachine};
use crate::backend::{Exporter, Quantizer};
use crate::constants::PIPELINE_VERSION;
use crate::errors::PipelineError;
use crate::event::{EventStore, PipelineEventKind};
use crate::hashing::hash_value;
use crate::model::ModelArtifact;
use crate::stage::{ExportStage, PipelineStageResult, QuantizationStage, Stage, StageContext, StageRunResult};
use crate::store::{ArtifactStore, Slot};

/// Orquestador: ejecuta export y quantize en orden y decide el slot final.
///
/// Los fallos de etapa nunca escapan de `run`: se convierten en un fallback
/// al slot `source`. Sólo la ausencia del fuente (precondición) y errores del
/// propio filesystem al cerrar la corrida se devuelven como `Err`.
#[derive(Debug)]
pub struct Pipeline<E: Exporter, Q: Quantizer, S: EventStore> {
    store: ArtifactStore,
    export: ExportStage<E>,
    quantize: QuantizationStage<Q>,
    events: S,
}

impl<E: Exporter, Q: Quantizer, S: EventStore> Pipeline<E, Q, S> {
    pub fn new(store: ArtifactStore, export: ExportStage<E>, quantize: QuantizationStage<Q>, events: S) -> Self {
        Self { store,
               export,
               quantize,
               events }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn event_store(&self) -> &S {
        &self.events
    }

    /// Init: el slot `source` debe existir y estar completo.
    fn load_source(&self) -> Result<ModelArtifact, PipelineError> {
        let path = self.store.path(Slot::Source);
        if !self.store.exists(Slot::Source) {
            return Err(PipelineError::MissingSourceArtifact(format!("no model found at {}", path.display())));
        }
        let source = self.store
                         .open(Slot::Source)
                         .map_err(|e| PipelineError::MissingSourceArtifact(e.to_string()))?;
        source.ensure_complete()
              .map_err(|e| PipelineError::MissingSourceArtifact(e.to_string()))?;
        Ok(source)
    }

    /// Ejecuta la corrida completa hasta `Done`.
    pub fn run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut machine = StateMachine::new();

        let source = self.load_source()?;
        let source_fp = source.manifest()?.fingerprint;
        info!("pipeline {run_id}: source {} ({})", source.root().display(), source_fp.get(..12).unwrap_or(&source_fp));
        self.events.append_kind(run_id,
                                PipelineEventKind::PipelineInitialized { source_fingerprint: source_fp.clone(),
                                                                         task: self.export.task().task.clone(),
                                                                         opset: self.export.task().opset,
                                                                         profile: self.quantize.profile().to_string() });

        let mut stages: Vec<PipelineStageResult> = Vec::with_capacity(2);
        let mut stage_fps: Vec<String> = Vec::with_capacity(2);

        machine.advance(PipelineState::Exporting)?;
        let ctx = StageContext { store: &self.store,
                                 source: &source,
                                 input: None };
        let (export_rec, fp) = execute_stage(&mut self.events, run_id, 0, &self.export, &ctx, &source_fp);
        stage_fps.push(fp);
        stages.push(export_rec.clone());

        let final_slot = match export_rec.output_location {
            None => {
                machine.advance(PipelineState::FallbackToSource)?;
                self.fall_back(run_id, PipelineState::FallbackToSource, export_rec.error_detail)
            }
            Some(exported) => {
                machine.advance(PipelineState::Quantizing)?;
                let ctx = StageContext { store: &self.store,
                                         source: &source,
                                         input: Some(exported.as_path()) };
                let (quant_rec, fp) = execute_stage(&mut self.events, run_id, 1, &self.quantize, &ctx, &source_fp);
                stage_fps.push(fp);
                stages.push(quant_rec.clone());
                if quant_rec.is_success() {
                    Slot::Optimized
                } else {
                    machine.advance(PipelineState::FallbackToExported)?;
                    // El grafo intermedio no es servible: se vuelve al original.
                    self.fall_back(run_id, PipelineState::FallbackToExported, quant_rec.error_detail)
                }
            }
        };
        machine.advance(PipelineState::Done)?;

        let final_artifact = self.store.open(final_slot)?;
        final_artifact.ensure_complete()?;
        let final_fingerprint = final_artifact.manifest()?.fingerprint;
        let run_fingerprint = hash_value(&json!({
                                             "pipeline_version": PIPELINE_VERSION,
                                             "source_fingerprint": source_fp,
                                             "stage_fingerprints": stage_fps,
                                             "final_slot": final_slot.name(),
                                             "final_fingerprint": final_fingerprint,
                                         }));
        self.events.append_kind(run_id,
                                PipelineEventKind::PipelineCompleted { final_slot,
                                                                       run_fingerprint: run_fingerprint.clone() });

        let degradation = stages.iter().find_map(|s| s.error_detail.clone());
        let outcome = PipelineOutcome { run_id,
                                        final_slot,
                                        final_path: self.store.path(final_slot).to_path_buf(),
                                        final_fingerprint,
                                        run_fingerprint,
                                        stages,
                                        trace: machine.into_trace(),
                                        degradation,
                                        events: self.events.list(run_id),
                                        started_at,
                                        finished_at: Utc::now() };

        match &outcome.degradation {
            None => info!("pipeline {run_id}: done, serving slot {final_slot}"),
            Some(reason) => warn!("pipeline {run_id}: degraded to slot {final_slot} ({reason})"),
        }
        if let Err(e) = outcome.save(self.store.report_path()) {
            warn!("could not write pipeline report to {}: {e}", self.store.report_path().display());
        }
        Ok(outcome)
    }

    /// Aplica el fallback al fuente. Se limpian `optimized` (nada obsoleto o
    /// parcial puede servirse) y `exported`, que vive dentro del directorio
    /// fuente y el loader lo tomaría por un grafo ONNX.
    fn fall_back(&mut self, run_id: Uuid, from: PipelineState, reason: Option<PipelineError>) -> Slot {
        for slot in [Slot::Optimized, Slot::Exported] {
            match self.store.clear(slot) {
                Ok(true) => {
                    self.events.append_kind(run_id, PipelineEventKind::SlotCleared { slot });
                }
                Ok(false) => {}
                Err(e) => warn!("could not clear {slot} slot: {e}"),
            }
        }
        let reason = reason.unwrap_or_else(|| PipelineError::Internal("stage failed without detail".into()));
        warn!("falling back to source after {from:?}: {reason}");
        self.events.append_kind(run_id,
                                PipelineEventKind::FallbackApplied { from,
                                                                     final_slot: Slot::Source,
                                                                     reason });
        Slot::Source
    }
}

/// Corre una etapa registrando StageStarted y StageFinished/StageFailed.
fn execute_stage<S: EventStore>(events: &mut S,
                                run_id: Uuid,
                                stage_index: usize,
                                stage: &dyn Stage,
                                ctx: &StageContext<'_>,
                                source_fp: &str)
                                -> (PipelineStageResult, String) {
    let fingerprint = hash_value(&json!({
                                     "pipeline_version": PIPELINE_VERSION,
                                     "stage_index": stage_index,
                                     "stage_id": stage.id(),
                                     "params": stage.params(),
                                     "source_fingerprint": source_fp,
                                 }));
    let stage_id = stage.id().to_string();
    events.append_kind(run_id,
                       PipelineEventKind::StageStarted { stage_index,
                                                         stage_id: stage_id.clone() });

    let result = stage.run(ctx);
    let kind = match &result {
        StageRunResult::Success { output } => PipelineEventKind::StageFinished { stage_index,
                                                                                 stage_id: stage_id.clone(),
                                                                                 output: output.clone(),
                                                                                 fingerprint: fingerprint.clone() },
        StageRunResult::Failed { error } => PipelineEventKind::StageFailed { stage_index,
                                                                             stage_id: stage_id.clone(),
                                                                             error: error.clone(),
                                                                             fingerprint: fingerprint.clone() },
    };
    events.append_kind(run_id, kind);
    (result.into_record(&stage_id), fingerprint)
}
