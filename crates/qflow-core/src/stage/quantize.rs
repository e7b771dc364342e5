//! QuantizationStage: grafo exportado -> bundle optimizado.
//!
//! El quantizer escribe en el staging del slot `optimized`. El bundle se
//! completa con config/tokenizer del fuente si el quantizer no los copió y
//! sólo entonces se promueve. Ante cualquier fallo el staging se borra y el
//! slot no se toca.

use std::fs;

use log::{info, warn};
use serde_json::{json, Value};

use super::{Stage, StageContext, StageRunResult};
use crate::backend::Quantizer;
use crate::errors::PipelineError;
use crate::model::OptimizationProfile;
use crate::store::{remove_path, Slot};

#[derive(Debug)]
pub struct QuantizationStage<Q: Quantizer> {
    quantizer: Q,
    profile: OptimizationProfile,
}

impl<Q: Quantizer> QuantizationStage<Q> {
    pub fn new(quantizer: Q, profile: OptimizationProfile) -> Self {
        Self { quantizer, profile }
    }

    pub fn profile(&self) -> &OptimizationProfile {
        &self.profile
    }
}

impl<Q: Quantizer> Stage for QuantizationStage<Q> {
    fn id(&self) -> &str {
        "quantize"
    }

    fn params(&self) -> Value {
        json!({ "profile": self.profile.name(), "per_channel": self.profile.per_channel })
    }

    fn run(&self, ctx: &StageContext<'_>) -> StageRunResult {
        let Some(exported) = ctx.input else {
            return StageRunResult::Failed { error: PipelineError::QuantizationFailed("no exported graph to quantize".into()) };
        };
        let staging = ctx.store.staging_path(Slot::Optimized);
        info!("quantizing {} with profile {} via {}", exported.display(), self.profile, self.quantizer.name());

        let attempt = || -> Result<(), String> {
            remove_path(&staging).map_err(|e| format!("could not clear {}: {e}", staging.display()))?;
            fs::create_dir_all(&staging).map_err(|e| format!("could not create {}: {e}", staging.display()))?;
            self.quantizer.quantize(exported, &self.profile, &staging).map_err(|e| e.to_string())?;
            ctx.store
               .fill_missing_parts(&staging, ctx.source)
               .map_err(|e| format!("could not complete quantized bundle: {e}"))?;
            ctx.store
               .promote(&staging, Slot::Optimized)
               .map_err(|e| format!("quantized output rejected: {e}"))?;
            Ok(())
        };

        match attempt() {
            Ok(()) => StageRunResult::Success { output: ctx.store.path(Slot::Optimized).to_path_buf() },
            Err(message) => {
                warn!("quantization failed: {message}");
                if let Err(e) = remove_path(&staging) {
                    warn!("could not remove partial output {}: {e}", staging.display());
                }
                StageRunResult::Failed { error: PipelineError::QuantizationFailed(message) }
            }
        }
    }
}
