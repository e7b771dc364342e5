//! ExportStage: bundle fuente -> grafo portable.
//!
//! Cualquier fallo del exporter se reduce a `ExportFailed(mensaje)`, sin
//! reintentos.

use std::path::PathBuf;

use log::{info, warn};
use serde_json::{json, Value};

use super::{Stage, StageContext, StageRunResult};
use crate::backend::Exporter;
use crate::errors::PipelineError;
use crate::model::TaskDescriptor;
use crate::store::remove_path;

#[derive(Debug)]
pub struct ExportStage<E: Exporter> {
    exporter: E,
    task: TaskDescriptor,
    output: PathBuf,
}

impl<E: Exporter> ExportStage<E> {
    pub fn new(exporter: E, task: TaskDescriptor, output: PathBuf) -> Self {
        Self { exporter, task, output }
    }

    pub fn task(&self) -> &TaskDescriptor {
        &self.task
    }

    /// Ninguna salida de un export fallido queda en disco: el grafo vive
    /// dentro del slot fuente, que puede terminar siendo el servido.
    fn failed(&self, message: String) -> StageRunResult {
        warn!("export via {} failed: {message}", self.exporter.name());
        if let Err(e) = remove_path(&self.output) {
            warn!("could not remove partial export {}: {e}", self.output.display());
        }
        StageRunResult::Failed { error: PipelineError::ExportFailed(message) }
    }
}

impl<E: Exporter> Stage for ExportStage<E> {
    fn id(&self) -> &str {
        "export"
    }

    fn params(&self) -> Value {
        json!({ "task": self.task.task, "opset": self.task.opset })
    }

    fn run(&self, ctx: &StageContext<'_>) -> StageRunResult {
        info!("exporting {} to {} (task={}, opset={})",
              ctx.source.root().display(),
              self.output.display(),
              self.task.task,
              self.task.opset);
        // grafo de una corrida anterior
        if let Err(e) = remove_path(&self.output) {
            return self.failed(format!("could not clear {}: {e}", self.output.display()));
        }
        if let Err(e) = self.exporter.export(ctx.source, &self.task, &self.output) {
            return self.failed(e.to_string());
        }
        if !self.output.exists() {
            return self.failed(format!("{} reported success but wrote nothing at {}",
                                       self.exporter.name(),
                                       self.output.display()));
        }
        StageRunResult::Success { output: self.output.clone() }
    }
}
