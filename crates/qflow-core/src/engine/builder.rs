//! Builder para `Pipeline`.
//!
//! Patrón builder por estados: primero se declara el store, luego el exporter con su `TaskDescriptor`, luego el
//! quantizer con su `OptimizationProfile`. `build` sólo existe cuando ambas
//! etapas están configuradas.
//!
//! ```ignore
//! let mut pipeline = PipelineBuilderInit::new(ArtifactStore::new(layout))
//!     .export_with(OptimumCli::default(), TaskDescriptor::default())
//!     .quantize_with(OptimumCli::default(), OptimizationProfile::default())
//!     .build();
//! let outcome = pipeline.run()?;
//! ```

use crate::backend::{Exporter, Quantizer};
use crate::engine::Pipeline;
use crate::event::{EventStore, InMemoryEventStore};
use crate::model::{OptimizationProfile, TaskDescriptor};
use crate::stage::{ExportStage, QuantizationStage};
use crate::store::{ArtifactStore, Slot};

/// Estado inicial del builder.
#[derive(Debug)]
pub struct PipelineBuilderInit<S: EventStore> {
    store: ArtifactStore,
    events: S,
}

impl PipelineBuilderInit<InMemoryEventStore> {
    #[inline]
    pub fn new(store: ArtifactStore) -> Self {
        Self { store,
               events: InMemoryEventStore::default() }
    }
}

impl<S: EventStore> PipelineBuilderInit<S> {
    /// Declara la etapa de export. La salida va al slot `exported`.
    #[inline]
    pub fn export_with<E: Exporter>(self, exporter: E, task: TaskDescriptor) -> PipelineBuilderExport<E, S> {
        let output = self.store.path(Slot::Exported).to_path_buf();
        PipelineBuilderExport { store: self.store,
                                events: self.events,
                                export: ExportStage::new(exporter, task, output) }
    }
}

/// Builder con export configurado; falta la quantización.
#[derive(Debug)]
pub struct PipelineBuilderExport<E: Exporter, S: EventStore> {
    store: ArtifactStore,
    events: S,
    export: ExportStage<E>,
}

impl<E: Exporter, S: EventStore> PipelineBuilderExport<E, S> {
    #[inline]
    pub fn quantize_with<Q: Quantizer>(self, quantizer: Q, profile: OptimizationProfile) -> PipelineBuilder<E, Q, S> {
        PipelineBuilder { store: self.store,
                          events: self.events,
                          export: self.export,
                          quantize: QuantizationStage::new(quantizer, profile) }
    }
}

/// Builder completo.
#[derive(Debug)]
pub struct PipelineBuilder<E: Exporter, Q: Quantizer, S: EventStore> {
    store: ArtifactStore,
    events: S,
    export: ExportStage<E>,
    quantize: QuantizationStage<Q>,
}

impl<E: Exporter, Q: Quantizer, S: EventStore> PipelineBuilder<E, Q, S> {
    #[inline]
    pub fn build(self) -> Pipeline<E, Q, S> {
        Pipeline::new(self.store, self.export, self.quantize, self.events)
    }
}
