//! qflow-core: pipeline export -> quantize con degradación controlada.
//!
//! - `store`: convención de slots (`source`, `exported`, `optimized`).
//! - `stage`: etapas de export y quantización con resultado etiquetado.
//! - `engine`: orquestador (máquina de estados + fallback) y reporte.
//! - `backend`: contratos con los colaboradores externos.
pub mod backend;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod stage;
pub mod store;

pub use backend::{BackendError, Exporter, ModelFetcher, ModelLoader, Quantizer, TextGenerator};
pub use engine::{Pipeline, PipelineBuilderInit, PipelineOutcome, PipelineState};
pub use errors::{PipelineError, StoreError};
pub use event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use model::{ArtifactManifest, ArtifactPart, InstructionSet, ModelArtifact, OptimizationProfile, TaskDescriptor};
pub use stage::{PipelineStageResult, Stage, StageStatus};
pub use store::{ArtifactStore, Slot, StoreLayout};
