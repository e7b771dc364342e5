//! Orquestador del pipeline export -> quantize con degradación controlada.

pub mod builder;
pub mod core;
pub mod outcome;
pub mod state;

pub use builder::{PipelineBuilder, PipelineBuilderExport, PipelineBuilderInit};
pub use core::Pipeline;
pub use outcome::PipelineOutcome;
pub use state::{PipelineState, StateMachine};
