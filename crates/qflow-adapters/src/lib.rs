//! qflow-adapters: backends que delegan en herramientas externas.
//!
//! - `OptimumCli`: export ONNX y quantización vía `optimum-cli` como proceso
//!   hijo bloqueante.
//! - `LocalDirFetcher`: toma el modelo fuente de un directorio local en vez
//!   de descargarlo.

pub mod local;
pub mod optimum_cli;

pub use local::LocalDirFetcher;
pub use optimum_cli::OptimumCli;
