//! Selección de backends según la compilación y la configuración.
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use qflow_adapters::{LocalDirFetcher, OptimumCli};
use qflow_core::{BackendError, Exporter, ModelArtifact, ModelFetcher, ModelLoader, OptimizationProfile, Quantizer,
                 TaskDescriptor};

#[cfg(not(feature = "python"))]
const NO_PYTHON: &str = "quantflow was built without the `python` feature";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// `optimum-cli` como proceso hijo.
    Cli,
    /// `transformers`/`optimum` en proceso.
    Python,
}

/// Backend de export + quantización elegido en tiempo de ejecución.
pub enum ConversionBackend {
    Cli(OptimumCli),
    #[cfg(feature = "python")]
    Python(qflow_engine::HfEngine),
}

impl ConversionBackend {
    pub fn select(kind: BackendKind, optimum_cli: &Path) -> Result<Self, BackendError> {
        match kind {
            BackendKind::Cli => Ok(Self::Cli(OptimumCli::new(optimum_cli))),
            #[cfg(feature = "python")]
            BackendKind::Python => Ok(Self::Python(qflow_engine::HfEngine::init()?)),
            #[cfg(not(feature = "python"))]
            BackendKind::Python => Err(BackendError::Unavailable(NO_PYTHON.to_string())),
        }
    }
}

impl Exporter for ConversionBackend {
    fn name(&self) -> &str {
        match self {
            Self::Cli(cli) => Exporter::name(cli),
            #[cfg(feature = "python")]
            Self::Python(engine) => Exporter::name(engine),
        }
    }

    fn export(&self, source: &ModelArtifact, task: &TaskDescriptor, output: &Path) -> Result<(), BackendError> {
        match self {
            Self::Cli(cli) => cli.export(source, task, output),
            #[cfg(feature = "python")]
            Self::Python(engine) => engine.export(source, task, output),
        }
    }
}

impl Quantizer for ConversionBackend {
    fn name(&self) -> &str {
        match self {
            Self::Cli(cli) => Quantizer::name(cli),
            #[cfg(feature = "python")]
            Self::Python(engine) => Quantizer::name(engine),
        }
    }

    fn quantize(&self, exported: &Path, profile: &OptimizationProfile, save_dir: &Path) -> Result<(), BackendError> {
        match self {
            Self::Cli(cli) => cli.quantize(exported, profile, save_dir),
            #[cfg(feature = "python")]
            Self::Python(engine) => engine.quantize(exported, profile, save_dir),
        }
    }
}

/// Fetcher para `setup`: copia local si se indica `from`, si no descarga
/// con el puente Python.
pub fn model_fetcher(from: Option<PathBuf>) -> Result<Box<dyn ModelFetcher>, BackendError> {
    if let Some(dir) = from {
        return Ok(Box::new(LocalDirFetcher::new(dir)));
    }
    #[cfg(feature = "python")]
    {
        Ok(Box::new(qflow_engine::HfEngine::init()?))
    }
    #[cfg(not(feature = "python"))]
    {
        Err(BackendError::Unavailable(format!("{NO_PYTHON}; use --from <dir>")))
    }
}

/// Cómo vería el loader el directorio `path` (`None` sin la feature
/// `python`).
pub fn describe_model(path: &Path) -> Result<Option<String>, BackendError> {
    #[cfg(feature = "python")]
    {
        let info = qflow_engine::HfEngine::init()?.describe(path)?;
        Ok(Some(info.summary()))
    }
    #[cfg(not(feature = "python"))]
    {
        let _ = path;
        Ok(None)
    }
}

pub fn model_loader() -> Result<Box<dyn ModelLoader>, BackendError> {
    #[cfg(feature = "python")]
    {
        Ok(Box::new(qflow_engine::HfEngine::init()?))
    }
    #[cfg(not(feature = "python"))]
    {
        Err(BackendError::Unavailable(NO_PYTHON.to_string()))
    }
}
