//! quantflow CLI
//!
//! ```bash
//! # descarga el modelo (si falta) y corre export -> quantize
//! quantflow setup
//! # sólo el pipeline, con otro perfil
//! quantflow quantize --profile avx2 --per-channel
//! # slot final y resultado por etapa de la última corrida
//! quantflow status
//! quantflow generate "Hello, how are you?"
//! quantflow chat --temperature 0.5
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use qflow_core::{OptimizationProfile, PipelineBuilderInit, PipelineOutcome, Slot, StageStatus};
use quantflow::backends::{describe_model, model_fetcher, model_loader, BackendKind, ConversionBackend};
use quantflow::serving::resolve_model_path;
use quantflow::{prepare_source, ChatSession, GenerationParams, InferenceService, QuantflowConfig, QUICK_QUESTIONS};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "quantflow=info,qflow_core=info,qflow_adapters=info,qflow_engine=info";

#[derive(Parser)]
#[command(name = "quantflow")]
#[command(version)]
#[command(about = "Export, quantize and chat with a causal language model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the source model if needed, then run the pipeline
    Setup {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Model id to download (overrides QUANTFLOW_MODEL_NAME)
        #[arg(long)]
        model: Option<String>,

        /// Copy the source model from a local directory instead of downloading
        #[arg(long)]
        from: Option<PathBuf>,

        /// Fetch again even if the source slot is complete
        #[arg(long)]
        force: bool,
    },

    /// Run export -> quantize over the existing source model
    Quantize {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show the last pipeline report and slot contents
    Status,

    /// Generate a single response
    Generate {
        /// Input prompt
        prompt: String,

        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Interactive chat
    Chat {
        #[command(flatten)]
        generation: GenerationArgs,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Export/quantization backend
    #[arg(long, value_enum, default_value_t = BackendKind::Cli)]
    backend: BackendKind,

    /// Quantization profile: arm64, avx2, avx512, avx512_vnni, tensorrt
    #[arg(long)]
    profile: Option<OptimizationProfile>,

    /// Per-channel weight quantization
    #[arg(long)]
    per_channel: bool,

    /// ONNX operator-set version
    #[arg(long)]
    opset: Option<u32>,
}

impl PipelineArgs {
    fn apply(&self, config: &mut QuantflowConfig) {
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if self.per_channel {
            config.profile = config.profile.with_per_channel(true);
        }
        if let Some(opset) = self.opset {
            config.opset = opset;
        }
    }
}

#[derive(Args)]
struct GenerationArgs {
    /// Max response length in tokens [50, 200]
    #[arg(long)]
    max_length: Option<usize>,

    /// Sampling temperature (0, 1]
    #[arg(long)]
    temperature: Option<f32>,
}

impl GenerationArgs {
    fn resolve(&self, config: &QuantflowConfig) -> Result<GenerationParams> {
        let params = GenerationParams::new(self.max_length.unwrap_or(config.generation.max_length()),
                                           self.temperature.unwrap_or(config.generation.temperature()))?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env()
                                            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
                                  .with(tracing_subscriber::fmt::layer())
                                  .init();

    let cli = Cli::parse();
    let mut config = QuantflowConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Setup { pipeline,
                          model,
                          from,
                          force, } => {
            if let Some(model) = model {
                config.model_name = model;
            }
            pipeline.apply(&mut config);
            let fetcher = model_fetcher(from)?;
            let status = prepare_source(&config.store(), fetcher.as_ref(), &config.model_name, force)?;
            info!("source model: {status:?}");
            run_pipeline(&config, pipeline.backend)
        }
        Commands::Quantize { pipeline } => {
            pipeline.apply(&mut config);
            run_pipeline(&config, pipeline.backend)
        }
        Commands::Status => run_status(&config),
        Commands::Generate { prompt, generation } => {
            let params = generation.resolve(&config)?;
            let service = load_service(&config)?;
            println!("{}", service.generate(&prompt, params));
            Ok(())
        }
        Commands::Chat { generation } => {
            let params = generation.resolve(&config)?;
            let service = load_service(&config)?;
            run_chat(&service, params)
        }
    }
}

fn run_pipeline(config: &QuantflowConfig, backend: BackendKind) -> Result<()> {
    let exporter = ConversionBackend::select(backend, &config.optimum_cli)?;
    let quantizer = ConversionBackend::select(backend, &config.optimum_cli)?;
    let mut pipeline = PipelineBuilderInit::new(config.store()).export_with(exporter, config.task())
                                                               .quantize_with(quantizer, config.profile)
                                                               .build();
    let outcome = pipeline.run()?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    println!("run {}", outcome.run_id);
    for stage in &outcome.stages {
        match (&stage.status, &stage.error_detail) {
            (StageStatus::Failed, Some(error)) => println!("  {:<9} failed: {error}", stage.stage_name),
            _ => println!("  {:<9} ok", stage.stage_name),
        }
    }
    println!("final slot: {} ({})", outcome.final_slot, outcome.final_path.display());
    if outcome.is_degraded() {
        println!("degraded: serving the original model");
    }
}

fn run_status(config: &QuantflowConfig) -> Result<()> {
    let store = config.store();
    for slot in [Slot::Source, Slot::Exported, Slot::Optimized] {
        let state = if store.is_complete(slot) {
            "complete"
        } else if store.exists(slot) {
            "present"
        } else {
            "missing"
        };
        println!("{:<9} {:<8} {}", slot.name(), state, store.path(slot).display());
    }
    match PipelineOutcome::load_if_present(store.report_path())? {
        Some(outcome) => {
            println!();
            print_outcome(&outcome);
            println!("finished at {}", outcome.finished_at);
        }
        None => println!("\nno pipeline report at {}", store.report_path().display()),
    }
    let serving = resolve_model_path(&store)?;
    if serving.exists() {
        match describe_model(&serving) {
            Ok(Some(summary)) => println!("loader sees {}: {summary}", serving.display()),
            Ok(None) => {}
            Err(e) => warn!("could not inspect {}: {e}", serving.display()),
        }
    }
    Ok(())
}

fn load_service(config: &QuantflowConfig) -> Result<InferenceService> {
    let path = resolve_model_path(&config.store())?;
    let loader = model_loader()?;
    let service = InferenceService::load(loader.as_ref(), &path)?;
    Ok(service)
}

fn run_chat(service: &InferenceService, params: GenerationParams) -> Result<()> {
    println!("quantflow chat ({})", service.model_path().display());
    println!("Commands: /clear, /quick <n>, /quit");
    for (i, question) in QUICK_QUESTIONS.iter().enumerate() {
        println!("  /quick {} -> {question}", i + 1);
    }
    println!();

    let mut session = ChatSession::new(service, params);
    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("(history cleared)\n");
            }
            _ if input.starts_with("/quick") => {
                let n = input["/quick".len()..].trim().parse::<usize>().unwrap_or(0);
                let question = n.checked_sub(1).and_then(|i| QUICK_QUESTIONS.get(i));
                match question {
                    Some(question) => {
                        println!("You: {question}");
                        let reply = session.send(question);
                        println!("Assistant: {reply}\n");
                    }
                    None => println!("usage: /quick <1-{}>\n", QUICK_QUESTIONS.len()),
                }
            }
            _ => {
                let reply = session.send(input);
                println!("Assistant: {reply}\n");
            }
        }
    }
    println!("Goodbye!");
    Ok(())
}
