//! Backend `optimum-cli`.
//!
//! Export:   `optimum-cli export onnx --model <src> --task <task> --opset <n> <out>`
//! Quantize: `optimum-cli onnxruntime quantize --onnx_model <dir> --<profile> [--per_channel] -o <out>`
//!
//! Ambos son llamadas bloqueantes sin timeout. Un código de salida distinto
//! de cero se reporta con la cola de stderr.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use qflow_core::{BackendError, Exporter, ModelArtifact, OptimizationProfile, Quantizer, TaskDescriptor};

/// Líneas de stderr que se conservan en el error.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct OptimumCli {
    program: PathBuf,
}

impl OptimumCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn export_args(source: &Path, task: &TaskDescriptor, output: &Path) -> Vec<OsString> {
        vec!["export".into(),
             "onnx".into(),
             "--model".into(),
             source.as_os_str().to_os_string(),
             "--task".into(),
             task.task.as_str().into(),
             "--opset".into(),
             task.opset.to_string().into(),
             output.as_os_str().to_os_string()]
    }

    pub fn quantize_args(exported: &Path, profile: &OptimizationProfile, save_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["onnxruntime".into(),
                                           "quantize".into(),
                                           "--onnx_model".into(),
                                           exported.as_os_str().to_os_string(),
                                           format!("--{}", profile.name()).into()];
        if profile.per_channel {
            args.push("--per_channel".into());
        }
        args.push("-o".into());
        args.push(save_dir.as_os_str().to_os_string());
        args
    }

    fn run(&self, args: &[OsString]) -> Result<(), BackendError> {
        let program = self.program.display().to_string();
        debug!("running {program} {args:?}");
        let output = Command::new(&self.program).args(args)
                                                .output()
                                                .map_err(|source| BackendError::Launch { program: program.clone(),
                                                                                         source })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(BackendError::Process { program,
                                    status: output.status.to_string(),
                                    stderr: tail(&stderr, STDERR_TAIL_LINES) })
    }
}

impl Default for OptimumCli {
    fn default() -> Self {
        Self::new("optimum-cli")
    }
}

impl Exporter for OptimumCli {
    fn name(&self) -> &str {
        "optimum-cli"
    }

    fn export(&self, source: &ModelArtifact, task: &TaskDescriptor, output: &Path) -> Result<(), BackendError> {
        self.run(&Self::export_args(source.root(), task, output))
    }
}

impl Quantizer for OptimumCli {
    fn name(&self) -> &str {
        "optimum-cli"
    }

    fn quantize(&self, exported: &Path, profile: &OptimizationProfile, save_dir: &Path) -> Result<(), BackendError> {
        self.run(&Self::quantize_args(exported, profile, save_dir))
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use qflow_core::InstructionSet;

    #[test]
    fn export_args_follow_optimum_cli_syntax() {
        let args = OptimumCli::export_args(Path::new("model"),
                                           &TaskDescriptor::default(),
                                           Path::new("model/model.onnx"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args,
                   ["export", "onnx", "--model", "model", "--task", "text-generation", "--opset", "14", "model/model.onnx"]);
    }

    #[test]
    fn quantize_args_carry_profile_flag() {
        let profile = OptimizationProfile::new(InstructionSet::Avx512Vnni).with_per_channel(true);
        let args = OptimumCli::quantize_args(Path::new("model/model.onnx"), &profile, Path::new("out"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args,
                   ["onnxruntime", "quantize", "--onnx_model", "model/model.onnx", "--avx512_vnni", "--per_channel", "-o", "out"]);
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("", 3), "");
    }
}
