//! Descriptor de tarea (export) y perfil de optimización (quantización).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_OPSET, TEXT_GENERATION_TASK};

/// Entrada fija de la etapa de export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub task: String,
    pub opset: u32,
}

impl TaskDescriptor {
    pub fn text_generation(opset: u32) -> Self {
        Self { task: TEXT_GENERATION_TASK.to_string(),
               opset }
    }
}

impl Default for TaskDescriptor {
    fn default() -> Self {
        Self::text_generation(DEFAULT_OPSET)
    }
}

/// Set de instrucciones al que se ajusta la quantización (presets de
/// `optimum`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionSet {
    Arm64,
    Avx2,
    Avx512,
    Avx512Vnni,
    TensorRt,
}

impl InstructionSet {
    pub const ALL: [InstructionSet; 5] = [InstructionSet::Arm64,
                                          InstructionSet::Avx2,
                                          InstructionSet::Avx512,
                                          InstructionSet::Avx512Vnni,
                                          InstructionSet::TensorRt];

    pub fn name(&self) -> &'static str {
        match self {
            InstructionSet::Arm64 => "arm64",
            InstructionSet::Avx2 => "avx2",
            InstructionSet::Avx512 => "avx512",
            InstructionSet::Avx512Vnni => "avx512_vnni",
            InstructionSet::TensorRt => "tensorrt",
        }
    }
}

/// Perfil inmutable elegido una vez al inicio del pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptimizationProfile {
    pub target: InstructionSet,
    pub per_channel: bool,
}

impl OptimizationProfile {
    pub fn new(target: InstructionSet) -> Self {
        Self { target,
               per_channel: false }
    }

    pub fn with_per_channel(mut self, per_channel: bool) -> Self {
        self.per_channel = per_channel;
        self
    }

    pub fn name(&self) -> &'static str {
        self.target.name()
    }
}

impl Default for OptimizationProfile {
    fn default() -> Self {
        Self::new(InstructionSet::Avx512)
    }
}

impl fmt::Display for OptimizationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.per_channel {
            write!(f, "{}+per_channel", self.name())
        } else {
            f.write_str(self.name())
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown optimization profile `{0}` (expected one of: arm64, avx2, avx512, avx512_vnni, tensorrt)")]
pub struct UnknownProfile(pub String);

impl FromStr for OptimizationProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let (base, per_channel) = match normalized.strip_suffix("+per_channel") {
            Some(base) => (base.to_string(), true),
            None => (normalized, false),
        };
        InstructionSet::ALL.iter()
                           .find(|t| t.name() == base)
                           .map(|t| OptimizationProfile::new(*t).with_per_channel(per_channel))
                           .ok_or_else(|| UnknownProfile(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_profiles() {
        assert_eq!("avx512".parse::<OptimizationProfile>(), Ok(OptimizationProfile::default()));
        assert_eq!("AVX512-VNNI".parse::<OptimizationProfile>().map(|p| p.target),
                   Ok(InstructionSet::Avx512Vnni));
        let p: OptimizationProfile = "arm64+per_channel".parse().expect("parse");
        assert!(p.per_channel);
        assert_eq!(p.to_string(), "arm64+per_channel");
        assert!("sse2".parse::<OptimizationProfile>().is_err());
    }

    #[test]
    fn default_task_is_text_generation_opset_14() {
        let t = TaskDescriptor::default();
        assert_eq!(t.task, "text-generation");
        assert_eq!(t.opset, 14);
    }
}
