//! Modelos neutrales del pipeline (artifact de modelo, manifest, tarea y
//! perfil de optimización).

pub mod artifact;
pub mod manifest;
pub mod profile;

pub use artifact::{ArtifactPart, ModelArtifact};
pub use manifest::{ArtifactManifest, ManifestEntry};
pub use profile::{InstructionSet, OptimizationProfile, TaskDescriptor, UnknownProfile};
