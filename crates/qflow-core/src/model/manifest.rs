//! Manifest de un bundle: tamaño y hash por archivo más un fingerprint
//! agregado. Dos bundles con el mismo fingerprint tienen contenido
//! equivalente.

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ArtifactPart, ModelArtifact};
use crate::constants::PIPELINE_VERSION;
use crate::errors::StoreError;
use crate::hashing::{hash_file, hash_value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub part: Option<ArtifactPart>,
    pub bytes: u64,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub entries: Vec<ManifestEntry>,
    pub fingerprint: String,
}

impl ArtifactManifest {
    pub(crate) fn build(artifact: &ModelArtifact) -> Result<Self, StoreError> {
        let mut entries = Vec::new();
        for rel in artifact.files() {
            let full = artifact.root().join(rel);
            let bytes = fs::metadata(&full).map_err(StoreError::io(&full))?.len();
            let hash = hash_file(&full).map_err(StoreError::io(&full))?;
            let name = rel.to_string_lossy().into_owned();
            let part = ArtifactPart::classify(&name).map(|(p, _)| p);
            entries.push(ManifestEntry { path: name,
                                         part,
                                         bytes,
                                         hash });
        }
        let fingerprint = hash_value(&json!({
                                         "pipeline_version": PIPELINE_VERSION,
                                         "entries": entries,
                                     }));
        Ok(Self { entries, fingerprint })
    }
}
