//! Bundle de modelo respaldado por un directorio.
//!
//! Un `ModelArtifact` agrupa pesos, configuración de arquitectura y archivos
//! de tokenizer. Se considera *completo* cuando las tres partes tienen al
//! menos un archivo ancla. La consistencia entre vocabulario y tamaño de
//! embeddings se asume, no se verifica.
//!
//! Sólo se escanean archivos del primer nivel: los subdirectorios (por
//! ejemplo el grafo exportado dentro del slot `source`) no forman parte del
//! bundle.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ArtifactManifest;
use crate::errors::StoreError;

/// Parte lógica de un bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactPart {
    Weights,
    Config,
    Tokenizer,
}

impl ArtifactPart {
    pub const ALL: [ArtifactPart; 3] = [ArtifactPart::Weights, ArtifactPart::Config, ArtifactPart::Tokenizer];

    /// Clasifica un nombre de archivo. Devuelve también si el archivo basta
    /// por sí solo para satisfacer la parte (ancla).
    pub fn classify(file_name: &str) -> Option<(ArtifactPart, bool)> {
        match file_name {
            "config.json" => Some((ArtifactPart::Config, true)),
            "tokenizer.json" | "vocab.json" | "vocab.txt" | "tokenizer.model" | "spiece.model" => {
                Some((ArtifactPart::Tokenizer, true))
            }
            "tokenizer_config.json" | "special_tokens_map.json" | "added_tokens.json" | "merges.txt" => {
                Some((ArtifactPart::Tokenizer, false))
            }
            n if [".safetensors", ".bin", ".onnx", ".msgpack", ".h5"].iter().any(|ext| n.ends_with(ext)) => {
                Some((ArtifactPart::Weights, true))
            }
            n if n.ends_with(".onnx_data") || n.ends_with(".safetensors.index.json") => {
                Some((ArtifactPart::Weights, false))
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactPart::Weights => "weights",
            ArtifactPart::Config => "config",
            ArtifactPart::Tokenizer => "tokenizer",
        }
    }
}

impl fmt::Display for ArtifactPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ModelArtifact {
    root: PathBuf,
    parts: BTreeMap<ArtifactPart, Vec<PathBuf>>,
    anchored: BTreeSet<ArtifactPart>,
    /// Archivos auxiliares (generation_config.json, ort_config.json, ...).
    extras: Vec<PathBuf>,
}

impl ModelArtifact {
    /// Escanea `dir` y clasifica sus archivos. No exige completitud.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::NotFound(dir.to_path_buf()));
        }
        let mut names: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(StoreError::io(dir))? {
            let entry = entry.map_err(StoreError::io(dir))?;
            let file_type = entry.file_type().map_err(StoreError::io(&entry.path()))?;
            if file_type.is_file() {
                names.push(PathBuf::from(entry.file_name()));
            }
        }
        names.sort();

        let mut parts: BTreeMap<ArtifactPart, Vec<PathBuf>> = BTreeMap::new();
        let mut anchored = BTreeSet::new();
        let mut extras = Vec::new();
        for name in names {
            let classified = name.to_str().and_then(ArtifactPart::classify);
            match classified {
                Some((part, anchor)) => {
                    if anchor {
                        anchored.insert(part);
                    }
                    parts.entry(part).or_default().push(name);
                }
                None => extras.push(name),
            }
        }
        Ok(Self { root: dir.to_path_buf(),
                  parts,
                  anchored,
                  extras })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archivos (relativos a `root`) de una parte.
    pub fn part_files(&self, part: ArtifactPart) -> &[PathBuf] {
        self.parts.get(&part).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Todos los archivos del bundle, relativos a `root`, en orden estable.
    pub fn files(&self) -> Vec<&Path> {
        let mut all: Vec<&Path> = self.parts
                                      .values()
                                      .flatten()
                                      .chain(self.extras.iter())
                                      .map(|p| p.as_path())
                                      .collect();
        all.sort();
        all
    }

    pub fn missing_parts(&self) -> Vec<ArtifactPart> {
        ArtifactPart::ALL.iter().copied().filter(|p| !self.anchored.contains(p)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_parts().is_empty()
    }

    pub fn ensure_complete(&self) -> Result<(), StoreError> {
        let missing = self.missing_parts();
        if missing.is_empty() {
            return Ok(());
        }
        let missing = missing.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ");
        Err(StoreError::Incomplete { path: self.root.clone(),
                                     missing })
    }

    /// Copia todos los archivos del bundle a `dest` (creándolo si falta).
    pub fn copy_into(&self, dest: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(dest).map_err(StoreError::io(dest))?;
        for rel in self.files() {
            let from = self.root.join(rel);
            fs::copy(&from, dest.join(rel)).map_err(StoreError::io(&from))?;
        }
        Ok(())
    }

    pub fn manifest(&self) -> Result<ArtifactManifest, StoreError> {
        ArtifactManifest::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_files() {
        assert_eq!(ArtifactPart::classify("config.json"), Some((ArtifactPart::Config, true)));
        assert_eq!(ArtifactPart::classify("model.safetensors"), Some((ArtifactPart::Weights, true)));
        assert_eq!(ArtifactPart::classify("model_quantized.onnx"), Some((ArtifactPart::Weights, true)));
        assert_eq!(ArtifactPart::classify("merges.txt"), Some((ArtifactPart::Tokenizer, false)));
        assert_eq!(ArtifactPart::classify("ort_config.json"), None);
    }

    #[test]
    fn merges_alone_do_not_satisfy_tokenizer() {
        let dir = tempfile::tempdir().expect("tempdir");
        for f in ["config.json", "pytorch_model.bin", "merges.txt", "generation_config.json"] {
            fs::write(dir.path().join(f), f).expect("write");
        }
        let art = ModelArtifact::open(dir.path()).expect("open");
        assert_eq!(art.missing_parts(), vec![ArtifactPart::Tokenizer]);
        assert!(art.files().contains(&Path::new("generation_config.json")));
        let err = art.ensure_complete().unwrap_err();
        assert!(err.to_string().contains("missing: tokenizer"));
    }

    #[test]
    fn subdirectories_are_not_part_of_the_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("model.onnx")).expect("mkdir");
        fs::write(dir.path().join("model.onnx").join("model.onnx"), "graph").expect("write");
        let art = ModelArtifact::open(dir.path()).expect("open");
        assert!(art.files().is_empty());
        assert_eq!(art.missing_parts().len(), 3);
    }

    #[test]
    fn open_missing_dir_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ModelArtifact::open(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
