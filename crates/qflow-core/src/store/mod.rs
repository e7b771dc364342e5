//! Convención de slots sobre el filesystem.
//!
//! Tres slots con nombre (`source`, `exported`, `optimized`) más la ruta del
//! reporte del pipeline. Un único escritor, sin concurrencia. Las escrituras
//! de bundles pasan por un directorio de staging hermano (`<slot>.partial`) y
//! sólo un bundle completo se promueve al slot.

mod layout;

pub use layout::{Slot, StoreLayout};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::constants::STAGING_SUFFIX;
use crate::errors::StoreError;
use crate::model::{ArtifactPart, ModelArtifact};

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    layout: StoreLayout,
}

impl ArtifactStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// Store con la distribución por defecto bajo `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self::new(StoreLayout::rooted_at(root))
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn path(&self, slot: Slot) -> &Path {
        match slot {
            Slot::Source => &self.layout.source,
            Slot::Exported => &self.layout.exported,
            Slot::Optimized => &self.layout.optimized,
        }
    }

    pub fn report_path(&self) -> &Path {
        &self.layout.report
    }

    /// Directorio de staging asociado a un slot.
    pub fn staging_path(&self, slot: Slot) -> PathBuf {
        let path = self.path(slot);
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| slot.name().into());
        name.push(".");
        name.push(STAGING_SUFFIX);
        path.with_file_name(name)
    }

    /// `true` si el slot existe: archivo, o directorio no vacío.
    pub fn exists(&self, slot: Slot) -> bool {
        let path = self.path(slot);
        if path.is_file() {
            return true;
        }
        fs::read_dir(path).map(|mut it| it.next().is_some()).unwrap_or(false)
    }

    pub fn open(&self, slot: Slot) -> Result<ModelArtifact, StoreError> {
        ModelArtifact::open(self.path(slot))
    }

    pub fn is_complete(&self, slot: Slot) -> bool {
        self.open(slot).map(|a| a.is_complete()).unwrap_or(false)
    }

    /// Escribe las tres partes de `artifact` en `slot`. Idempotente: el
    /// contenido previo del slot se reemplaza.
    pub fn save(&self, artifact: &ModelArtifact, slot: Slot) -> Result<ModelArtifact, StoreError> {
        artifact.ensure_complete()?;
        let dest = self.path(slot);
        if same_location(artifact.root(), dest) {
            debug!("save: artifact already lives in slot {slot}");
            return ModelArtifact::open(dest);
        }
        let staging = self.staging_path(slot);
        remove_path(&staging).map_err(StoreError::io(&staging))?;
        artifact.copy_into(&staging)?;
        self.promote(&staging, slot)
    }

    /// Promueve un directorio de staging al slot. Falla sin tocar el slot si
    /// el bundle de staging está incompleto.
    pub fn promote(&self, staged: &Path, slot: Slot) -> Result<ModelArtifact, StoreError> {
        ModelArtifact::open(staged)?.ensure_complete()?;
        let dest = self.path(slot);
        remove_path(dest).map_err(StoreError::io(dest))?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
        }
        fs::rename(staged, dest).map_err(StoreError::io(staged))?;
        info!("promoted {} into slot {slot} ({})", staged.display(), dest.display());
        ModelArtifact::open(dest)
    }

    /// Borra el contenido del slot y su staging. Devuelve `true` si había algo.
    pub fn clear(&self, slot: Slot) -> Result<bool, StoreError> {
        let path = self.path(slot);
        let staging = self.staging_path(slot);
        let removed = remove_path(path).map_err(StoreError::io(path))?;
        let removed_staging = remove_path(&staging).map_err(StoreError::io(&staging))?;
        Ok(removed || removed_staging)
    }

    /// Completa un bundle en staging con las partes que le falten, copiadas
    /// desde `donor`. Devuelve los archivos copiados.
    pub fn fill_missing_parts(&self, staged: &Path, donor: &ModelArtifact) -> Result<Vec<PathBuf>, StoreError> {
        let current = ModelArtifact::open(staged)?;
        let mut copied = Vec::new();
        for part in current.missing_parts() {
            if part == ArtifactPart::Weights {
                continue;
            }
            for rel in donor.part_files(part) {
                let target = staged.join(rel);
                if target.exists() {
                    continue;
                }
                let from = donor.root().join(rel);
                fs::copy(&from, &target).map_err(StoreError::io(&from))?;
                copied.push(rel.clone());
            }
        }
        if !copied.is_empty() {
            debug!("filled {} file(s) into {} from {}", copied.len(), staged.display(), donor.root().display());
        }
        Ok(copied)
    }
}

/// Borra un archivo o directorio si existe. Devuelve `true` si borró algo.
pub fn remove_path(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map(|_| true),
        Ok(_) => fs::remove_file(path).map(|_| true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
