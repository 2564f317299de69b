//! Types d'erreurs du pipeline de QC

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs d'agrégation d'un lot de fichiers
#[derive(Debug, Error)]
pub enum QcError {
    /// Aucun fichier LAS/LAZ à traiter
    #[error("No LAS/LAZ files to process")]
    EmptyInput,

    /// En-tête illisible (fatal sauf en mode skip)
    #[error("Failed to read header of {}: {source}", path.display())]
    HeaderRead {
        path: PathBuf,
        #[source]
        source: lasmeta::LasMetaError,
    },

    /// Tous les fichiers ont été ignorés
    #[error("No file could be processed ({skipped} skipped)")]
    NothingProcessed { skipped: usize },

    /// Politique `uniform` et codes horizontaux divergents
    #[error("Input files do not share one horizontal CRS: {}", format_codes(codes))]
    MixedCrs { codes: Vec<u32> },

    /// Erreur d'écriture du jeu de données
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Erreurs de l'écriture du fichier de sortie
#[derive(Debug, Error)]
pub enum ExportError {
    /// Fichier de destination verrouillé ou non inscriptible
    #[error("Permission denied on {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Geometry encoding failed: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    /// Classe une erreur d'I/O: `PermissionDenied` devient une variante dédiée
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

impl QcError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Export(e) if e.is_permission_denied())
    }
}

fn format_codes(codes: &[u32]) -> String {
    codes
        .iter()
        .map(|c| format!("EPSG:{}", c))
        .collect::<Vec<_>>()
        .join(", ")
}
