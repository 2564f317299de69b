//! Types d'erreurs pour le crate lasmeta

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture d'un en-tête LAS/LAZ
#[derive(Debug, Error)]
pub enum LasMetaError {
    /// Erreur d'I/O lors de l'ouverture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// En-tête refusé par le crate `las` (signature, version, VLR tronquée...)
    #[error("Invalid LAS/LAZ file: {0}")]
    Las(#[from] las::Error),

    /// En-tête lisible mais incohérent
    #[error("Invalid header in {file}: {reason}")]
    InvalidHeader { file: String, reason: String },

    /// Descripteur CRS illisible (non fatal pour la lecture de l'en-tête)
    #[error("Malformed CRS descriptor ({source_kind}): {reason}")]
    MalformedCrs {
        source_kind: &'static str,
        reason: String,
    },
}

impl LasMetaError {
    /// Crée une erreur d'en-tête avec contexte
    pub fn invalid_header(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de descripteur CRS
    pub fn malformed_crs(source_kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedCrs {
            source_kind,
            reason: reason.into(),
        }
    }
}
