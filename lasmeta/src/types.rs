//! Types de données pour le crate lasmeta

use serde::Serialize;

use crate::crs::CrsDescriptor;

/// Triplet (x, y, z) tel que stocké dans l'en-tête
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Triple {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triple {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Métadonnées d'en-tête d'un fichier LAS/LAZ
///
/// Les valeurs sont celles déclarées par l'en-tête, pas recalculées depuis les points.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderRecord {
    /// Nom du fichier (sans le dossier)
    pub filename: String,

    /// Minimum des coordonnées (x, y, z)
    pub mins: Triple,

    /// Maximum des coordonnées (x, y, z)
    pub maxs: Triple,

    /// Nombre de points déclaré
    pub point_count: u64,

    /// Code du format de point (0 à 10)
    pub point_format: u8,

    /// Version majeure LAS
    pub major_version: u8,

    /// Version mineure LAS
    pub minor_version: u8,

    /// Date de création (YYYY-MM-DD), absente si le jour julien vaut 0
    pub creation_date: Option<String>,

    /// File source ID
    pub file_source_id: u16,

    /// Logiciel ayant généré le fichier
    pub generating_software: String,

    /// Descripteur CRS décomposé
    pub crs: CrsDescriptor,
}
