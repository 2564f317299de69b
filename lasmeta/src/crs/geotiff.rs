//! Parser pour le GeoKeyDirectoryTag GeoTIFF (VLR 34735)
//!
//! Le contenu est un tableau de `u16` little-endian: un en-tête de 4 mots
//! (version, révision, révision mineure, nombre de clés) suivi d'une entrée
//! de 4 mots par clé (id, emplacement, nombre, valeur).

use super::{CrsKind, SubCrs};
use crate::LasMetaError;

/// GTModelTypeGeoKey
pub const MODEL_TYPE_KEY: u16 = 1024;
/// GeographicTypeGeoKey
pub const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
/// ProjectedCSTypeGeoKey
pub const PROJECTED_CS_TYPE_KEY: u16 = 3072;
/// VerticalCSTypeGeoKey
pub const VERTICAL_CS_TYPE_KEY: u16 = 4096;

/// Valeur GeoTIFF "défini par l'utilisateur"
const USER_DEFINED: u16 = 32767;

/// Une entrée du répertoire de clés
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    /// 0 = valeur directement dans `value_offset`
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

impl GeoKeyEntry {
    /// Valeur courte stockée dans l'entrée elle-même
    fn inline_value(&self) -> Option<u16> {
        (self.tiff_tag_location == 0).then_some(self.value_offset)
    }
}

/// Parse le répertoire de clés
pub fn parse_directory(data: &[u8]) -> Result<Vec<GeoKeyEntry>, LasMetaError> {
    if data.len() < 8 {
        return Err(LasMetaError::malformed_crs(
            "geotiff",
            format!("directory too short: {} bytes", data.len()),
        ));
    }

    let words: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    let version = words[0];
    if version != 1 {
        return Err(LasMetaError::malformed_crs(
            "geotiff",
            format!("unsupported key directory version {}", version),
        ));
    }

    let number_of_keys = words[3] as usize;
    let needed = 4 + number_of_keys * 4;
    if words.len() < needed {
        return Err(LasMetaError::malformed_crs(
            "geotiff",
            format!(
                "{} keys declared but only {} words present",
                number_of_keys,
                words.len()
            ),
        ));
    }

    Ok(words[4..needed]
        .chunks_exact(4)
        .map(|e| GeoKeyEntry {
            key_id: e[0],
            tiff_tag_location: e[1],
            count: e[2],
            value_offset: e[3],
        })
        .collect())
}

/// Transforme les clés CRS en sous-systèmes, dans l'ordre du répertoire
pub fn decompose(keys: &[GeoKeyEntry]) -> Vec<SubCrs> {
    keys.iter()
        .filter_map(|entry| {
            let kind = match entry.key_id {
                PROJECTED_CS_TYPE_KEY => CrsKind::Projected,
                GEOGRAPHIC_TYPE_KEY => CrsKind::Geographic,
                VERTICAL_CS_TYPE_KEY => CrsKind::Vertical,
                _ => return None,
            };
            let epsg = entry
                .inline_value()
                .filter(|&code| code != 0 && code != USER_DEFINED)
                .map(u32::from);
            Some(SubCrs::new(kind, epsg))
        })
        .collect()
}
