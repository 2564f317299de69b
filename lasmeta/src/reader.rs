//! Lecture des en-têtes LAS/LAZ via le crate `las`

use std::path::Path;

use tracing::debug;

use crate::crs::{CrsDescriptor, RawVlr};
use crate::types::{HeaderRecord, Triple};
use crate::LasMetaError;

/// Ouvre un fichier LAS/LAZ et extrait son en-tête.
///
/// Seuls l'en-tête et les VLR/EVLR sont lus, les points ne sont pas décodés.
pub fn open_header(path: &Path) -> Result<HeaderRecord, LasMetaError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| LasMetaError::invalid_header(path.display().to_string(), "no file name"))?;

    if !path.is_file() {
        return Err(LasMetaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a file", path.display()),
        )));
    }

    let reader = las::Reader::from_path(path)?;
    let header = reader.header();

    let bounds = header.bounds();
    let version = header.version();
    let point_format = header.point_format().to_u8()?;

    let crs = CrsDescriptor::from_vlrs(header.all_vlrs().map(|vlr| RawVlr {
        user_id: vlr.user_id.as_str(),
        record_id: vlr.record_id,
        data: vlr.data.as_slice(),
    }));

    let record = HeaderRecord {
        filename,
        mins: Triple::new(bounds.min.x, bounds.min.y, bounds.min.z),
        maxs: Triple::new(bounds.max.x, bounds.max.y, bounds.max.z),
        point_count: header.number_of_points(),
        point_format,
        major_version: version.major,
        minor_version: version.minor,
        creation_date: header.date().map(|d| d.to_string()),
        file_source_id: header.file_source_id(),
        generating_software: header.generating_software().trim_end_matches('\0').to_string(),
        crs,
    };

    debug!(
        file = %record.filename,
        points = record.point_count,
        version = %format!("{}.{}", record.major_version, record.minor_version),
        sub_crs = record.crs.sub_crs.len(),
        "Header read"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = open_header(Path::new("nonexistent.laz"));
        assert!(matches!(result, Err(LasMetaError::Io(_))));
    }

    #[test]
    fn test_open_directory_is_rejected() {
        let result = open_header(&std::env::temp_dir());
        assert!(result.is_err());
    }
}
