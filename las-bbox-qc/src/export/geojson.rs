//! Export vers GeoJSON avec geozero (streaming)

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use serde_json::{json, Value};
use tracing::debug;

use super::DatasetWriter;
use crate::aggregate::{AggregateDataset, AggregateRecord};
use crate::error::ExportError;

/// Writer GeoJSON (FeatureCollection + CRS nommé)
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonDatasetWriter;

impl DatasetWriter for GeoJsonDatasetWriter {
    fn write(&self, dataset: &AggregateDataset, destination: &Path) -> Result<(), ExportError> {
        export_to_geojson(dataset, destination)
    }
}

/// Exporte le jeu de données dans `output_path`.
///
/// Le contenu est écrit dans un fichier temporaire voisin puis renommé:
/// en cas d'échec, un fichier de sortie existant reste intact.
pub fn export_to_geojson(dataset: &AggregateDataset, output_path: &Path) -> Result<(), ExportError> {
    // Sonde: un fichier existant verrouillé échoue avant toute écriture
    if output_path.exists() {
        OpenOptions::new()
            .write(true)
            .open(output_path)
            .map_err(|e| ExportError::from_io(output_path, e))?;
    }

    let tmp_path = temp_path(output_path);
    let result = write_file(dataset, &tmp_path)
        .and_then(|_| {
            fs::rename(&tmp_path, output_path).map_err(|e| ExportError::from_io(output_path, e))
        })
        // Un refus sur le fichier temporaire est signalé sur la destination
        .map_err(|e| match e {
            ExportError::PermissionDenied { .. } => ExportError::PermissionDenied {
                path: output_path.to_path_buf(),
            },
            other => other,
        });

    if result.is_err() {
        fs::remove_file(&tmp_path).ok();
    } else {
        debug!(path = %output_path.display(), features = dataset.len(), "GeoJSON written");
    }

    result
}

fn temp_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    output_path.with_file_name(name)
}

fn write_file(dataset: &AggregateDataset, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|e| ExportError::from_io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_collection(&mut writer, dataset).map_err(|e| match e {
        ExportError::Io { source, .. } => ExportError::from_io(path, source),
        other => other,
    })?;
    writer
        .flush()
        .map_err(|e| ExportError::from_io(path, e))
}

fn io_err(e: std::io::Error) -> ExportError {
    ExportError::Io {
        path: PathBuf::new(),
        source: e,
    }
}

/// Écrit la FeatureCollection complète
pub fn write_collection<W: Write>(writer: &mut W, dataset: &AggregateDataset) -> Result<(), ExportError> {
    // Header FeatureCollection avec CRS
    write!(writer, r#"{{"type":"FeatureCollection","#).map_err(io_err)?;
    if let Some(code) = dataset.crs {
        write!(
            writer,
            r#""crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"#,
            code
        )
        .map_err(io_err)?;
    }
    write!(writer, r#""features":["#).map_err(io_err)?;

    for (i, record) in dataset.records.iter().enumerate() {
        if i > 0 {
            write!(writer, ",").map_err(io_err)?;
        }
        write_feature(writer, record)?;
    }

    // Footer
    write!(writer, "]}}").map_err(io_err)?;
    Ok(())
}

/// Attributs d'un enregistrement, dans l'ordre de sortie
fn properties(record: &AggregateRecord) -> [(&'static str, Value); 12] {
    [
        ("filename", json!(record.filename)),
        ("z_max", json!(record.z_max)),
        ("z_min", json!(record.z_min)),
        ("point_count", json!(record.point_count)),
        ("point_format", json!(record.point_format)),
        ("major_version", json!(record.major_version)),
        ("minor_version", json!(record.minor_version)),
        ("creation_date", json!(record.creation_date)),
        ("file_source_id", json!(record.file_source_id)),
        ("generating_software", json!(record.generating_software)),
        ("crs", json!(record.crs.horizontal_display())),
        ("vdatum", json!(record.crs.vertical_display())),
    ]
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, record: &AggregateRecord) -> Result<(), ExportError> {
    write!(writer, r#"{{"type":"Feature","geometry":"#).map_err(io_err)?;

    // Geometry via geozero
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::Polygon(record.geometry()).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf).map_err(io_err)?;

    // Properties
    write!(writer, r#","properties":{{"#).map_err(io_err)?;
    for (i, (key, value)) in properties(record).iter().enumerate() {
        if i > 0 {
            write!(writer, ",").map_err(io_err)?;
        }
        write!(writer, r#""{}":"#, key).map_err(io_err)?;
        serde_json::to_writer(&mut *writer, value)?;
    }
    write!(writer, "}}}}").map_err(io_err)?;

    Ok(())
}
