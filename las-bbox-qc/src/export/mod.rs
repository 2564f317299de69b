//! Modules d'export

pub mod geojson;

use std::path::Path;

use crate::aggregate::AggregateDataset;
use crate::error::ExportError;

pub use geojson::GeoJsonDatasetWriter;

/// Sérialise un jeu de données agrégé vers un fichier
pub trait DatasetWriter {
    fn write(&self, dataset: &AggregateDataset, destination: &Path) -> Result<(), ExportError>;
}
