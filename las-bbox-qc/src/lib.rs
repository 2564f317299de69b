//! # las-bbox-qc
//!
//! Contrôle qualité d'un lot de nuages de points LAS/LAZ: l'emprise et les
//! métadonnées d'en-tête de chaque fichier sont agrégées dans un GeoJSON.
//!
//! ## Features
//!
//! - Lecture des en-têtes seulement (crate `lasmeta`)
//! - Résolution des codes EPSG horizontal/vertical par sous-système
//! - Politique explicite pour le CRS du jeu de données
//! - Mode tolérant: fichiers illisibles ignorés et consignés
//! - Export GeoJSON streaming (geozero), écriture atomique
//!
//! ## Usage CLI
//!
//! ```bash
//! # Dossier de dalles, sortie dans <dossier>/las_bbox_qc.geojson
//! las-bbox-qc ./lidar/
//!
//! # Ignorer les fichiers corrompus, exiger un CRS unique
//! las-bbox-qc ./lidar/ --skip-unreadable --crs-policy uniform
//!
//! # Détail d'un fichier
//! las-bbox-qc inspect ./lidar/tile_001.laz
//! ```

pub mod aggregate;
pub mod bbox;
pub mod config;
pub mod crs;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;

pub use aggregate::{
    AggregateDataset, AggregateRecord, Aggregator, HeaderReader, LasHeaderReader,
    ReadFailurePolicy,
};
pub use bbox::BoundingBox;
pub use config::Config;
pub use crs::{resolve, CrsComponents, CrsPolicy};
pub use error::{ExportError, QcError};
pub use export::{DatasetWriter, GeoJsonDatasetWriter};
pub use pipeline::{run, QcRun, WriteOutcome};
pub use report::{QcReport, QcStatus};
