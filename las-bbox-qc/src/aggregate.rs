//! Agrégation d'un lot de fichiers en un jeu de données unique
//!
//! Pour chaque fichier, dans l'ordre: lecture de l'en-tête, emprise,
//! résolution du CRS, puis ajout d'un enregistrement. Le CRS du jeu de
//! données n'est choisi qu'une fois tous les fichiers traités.

use std::path::{Path, PathBuf};

use geo::Polygon;
use lasmeta::{HeaderRecord, LasMetaError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bbox::BoundingBox;
use crate::crs::{self, CrsComponents, CrsPolicy};
use crate::error::QcError;

/// Source des en-têtes
pub trait HeaderReader: Sync {
    fn open_header(&self, path: &Path) -> Result<HeaderRecord, LasMetaError>;
}

/// Lecteur réel, basé sur le crate `las`
#[derive(Debug, Default, Clone, Copy)]
pub struct LasHeaderReader;

impl HeaderReader for LasHeaderReader {
    fn open_header(&self, path: &Path) -> Result<HeaderRecord, LasMetaError> {
        lasmeta::open_header(path)
    }
}

/// Comportement face à un en-tête illisible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadFailurePolicy {
    /// Le lot entier échoue
    #[default]
    Abort,
    /// Le fichier est ignoré et consigné
    Skip,
}

/// Une ligne du jeu de données (un fichier)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub filename: String,
    pub bbox: BoundingBox,
    pub crs: CrsComponents,
    pub z_max: f64,
    pub z_min: f64,
    pub point_count: u64,
    pub point_format: u8,
    pub major_version: u8,
    pub minor_version: u8,
    pub creation_date: Option<String>,
    pub file_source_id: u16,
    pub generating_software: String,
}

impl AggregateRecord {
    pub fn from_header(header: &HeaderRecord) -> Self {
        Self {
            filename: header.filename.clone(),
            bbox: BoundingBox::build(header.mins.x, header.mins.y, header.maxs.x, header.maxs.y),
            crs: crs::resolve(&header.crs),
            z_max: header.maxs.z,
            z_min: header.mins.z,
            point_count: header.point_count,
            point_format: header.point_format,
            major_version: header.major_version,
            minor_version: header.minor_version,
            creation_date: header.creation_date.clone(),
            file_source_id: header.file_source_id,
            generating_software: header.generating_software.clone(),
        }
    }

    pub fn geometry(&self) -> Polygon<f64> {
        self.bbox.to_polygon()
    }
}

/// Fichier écarté en mode skip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Résultat d'une passe d'agrégation
#[derive(Debug, Clone, Serialize)]
pub struct AggregateDataset {
    /// Enregistrements dans l'ordre de traitement
    pub records: Vec<AggregateRecord>,

    /// Code EPSG horizontal retenu pour tout le jeu
    pub crs: Option<u32>,

    /// Politique ayant produit `crs`
    pub crs_policy: CrsPolicy,

    pub skipped: Vec<SkippedFile>,
}

impl AggregateDataset {
    /// `EPSG:<code>` si un code a été retenu
    pub fn crs_identifier(&self) -> Option<String> {
        self.crs.map(|code| format!("EPSG:{}", code))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn horizontal_codes(&self) -> Vec<Option<u32>> {
        self.records.iter().map(|r| r.crs.horizontal).collect()
    }

    /// Codes horizontaux distincts, dans l'ordre d'apparition
    pub fn distinct_horizontal_codes(&self) -> Vec<u32> {
        crs::distinct_codes(&self.horizontal_codes())
    }
}

/// Orchestrateur du lot
pub struct Aggregator<'r> {
    reader: &'r dyn HeaderReader,
    crs_policy: CrsPolicy,
    on_read_failure: ReadFailurePolicy,
    jobs: usize,
}

impl<'r> Aggregator<'r> {
    pub fn new(reader: &'r dyn HeaderReader) -> Self {
        Self {
            reader,
            crs_policy: CrsPolicy::default(),
            on_read_failure: ReadFailurePolicy::default(),
            jobs: 1,
        }
    }

    pub fn with_crs_policy(mut self, policy: CrsPolicy) -> Self {
        self.crs_policy = policy;
        self
    }

    pub fn with_read_failure_policy(mut self, policy: ReadFailurePolicy) -> Self {
        self.on_read_failure = policy;
        self
    }

    /// `jobs > 1` active le traitement parallèle (résultat identique)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Agrège les fichiers dans l'ordre donné
    pub fn aggregate(&self, paths: &[PathBuf]) -> Result<AggregateDataset, QcError> {
        if paths.is_empty() {
            return Err(QcError::EmptyInput);
        }

        info!(
            files = paths.len(),
            jobs = self.jobs,
            crs_policy = %self.crs_policy,
            "Aggregating headers"
        );

        let mut records = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();

        if self.jobs > 1 {
            // Tous les fichiers sont lus, puis les résultats sont repris dans l'ordre
            for (path, result) in paths.iter().zip(self.process_parallel(paths)) {
                self.fold(path, result, &mut records, &mut skipped)?;
            }
        } else {
            for path in paths {
                let result = self.process(path);
                self.fold(path, result, &mut records, &mut skipped)?;
            }
        }

        if records.is_empty() {
            return Err(QcError::NothingProcessed {
                skipped: skipped.len(),
            });
        }

        let codes: Vec<Option<u32>> = records.iter().map(|r| r.crs.horizontal).collect();
        let distinct = crs::distinct_codes(&codes);
        let dataset_crs = crs::select_dataset_crs(self.crs_policy, &codes)
            .map_err(|codes| QcError::MixedCrs { codes })?;

        if distinct.len() > 1 {
            warn!(
                codes = ?distinct,
                selected = ?dataset_crs,
                policy = %self.crs_policy,
                "Input files use different horizontal CRS"
            );
        }
        if dataset_crs.is_none() {
            warn!(policy = %self.crs_policy, "No horizontal CRS selected for the dataset");
        }

        info!(
            processed = records.len(),
            skipped = skipped.len(),
            crs = ?dataset_crs,
            "Aggregation complete"
        );

        Ok(AggregateDataset {
            records,
            crs: dataset_crs,
            crs_policy: self.crs_policy,
            skipped,
        })
    }

    /// Pipeline d'un fichier: en-tête → emprise → CRS
    fn process(&self, path: &Path) -> Result<AggregateRecord, QcError> {
        let header = self
            .reader
            .open_header(path)
            .map_err(|source| QcError::HeaderRead {
                path: path.to_path_buf(),
                source,
            })?;
        let record = AggregateRecord::from_header(&header);

        debug!(
            file = %record.filename,
            horizontal = %record.crs.horizontal_display(),
            vertical = %record.crs.vertical_display(),
            "Processed"
        );

        Ok(record)
    }

    fn process_parallel(&self, paths: &[PathBuf]) -> Vec<Result<AggregateRecord, QcError>> {
        let run = || -> Vec<Result<AggregateRecord, QcError>> {
            paths.par_iter().map(|p| self.process(p)).collect()
        };

        match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "Cannot build thread pool, using the global one");
                run()
            }
        }
    }

    fn fold(
        &self,
        path: &Path,
        result: Result<AggregateRecord, QcError>,
        records: &mut Vec<AggregateRecord>,
        skipped: &mut Vec<SkippedFile>,
    ) -> Result<(), QcError> {
        match result {
            Ok(record) => records.push(record),
            Err(e @ QcError::HeaderRead { .. }) if self.on_read_failure == ReadFailurePolicy::Skip => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
