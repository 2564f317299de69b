//! Run complet: agrégation puis écriture unique

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::aggregate::{AggregateDataset, Aggregator};
use crate::error::{ExportError, QcError};
use crate::export::DatasetWriter;

/// Issue de l'écriture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// Destination verrouillée: rien n'a été écrit
    PermissionDenied(PathBuf),
}

/// Résultat d'un run
#[derive(Debug)]
pub struct QcRun {
    pub dataset: AggregateDataset,
    pub outcome: WriteOutcome,
}

/// Agrège `paths` puis écrit le jeu dans `output`.
///
/// Un refus de permission à l'écriture n'est pas une erreur: il est
/// signalé dans `WriteOutcome`. Toute autre erreur est propagée.
pub fn run(
    paths: &[PathBuf],
    output: &Path,
    aggregator: &Aggregator<'_>,
    writer: &dyn DatasetWriter,
) -> Result<QcRun, QcError> {
    let dataset = aggregator.aggregate(paths)?;

    let outcome = match writer.write(&dataset, output) {
        Ok(()) => {
            info!(
                path = %output.display(),
                features = dataset.len(),
                crs = dataset.crs_identifier().as_deref().unwrap_or("None"),
                "Dataset written"
            );
            WriteOutcome::Written(output.to_path_buf())
        }
        Err(ExportError::PermissionDenied { path }) => {
            warn!(path = %path.display(), "Output is locked, nothing written");
            WriteOutcome::PermissionDenied(path)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(QcRun { dataset, outcome })
}
