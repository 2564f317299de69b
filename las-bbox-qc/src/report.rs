//! Rapport de QC avec graceful degradation
//!
//! Résume un run: fichiers trouvés, traités, ignorés, CRS retenu et
//! fichier produit. Affiché en fin de run, sauvegardable en JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::aggregate::{AggregateDataset, SkippedFile};
use crate::crs::CrsPolicy;

/// Statut global du run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QcStatus {
    /// Tous les fichiers traités, sortie écrite
    Success,
    /// Sortie écrite, certains fichiers ignorés
    PartialSuccess,
    /// Aucune sortie écrite
    Failed,
}

/// Rapport complet d'un run
#[derive(Debug, Clone, Serialize)]
pub struct QcReport {
    /// Dossier analysé
    pub input_dir: PathBuf,
    /// Durée du run
    pub duration_secs: f64,
    /// Statut global
    pub status: QcStatus,

    /// Nombre de fichiers trouvés
    pub files_found: usize,
    /// Nombre de fichiers agrégés
    pub files_processed: usize,
    /// Fichiers ignorés et raison
    pub skipped: Vec<SkippedFile>,

    /// Politique de choix du CRS
    pub crs_policy: CrsPolicy,
    /// CRS du jeu de données (`EPSG:xxxx`)
    pub dataset_crs: Option<String>,
    /// Codes horizontaux distincts rencontrés
    pub horizontal_codes: Vec<u32>,

    /// Fichier écrit (absent si l'écriture a échoué)
    pub output: Option<PathBuf>,
    /// Message d'échec éventuel
    pub failure: Option<String>,
}

impl QcReport {
    /// Crée un rapport vide pour un dossier
    pub fn new(input_dir: &Path, files_found: usize, crs_policy: CrsPolicy) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            duration_secs: 0.0,
            status: QcStatus::Success,
            files_found,
            files_processed: 0,
            skipped: Vec::new(),
            crs_policy,
            dataset_crs: None,
            horizontal_codes: Vec::new(),
            output: None,
            failure: None,
        }
    }

    /// Reprend les compteurs d'un jeu agrégé
    pub fn record_dataset(&mut self, dataset: &AggregateDataset) {
        self.files_processed = dataset.len();
        self.skipped = dataset.skipped.clone();
        self.dataset_crs = dataset.crs_identifier();
        self.horizontal_codes = dataset.distinct_horizontal_codes();
    }

    /// Enregistre le fichier écrit
    pub fn record_output(&mut self, path: &Path) {
        self.output = Some(path.to_path_buf());
    }

    /// Enregistre un échec (pas de sortie)
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    /// Définit la durée du run
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.failure.is_some() || self.output.is_none() {
            QcStatus::Failed
        } else if !self.skipped.is_empty() {
            QcStatus::PartialSuccess
        } else {
            QcStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LAS BBOX QC REPORT - {}", self.input_dir.display());
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Files: {} found, {} processed, {} skipped",
            self.files_found,
            self.files_processed,
            self.skipped.len()
        );
        println!(
            "Dataset CRS: {} (policy: {})",
            self.dataset_crs.as_deref().unwrap_or("None"),
            self.crs_policy
        );
        if self.horizontal_codes.len() > 1 {
            let codes: Vec<String> = self
                .horizontal_codes
                .iter()
                .map(|c| format!("EPSG:{}", c))
                .collect();
            println!("Mixed horizontal CRS: {}", codes.join(", "));
        }
        if let Some(ref output) = self.output {
            println!("Output: {}", output.display());
        }

        if !self.skipped.is_empty() {
            println!("\n--- SKIPPED ({}) ---", self.skipped.len());
            for s in self.skipped.iter().take(20) {
                println!("  {}: {}", s.path.display(), s.reason);
            }
            if self.skipped.len() > 20 {
                println!("  ... and {} more", self.skipped.len() - 20);
            }
        }

        if let Some(ref failure) = self.failure {
            println!("\n--- FAILURE ---");
            println!("  {}", failure);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} processed, {} skipped, CRS {}",
            self.files_processed,
            self.skipped.len(),
            self.dataset_crs.as_deref().unwrap_or("None")
        )
    }
}
