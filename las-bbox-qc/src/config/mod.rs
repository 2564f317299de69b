//! Configuration d'un run de QC

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};

use crate::aggregate::ReadFailurePolicy;
use crate::crs::CrsPolicy;

/// Nom du fichier de sortie par défaut
pub const DEFAULT_OUTPUT_NAME: &str = "las_bbox_qc.geojson";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Nom du fichier écrit dans le dossier d'entrée
    pub output_name: String,

    /// Extensions recherchées (insensible à la casse)
    pub extensions: Vec<String>,

    /// Choix du CRS du jeu de données
    pub crs_policy: CrsPolicy,

    /// Ignorer les fichiers illisibles au lieu d'abandonner
    pub skip_unreadable: bool,

    /// Nombre de fichiers traités en parallèle (1 = séquentiel)
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            extensions: lasmeta::POINT_CLOUD_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            crs_policy: CrsPolicy::default(),
            skip_unreadable: false,
            jobs: 1,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Vérifie la cohérence des valeurs (le fichier de sortie reste dans le dossier d'entrée)
    pub fn validate(&self) -> Result<()> {
        if matches!(self.output_name.as_str(), "" | "." | "..")
            || self.output_name.contains(['/', '\\'])
        {
            anyhow::bail!("Invalid output_name: '{}'", self.output_name);
        }
        if self.extensions.is_empty() {
            anyhow::bail!("At least one extension is required");
        }
        if self.jobs == 0 {
            anyhow::bail!("jobs must be at least 1");
        }
        Ok(())
    }

    pub fn read_failure_policy(&self) -> ReadFailurePolicy {
        if self.skip_unreadable {
            ReadFailurePolicy::Skip
        } else {
            ReadFailurePolicy::Abort
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("las-bbox-qc-{}-{}", std::process::id(), name));
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_name, "las_bbox_qc.geojson");
        assert_eq!(config.extensions, vec!["las", "laz"]);
        assert_eq!(config.crs_policy, CrsPolicy::LastSeen);
        assert_eq!(config.read_failure_policy(), ReadFailurePolicy::Abort);
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_load_partial_config() {
        let path = write_config(
            "partial.json",
            r#"{"crs_policy": "most-common", "skip_unreadable": true}"#,
        );
        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.crs_policy, CrsPolicy::MostCommon);
        assert_eq!(config.read_failure_policy(), ReadFailurePolicy::Skip);
        assert_eq!(config.output_name, DEFAULT_OUTPUT_NAME);
    }

    #[test]
    fn test_load_invalid_config() {
        let path = write_config("invalid.json", r#"{"jobs": 0}"#);
        assert!(Config::load(&path).is_err());
        std::fs::remove_file(&path).ok();

        let path = write_config("badname.json", r#"{"output_name": "../out.geojson"}"#);
        assert!(Config::load(&path).is_err());
        std::fs::remove_file(&path).ok();

        let path = write_config("badpolicy.json", r#"{"crs_policy": "random"}"#);
        assert!(Config::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/config.json")).is_err());
    }
}
