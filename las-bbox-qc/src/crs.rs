//! Résolution des codes EPSG horizontal et vertical d'un fichier

use std::collections::HashMap;
use std::fmt;

use lasmeta::CrsDescriptor;
use serde::{Deserialize, Serialize};

/// Codes retenus pour un fichier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CrsComponents {
    pub horizontal: Option<u32>,
    pub vertical: Option<u32>,
}

impl CrsComponents {
    /// Code horizontal affiché (`"None"` si absent)
    pub fn horizontal_display(&self) -> String {
        display_code(self.horizontal)
    }

    /// Code vertical affiché (`"None"` si absent)
    pub fn vertical_display(&self) -> String {
        display_code(self.vertical)
    }
}

fn display_code(code: Option<u32>) -> String {
    code.map_or_else(|| "None".to_string(), |c| c.to_string())
}

/// Classe chaque sous-système par sa propre nature, jamais par sa position.
///
/// Horizontal: le premier sous-système projeté s'il en existe un, sinon le
/// premier géographique. Vertical: le premier sous-système vertical.
pub fn resolve(descriptor: &CrsDescriptor) -> CrsComponents {
    let mut projected = None;
    let mut geographic = None;
    let mut vertical = None;

    for sub in descriptor.sub_crs_list() {
        if sub.is_projected() {
            projected.get_or_insert(sub.to_epsg());
        } else if sub.is_geographic() {
            geographic.get_or_insert(sub.to_epsg());
        } else if sub.is_vertical() {
            vertical.get_or_insert(sub.to_epsg());
        }
    }

    CrsComponents {
        horizontal: projected.or(geographic).flatten(),
        vertical: vertical.flatten(),
    }
}

/// Choix du CRS unique du jeu de données
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CrsPolicy {
    /// Code horizontal du dernier fichier traité
    #[default]
    LastSeen,
    /// Code horizontal du premier fichier traité
    FirstSeen,
    /// Code le plus fréquent (égalité: premier rencontré)
    MostCommon,
    /// Tous les codes présents doivent être identiques
    Uniform,
}

impl fmt::Display for CrsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LastSeen => "last-seen",
            Self::FirstSeen => "first-seen",
            Self::MostCommon => "most-common",
            Self::Uniform => "uniform",
        };
        f.write_str(name)
    }
}

/// Codes horizontaux distincts, dans l'ordre d'apparition
pub fn distinct_codes(codes: &[Option<u32>]) -> Vec<u32> {
    let mut seen = Vec::new();
    for code in codes.iter().flatten() {
        if !seen.contains(code) {
            seen.push(*code);
        }
    }
    seen
}

/// Applique la politique aux codes horizontaux des fichiers traités (dans l'ordre).
///
/// `Err` contient les codes divergents quand la politique `Uniform` échoue.
pub fn select_dataset_crs(policy: CrsPolicy, codes: &[Option<u32>]) -> Result<Option<u32>, Vec<u32>> {
    match policy {
        CrsPolicy::LastSeen => Ok(codes.last().copied().flatten()),
        CrsPolicy::FirstSeen => Ok(codes.first().copied().flatten()),
        CrsPolicy::MostCommon => {
            let mut counts: HashMap<u32, usize> = HashMap::new();
            for code in codes.iter().flatten() {
                *counts.entry(*code).or_default() += 1;
            }
            // max_by_key garde le dernier en cas d'égalité: on parcourt à l'envers
            Ok(distinct_codes(codes)
                .into_iter()
                .rev()
                .max_by_key(|code| counts[code]))
        }
        CrsPolicy::Uniform => {
            let distinct = distinct_codes(codes);
            if distinct.len() > 1 {
                Err(distinct)
            } else {
                Ok(distinct.first().copied())
            }
        }
    }
}
