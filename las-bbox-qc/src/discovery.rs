//! Recherche des fichiers LAS/LAZ d'un dossier (non récursif)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::MatchOptions;

/// Liste les fichiers du dossier dont l'extension correspond, triés par chemin
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());

    let mut files = Vec::new();
    for ext in extensions {
        let pattern = format!("{}/*.{}", escaped_dir, glob::Pattern::escape(ext));
        let entries = glob::glob_with(&pattern, options)
            .with_context(|| format!("Invalid search pattern: {}", pattern))?;

        for entry in entries {
            let path = entry.context("Failed to list directory entry")?;
            if path.is_file() && !files.contains(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
