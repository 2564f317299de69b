//! Définition et implémentation des commandes CLI
//!
//! - défaut: dossier LAS/LAZ → GeoJSON des emprises
//! - `inspect`: détail de l'en-tête et du CRS d'un fichier

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use las_bbox_qc::{
    discovery, pipeline, Aggregator, Config, CrsPolicy, GeoJsonDatasetWriter, LasHeaderReader,
    QcReport, WriteOutcome,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Print the header fields and CRS decomposition of one LAS/LAZ file
    Inspect {
        /// Path to a .las or .laz file
        file: PathBuf,
    },
}

/// Arguments de la commande par défaut
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Folder containing LAS/LAZ files (prompted for when omitted)
    pub path: Option<PathBuf>,

    /// Output file name, written inside the input folder
    #[arg(short, long)]
    pub output: Option<String>,

    /// How the dataset CRS is chosen among the files' horizontal codes
    #[arg(long, value_enum)]
    pub crs_policy: Option<CrsPolicy>,

    /// Skip unreadable files instead of aborting the whole batch
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Number of files processed concurrently (default: 1, sequential)
    #[arg(long, alias = "threads")]
    pub jobs: Option<usize>,

    /// JSON configuration file (CLI flags take precedence)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Fusionne la configuration fichier et les options CLI
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(ref output) = self.output {
            config.output_name = output.clone();
        }
        if let Some(policy) = self.crs_policy {
            config.crs_policy = policy;
        }
        if self.skip_unreadable {
            config.skip_unreadable = true;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs.max(1);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Exécute la commande par défaut
pub fn cmd_run(args: &RunArgs) -> Result<()> {
    let start = Instant::now();
    let config = args.resolve_config()?;

    let dir = match &args.path {
        Some(path) => path.clone(),
        None => prompt_for_directory()?,
    };

    let files = discovery::discover(&dir, &config.extensions)?;
    let output_path = dir.join(&config.output_name);

    println!("=== LAS BBOX QC ===");
    println!("Path: {}", dir.display());
    println!("Files: {}", files.len());
    println!("CRS policy: {}", config.crs_policy);
    println!("Skip unreadable: {}", config.skip_unreadable);
    println!("Jobs: {}", config.jobs);

    info!(path = %dir.display(), files = files.len(), "Starting QC");

    let reader = LasHeaderReader;
    let aggregator = Aggregator::new(&reader)
        .with_crs_policy(config.crs_policy)
        .with_read_failure_policy(config.read_failure_policy())
        .with_jobs(config.jobs);

    let mut report = QcReport::new(&dir, files.len(), config.crs_policy);

    let result = pipeline::run(&files, &output_path, &aggregator, &GeoJsonDatasetWriter);

    let qc_run = match result {
        Ok(qc_run) => qc_run,
        Err(e) => {
            report.record_failure(e.to_string());
            report.set_duration(start.elapsed());
            report.finalize();
            save_report(&report, args.report.as_deref());
            return Err(e).with_context(|| format!("QC failed for {}", dir.display()));
        }
    };

    report.record_dataset(&qc_run.dataset);
    match qc_run.outcome {
        WriteOutcome::Written(path) => report.record_output(&path),
        WriteOutcome::PermissionDenied(path) => {
            println!(
                "Unable to overwrite {}. Is it open in another application? Close the file in other applications and run again.",
                path.display()
            );
            report.record_failure(format!("Permission denied on {}", path.display()));
        }
    }

    report.set_duration(start.elapsed());
    report.finalize();
    report.display();
    save_report(&report, args.report.as_deref());

    info!("{}", report.summary());
    Ok(())
}

fn save_report(report: &QcReport, path: Option<&Path>) {
    if let Some(path) = path {
        if let Err(e) = report.save_to_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to save report");
        }
    }
}

/// Demande un dossier existant sur stdin
fn prompt_for_directory() -> Result<PathBuf> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Enter path to LAS/LAZ files: ");
        stdout.flush()?;

        let line = lines
            .next()
            .context("No path given on standard input")?
            .context("Failed to read standard input")?;
        let path = PathBuf::from(line.trim());

        if path.is_dir() {
            println!("Path: {}", path.display());
            return Ok(path);
        }
        println!("Invalid folder path.");
    }
}

/// Exécute la commande inspect
pub fn cmd_inspect(file: &Path) -> Result<()> {
    if !lasmeta::has_point_cloud_extension(file) {
        warn!(file = %file.display(), "File does not have a .las/.laz extension");
    }

    let header = lasmeta::open_header(file)
        .with_context(|| format!("Failed to read header of {}", file.display()))?;
    let components = las_bbox_qc::resolve(&header.crs);

    let report = json!({
        "header": header,
        "resolved": {
            "crs": components.horizontal_display(),
            "vdatum": components.vertical_display(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
