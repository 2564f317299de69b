//! Point d'entrée CLI pour las-bbox-qc

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Commands, RunArgs};

/// Agréger les emprises et métadonnées d'en-tête de fichiers LAS/LAZ
#[derive(Parser)]
#[command(name = "las-bbox-qc")]
#[command(author, version)]
#[command(about = "Aggregate LAS/LAZ header bounding boxes and CRS into a GeoJSON file for QC")]
#[command(long_about = "Reads the header of every LAS/LAZ file in a folder, builds each file's bounding box and resolves its horizontal and vertical EPSG codes, then writes one GeoJSON dataset.\n\nUse 'inspect' to print the details of a single file.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: QC d'un dossier)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments du QC d'un dossier (commande par défaut)
    #[command(flatten)]
    run: RunArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Inspect { file }) => {
            info!(file = %file.display(), "Inspect");
            cli::cmd_inspect(&file)?;
        }
        None => {
            cli::cmd_run(&cli.run)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
