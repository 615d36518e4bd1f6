//! Point d'entrée CLI pour fire-impact

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, DataArgs};

/// Estimer la population exposée à un feu de forêt poussé par le vent
#[derive(Parser)]
#[command(name = "fire-impact")]
#[command(author, version)]
#[command(about = "Wind-adjusted wildfire footprint and county population impact")]
#[command(long_about = "Builds a wind-stretched spread ellipse in an equal-area projection and intersects it with US county boundaries to estimate the affected population.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Impact {
            lat,
            lon,
            radius_km,
            acres,
            wind_speed,
            wind_direction,
            top,
            json,
            geojson,
        } => {
            info!(lat = lat, lon = lon, "Impact");
            cli::cmd_impact(
                &cli.data,
                lat,
                lon,
                radius_km,
                acres,
                wind_speed,
                wind_direction,
                top,
                json,
                geojson.as_deref(),
            )?;
        }
        Commands::Batch { input, output } => {
            info!(input = %input.display(), "Batch");
            cli::cmd_batch(&cli.data, &input, output.as_deref())?;
        }
        Commands::Inspect { report } => {
            cli::cmd_inspect(&cli.data, report.as_deref())?;
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
        .with_writer(std::io::stderr)
        .init();
}
