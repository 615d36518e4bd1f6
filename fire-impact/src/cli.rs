//! Définition et implémentation des commandes CLI
//!
//! - `impact` : une requête, sortie tableau ou JSON, GeoJSON optionnel
//! - `batch` : CSV de requêtes calculées en parallèle, JSON lines en sortie
//! - `inspect` : chargement du jeu, rapport et empreinte

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rayon::prelude::*;
use serde_json::json;
use tracing::{info, warn};

use fire_impact::export::export_impact_geojson;
use fire_impact::fingerprint::result_digest;
use fire_impact::request::LooseNumber;
use fire_impact::{AreaDataset, Config, ImpactResult, ImpactService, LoadReport, RawImpactRequest};

/// Sources du jeu de données (communes à toutes les commandes)
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Counties CSV (GEOID, STATE, COUNTY, BORDERS) [env: FIRE_IMPACT_COUNTIES]
    #[arg(long, global = true)]
    pub counties: Option<PathBuf>,

    /// Population CSV (GEOID, POP_ESTIMATE_2023) [env: FIRE_IMPACT_POPULATION]
    #[arg(long, global = true)]
    pub population: Option<PathBuf>,

    /// Config preset name (conus/backend) or path to a JSON config
    #[arg(long, default_value = "conus", global = true)]
    pub config: String,

    /// EPSG code of the county geometry column (4326, 4269, 5070, 3857)
    #[arg(long, global = true)]
    pub source_epsg: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the population impact of one fire
    Impact {
        /// Origin latitude (degrees)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Origin longitude (degrees)
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Wind-free spread radius (km)
        #[arg(long, conflicts_with = "acres", required_unless_present = "acres")]
        radius_km: Option<f64>,

        /// Predicted burned area (acres), converted to an equivalent radius
        #[arg(long)]
        acres: Option<f64>,

        /// Wind speed (mph)
        #[arg(long, default_value_t = 0.0)]
        wind_speed: f64,

        /// Direction the wind blows FROM (degrees)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        wind_direction: f64,

        /// Number of counties listed
        #[arg(long, default_value_t = 15)]
        top: usize,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Write the footprint and affected counties to a GeoJSON file
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// Compute a CSV of requests (lat, lon, radius_km or acres, wind_speed, wind_direction)
    Batch {
        /// Input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON lines file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load the dataset and print the load report
    Inspect {
        /// Save the report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Exécute la commande impact
#[allow(clippy::too_many_arguments)]
pub fn cmd_impact(
    data: &DataArgs,
    lat: f64,
    lon: f64,
    radius_km: Option<f64>,
    acres: Option<f64>,
    wind_speed: f64,
    wind_direction: f64,
    top: usize,
    as_json: bool,
    geojson: Option<&Path>,
) -> Result<()> {
    let (service, _) = load_service(data)?;

    let raw = RawImpactRequest {
        origin_latitude: Some(lat.into()),
        origin_longitude: Some(lon.into()),
        base_radius_km: radius_km.map(LooseNumber::from),
        acres: acres.map(LooseNumber::from),
        wind_speed: Some(wind_speed.into()),
        wind_direction: Some(wind_direction.into()),
    };
    let result = service.compute_raw(&raw)?;
    let digest = result_digest(&result);

    if as_json {
        let output = json!({ "result": result, "digest": digest });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_result(&result, top);
        println!("Digest: {}", digest);
    }

    if let Some(path) = geojson {
        export_impact_geojson(&result, service.dataset(), path)?;
        info!(path = %path.display(), counties = result.contributions.len(), "GeoJSON written");
    }

    Ok(())
}

/// Exécute la commande batch
pub fn cmd_batch(data: &DataArgs, input: &Path, output: Option<&Path>) -> Result<()> {
    let (service, _) = load_service(data)?;
    let start = Instant::now();

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(input)
        .context(format!("Failed to open batch input: {}", input.display()))?;

    let rows: Vec<Result<RawImpactRequest, String>> = reader
        .deserialize::<RawImpactRequest>()
        .map(|r| r.map_err(|e| e.to_string()))
        .collect();

    info!(rows = rows.len(), input = %input.display(), "Batch started");

    // ordre d'entrée conservé par collect
    let lines: Vec<serde_json::Value> = rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| batch_line(&service, i + 1, row))
        .collect();

    let failed = lines.iter().filter(|l| l.get("error").is_some()).count();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context(format!("Failed to create file: {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    for line in &lines {
        serde_json::to_writer(&mut writer, line)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    if failed > 0 {
        warn!(failed = failed, "Some batch rows were rejected");
    }
    info!(
        rows = lines.len(),
        failed = failed,
        duration_ms = start.elapsed().as_millis() as u64,
        "Batch complete"
    );

    Ok(())
}

/// Exécute la commande inspect
pub fn cmd_inspect(data: &DataArgs, report_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(data)?;
    let (counties, population) = source_paths(&config)?;

    let report = match AreaDataset::load(&counties, &population, &config.data) {
        Ok((dataset, report)) => {
            println!(
                "{} counties, total population {}",
                dataset.len(),
                dataset.total_population()
            );
            report
        }
        Err(e) => {
            let mut report = LoadReport::new(&counties, &population, config.data.source_epsg);
            report.record_failure(&e);
            report.finalize();
            report.display();
            if let Some(path) = report_path {
                report.save_to_file(path)?;
            }
            return Err(e).context("Failed to load county dataset");
        }
    };

    report.display();
    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .context(format!("Failed to save report: {}", path.display()))?;
        info!(path = %path.display(), "Load report saved");
    }
    println!("{}", report.summary());

    Ok(())
}

/// Une ligne de sortie batch
fn batch_line(service: &ImpactService, row: usize, raw: &Result<RawImpactRequest, String>) -> serde_json::Value {
    let raw = match raw {
        Ok(raw) => raw,
        Err(e) => return json!({ "row": row, "error": { "field": null, "reason": e } }),
    };

    match service.compute_raw(raw) {
        Ok(result) => json!({
            "row": row,
            "total_population": result.total_population,
            "estimated_population": result.estimated_population,
            "counties": result.contributions.len(),
            "top": result.top(5),
            "footprint": result.footprint,
            "digest": result_digest(&result),
        }),
        Err(e) => json!({ "row": row, "error": { "field": e.field, "reason": e.reason } }),
    }
}

/// Config : preset/fichier, puis environnement, puis options CLI
fn resolve_config(data: &DataArgs) -> Result<Config> {
    let mut config = Config::resolve(&data.config)?;
    config.apply_env()?;

    if let Some(path) = &data.counties {
        config.data.counties_path = Some(path.clone());
    }
    if let Some(path) = &data.population {
        config.data.population_path = Some(path.clone());
    }
    if let Some(epsg) = data.source_epsg {
        config.data.source_epsg = epsg;
    }

    config.validate()?;
    Ok(config)
}

fn source_paths(config: &Config) -> Result<(PathBuf, PathBuf)> {
    let counties = config
        .data
        .counties_path
        .clone()
        .context("No counties source: use --counties or FIRE_IMPACT_COUNTIES")?;
    let population = config
        .data
        .population_path
        .clone()
        .context("No population source: use --population or FIRE_IMPACT_POPULATION")?;
    Ok((counties, population))
}

fn load_service(data: &DataArgs) -> Result<(ImpactService, LoadReport)> {
    let config = resolve_config(data)?;
    let (counties, population) = source_paths(&config)?;

    let (dataset, report) = AreaDataset::load(&counties, &population, &config.data)
        .context("Failed to load county dataset")?;
    info!(summary = %report.summary(), "Dataset loaded");

    Ok((ImpactService::new(Arc::new(dataset), config)?, report))
}

fn print_result(result: &ImpactResult, top: usize) {
    let fp = &result.footprint;

    println!("\n{}", "=".repeat(60));
    println!("FIRE IMPACT - ({:.4}, {:.4})", fp.origin_latitude, fp.origin_longitude);
    println!("{}", "=".repeat(60));

    println!(
        "\nWind from {:.0}° -> spreading toward {:.0}° (stretch x{:.2})",
        fp.wind_direction_deg, fp.rotation_bearing_deg, fp.stretch_factor
    );
    println!(
        "Footprint: major {:.0} m, minor {:.0} m, shift {:.0} m, area {:.2} km²",
        fp.major_axis_m,
        fp.minor_axis_m,
        fp.origin_shift_m,
        fp.area_m2 / 1e6
    );
    println!(
        "Affected population: {} (estimate {:.1})",
        result.total_population, result.estimated_population
    );

    if result.is_empty() {
        println!("\nNo county affected");
    } else {
        println!("\n--- COUNTIES ({}) ---", result.contributions.len());
        for (i, c) in result.top(top).iter().enumerate() {
            println!(
                "  {:>2}. {} {}, {}: {} of {} ({:.1}%)",
                i + 1,
                c.county_id,
                c.county_name,
                c.state,
                c.contributing_population,
                c.population,
                c.affected_share_percent()
            );
        }
        if result.contributions.len() > top {
            println!("  ... and {} more", result.contributions.len() - top);
        }
    }

    println!("\n{}", "=".repeat(60));
}
