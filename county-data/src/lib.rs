//! # county-data
//!
//! Chargement des contours de comtés des États-Unis et de leur population.
//!
//! ## Features
//!
//! - Lecture CSV, texte UTF-8 validé en SIMD avec repli Windows-1252
//! - Géométries WKT, WKB hexadécimal ou GeoJSON, reprojection via `ToGeographic`
//! - Validation des anneaux (fermeture, aire, auto-intersections)
//! - Jointure interne comtés/population, territoires exclus filtrés
//! - Géométries typées par CRS (`Shape<Wgs84>`, `Shape<ConusAlbers>`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use county_data::{load, LoadOptions};
//! use std::path::Path;
//!
//! let result = load(Path::new("counties.csv"), Path::new("population.csv"), &LoadOptions::default())?;
//! println!("{} comtés", result.counties.len());
//!
//! for warning in &result.warnings {
//!     println!("{}", warning);
//! }
//! ```

pub mod crs;
pub mod error;
pub mod filter;
pub mod parser;
pub mod repair;
pub mod types;

pub use crs::{AlreadyGeographic, ConusAlbers, Crs, Projection, Shape, ToGeographic, Wgs84};
pub use error::{DataLoadError, GeometryError, LoadWarning};
pub use types::{ColumnNames, County, LoadOptions, LoadResult, LoadStats, DEFAULT_EXCLUDED_STATES};

use std::path::Path;

use tracing::{info, warn};

use filter::ExclusionSet;

/// Charge les deux sources, géométries déjà en EPSG:4326
pub fn load(
    counties_path: &Path,
    population_path: &Path,
    options: &LoadOptions,
) -> Result<LoadResult, DataLoadError> {
    load_with(counties_path, population_path, options, &AlreadyGeographic)
}

/// Charge les deux sources, géométries converties par `reprojector`
///
/// # Errors
///
/// Retourne `DataLoadError` si une source est illisible, si une population est
/// négative ou si la jointure ne produit aucun comté. Les lignes invalides
/// sont seulement écartées (voir `LoadResult::warnings`).
pub fn load_with<R>(
    counties_path: &Path,
    population_path: &Path,
    options: &LoadOptions,
    reprojector: &R,
) -> Result<LoadResult, DataLoadError>
where
    R: ToGeographic + ?Sized,
{
    let counties = std::fs::read(counties_path).map_err(|e| DataLoadError::io(counties_path, e))?;
    let population =
        std::fs::read(population_path).map_err(|e| DataLoadError::io(population_path, e))?;

    parse_sources(&counties, &population, options, reprojector)
}

/// Parse et joint deux sources déjà en mémoire
pub fn parse_sources<R>(
    counties: &[u8],
    population: &[u8],
    options: &LoadOptions,
    reprojector: &R,
) -> Result<LoadResult, DataLoadError>
where
    R: ToGeographic + ?Sized,
{
    let mut warnings = Vec::new();
    let mut stats = LoadStats::default();
    let exclusions = ExclusionSet::new(&options.excluded_states);

    let counties_text = parser::text::decode(counties);
    let rows = parser::counties::parse(
        &counties_text,
        &options.columns,
        &exclusions,
        reprojector,
        &mut warnings,
        &mut stats,
    )?;

    let population_text = parser::text::decode(population);
    let table = parser::population::parse(&population_text, &options.columns, &mut warnings, &mut stats)?;

    // Jointure interne sur l'identifiant
    let mut joined = Vec::with_capacity(rows.len());
    for row in rows {
        match table.get(&row.id) {
            Some(&population) => joined.push(County {
                id: row.id,
                state: row.state,
                name: row.name,
                boundary: row.boundary,
                population,
            }),
            None => {
                stats.missing_population += 1;
                warnings.push(LoadWarning::MissingPopulation { county_id: row.id });
            }
        }
    }

    if joined.is_empty() {
        return Err(DataLoadError::EmptyJoin {
            county_rows: stats.county_rows,
            population_rows: stats.population_rows,
        });
    }

    joined.sort_by(|a, b| a.id.cmp(&b.id));
    stats.joined = joined.len();

    if stats.missing_population > 0 {
        warn!(
            counties = stats.missing_population,
            "Counties without a usable population row were dropped"
        );
    }
    info!(
        counties = stats.joined,
        county_rows = stats.county_rows,
        population_rows = stats.population_rows,
        malformed = stats.malformed_geometries,
        excluded = stats.excluded,
        "County dataset loaded"
    );

    Ok(LoadResult {
        counties: joined,
        stats,
        warnings,
    })
}
