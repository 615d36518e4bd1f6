//! Configuration du moteur
//!
//! Fichier JSON, chaque section a ses valeurs par défaut. Ordre de priorité :
//! options CLI > variables d'environnement (`FIRE_IMPACT_*`) > fichier/preset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use county_data::{ColumnNames, LoadOptions, DEFAULT_EXCLUDED_STATES};

/// Nombre minimal de sommets de l'ellipse
pub const MIN_ELLIPSE_POINTS: usize = 16;

/// Configuration principale
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub ellipse: EllipseConfig,
    pub impact: ImpactConfig,
    pub limits: LimitsConfig,
}

/// Sources du jeu de données
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV des contours de comtés
    pub counties_path: Option<PathBuf>,

    /// CSV des populations
    pub population_path: Option<PathBuf>,

    /// EPSG de la colonne géométrie
    pub source_epsg: u32,

    pub columns: ColumnsConfig,

    /// États/territoires écartés au chargement
    pub excluded_states: Vec<String>,
}

impl DataConfig {
    /// Options du chargeur de comtés
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            columns: ColumnNames::from(&self.columns),
            excluded_states: self.excluded_states.clone(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            counties_path: None,
            population_path: None,
            source_epsg: 4326,
            columns: ColumnsConfig::default(),
            excluded_states: DEFAULT_EXCLUDED_STATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Noms de colonnes des deux sources
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub county_id: String,
    pub state: String,
    pub county_name: String,
    pub geometry: String,
    pub population_id: String,
    pub population: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        let c = ColumnNames::default();
        Self {
            county_id: c.county_id,
            state: c.state,
            county_name: c.county_name,
            geometry: c.geometry,
            population_id: c.population_id,
            population: c.population,
        }
    }
}

impl From<&ColumnsConfig> for ColumnNames {
    fn from(c: &ColumnsConfig) -> Self {
        Self {
            county_id: c.county_id.clone(),
            state: c.state.clone(),
            county_name: c.county_name.clone(),
            geometry: c.geometry.clone(),
            population_id: c.population_id.clone(),
            population: c.population.clone(),
        }
    }
}

/// Construction de l'ellipse
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EllipseConfig {
    /// Sommets échantillonnés sur le contour
    pub num_points: usize,

    /// Vent au-delà duquel l'étirement sature (W_max)
    pub max_wind_speed: f64,
}

impl Default for EllipseConfig {
    fn default() -> Self {
        Self {
            num_points: 64,
            max_wind_speed: 100.0,
        }
    }
}

/// Agrégation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Fraction en dessous de laquelle un comté est ignoré
    pub min_fraction: f64,

    /// Marge ajoutée à l'emprise de l'empreinte avant la requête d'index (degrés)
    pub candidate_padding_deg: f64,

    /// Intersections des candidats en parallèle (rayon)
    pub parallel: bool,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            min_fraction: 1e-9,
            candidate_padding_deg: 0.01,
            parallel: true,
        }
    }
}

/// Bornes imposées aux requêtes
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Emprise géographique acceptée pour l'origine (toute la Terre si absent)
    pub envelope: Option<Envelope>,
    pub min_radius_km: Option<f64>,
    pub max_radius_km: Option<f64>,
    /// Vent maximal accepté (au-delà : requête refusée, pas saturée)
    pub max_wind_speed: Option<f64>,
}

/// Emprise en degrés
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Envelope {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Envelope {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "conus" => Self::load_embedded(include_str!("presets/conus.json")),
            "backend" => Self::load_embedded(include_str!("presets/backend.json")),
            _ => bail!("Unknown preset: {}. Use: conus, backend", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(name: &str) -> Result<Self> {
        match name {
            "conus" | "backend" => Self::from_preset(name),
            _ => Self::load(Path::new(name)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les surcharges `FIRE_IMPACT_COUNTIES`, `FIRE_IMPACT_POPULATION`
    /// et `FIRE_IMPACT_SOURCE_EPSG`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("FIRE_IMPACT_COUNTIES") {
            self.data.counties_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("FIRE_IMPACT_POPULATION") {
            self.data.population_path = Some(PathBuf::from(path));
        }
        if let Some(epsg) = lookup("FIRE_IMPACT_SOURCE_EPSG") {
            self.data.source_epsg = epsg
                .trim()
                .parse()
                .context(format!("Invalid FIRE_IMPACT_SOURCE_EPSG: {}", epsg))?;
        }
        Ok(())
    }

    /// Refuse les réglages absurdes
    pub fn validate(&self) -> Result<()> {
        if self.ellipse.num_points < MIN_ELLIPSE_POINTS {
            bail!(
                "ellipse.num_points must be >= {}, got {}",
                MIN_ELLIPSE_POINTS,
                self.ellipse.num_points
            );
        }
        if !(self.ellipse.max_wind_speed >= 0.0) {
            bail!("ellipse.max_wind_speed must be >= 0, got {}", self.ellipse.max_wind_speed);
        }
        if !(self.impact.candidate_padding_deg > 0.0) || !self.impact.candidate_padding_deg.is_finite() {
            bail!(
                "impact.candidate_padding_deg must be > 0, got {}",
                self.impact.candidate_padding_deg
            );
        }
        if !(0.0..1.0).contains(&self.impact.min_fraction) {
            bail!("impact.min_fraction must be in [0, 1), got {}", self.impact.min_fraction);
        }
        if let Some(env) = &self.limits.envelope {
            if !(env.min_lat < env.max_lat) || !(env.min_lon < env.max_lon) {
                bail!("limits.envelope is inverted or empty: {:?}", env);
            }
        }
        if let (Some(min), Some(max)) = (self.limits.min_radius_km, self.limits.max_radius_km) {
            if !(min <= max) {
                bail!("limits.min_radius_km ({}) > limits.max_radius_km ({})", min, max);
            }
        }
        Ok(())
    }

    /// Options du chargeur de comtés
    pub fn load_options(&self) -> LoadOptions {
        self.data.load_options()
    }
}
