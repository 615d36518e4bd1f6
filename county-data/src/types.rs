//! Types de données pour le crate county-data

use crate::crs::{Shape, Wgs84};
use crate::error::LoadWarning;

/// Un comté joint à sa population
#[derive(Debug, Clone, PartialEq)]
pub struct County {
    /// Code FIPS à 5 chiffres (état + comté), complété par des zéros
    pub id: String,

    /// Nom de l'état
    pub state: String,

    /// Nom du comté
    pub name: String,

    /// Contour en degrés géographiques, réparé et validé
    pub boundary: Shape<Wgs84>,

    /// Estimation de population pour l'année de référence
    pub population: u64,
}

/// Ligne de la source des contours, géométrie déjà décodée et validée
#[derive(Debug, Clone)]
pub struct CountyRow {
    pub id: String,
    pub state: String,
    pub name: String,
    pub boundary: Shape<Wgs84>,
}

/// Résultat du chargement des deux sources
#[derive(Debug)]
pub struct LoadResult {
    /// Comtés joints, triés par identifiant
    pub counties: Vec<County>,

    /// Compteurs du chargement
    pub stats: LoadStats,

    /// Anomalies non fatales rencontrées (lignes ignorées)
    pub warnings: Vec<LoadWarning>,
}

/// Compteurs du chargement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Lignes lues dans la source des contours
    pub county_rows: usize,
    /// Lignes lues dans la source de population
    pub population_rows: usize,
    /// Géométries rejetées
    pub malformed_geometries: usize,
    /// Comtés des territoires exclus
    pub excluded: usize,
    /// Identifiants en double (toutes sources)
    pub duplicate_ids: usize,
    /// Comtés sans population exploitable
    pub missing_population: usize,
    /// Comtés retenus après jointure
    pub joined: usize,
}

/// Noms des colonnes des deux sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    /// Identifiant dans la source des contours
    pub county_id: String,
    pub state: String,
    pub county_name: String,
    /// Géométrie (WKT, WKB hexadécimal ou GeoJSON)
    pub geometry: String,
    /// Identifiant dans la source de population
    pub population_id: String,
    pub population: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            county_id: "GEOID".to_string(),
            state: "STATE".to_string(),
            county_name: "COUNTY".to_string(),
            geometry: "BORDERS".to_string(),
            population_id: "GEOID".to_string(),
            population: "POP_ESTIMATE_2023".to_string(),
        }
    }
}

/// Territoires hors périmètre par défaut
pub const DEFAULT_EXCLUDED_STATES: &[&str] = &[
    "American Samoa",
    "Commonwealth Of The Northern Mariana Islands",
    "Guam",
    "Puerto Rico",
    "U.S. Virgin Islands",
    "Hawaii",
];

/// Options de chargement
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub columns: ColumnNames,

    /// États/territoires exclus (comparaison insensible à la casse)
    pub excluded_states: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            excluded_states: DEFAULT_EXCLUDED_STATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
