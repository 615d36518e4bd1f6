//! Types d'erreurs pour le crate county-data

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs fatales pendant le chargement des sources comté/population
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Source illisible
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV mal formé (en-tête ou enregistrement illisible)
    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// Colonne attendue absente de l'en-tête
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { source_name: String, column: String },

    /// Population négative (donnée corrompue, on refuse tout le jeu)
    #[error("Negative population {value} for county {county_id}")]
    NegativePopulation { county_id: String, value: i64 },

    /// La jointure comtés/population ne produit aucune ligne
    #[error("Join produced no counties ({county_rows} county rows, {population_rows} population rows)")]
    EmptyJoin {
        county_rows: usize,
        population_rows: usize,
    },

    /// Aucun comté exploitable parmi ceux fournis au jeu de données
    #[error("No usable county among {supplied} supplied")]
    EmptyDataset { supplied: usize },

    /// Système de coordonnées source non pris en charge
    #[error("Unsupported source CRS EPSG:{0}")]
    UnsupportedCrs(u32),
}

impl DataLoadError {
    /// Crée une erreur d'I/O avec le chemin concerné
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Crée une erreur CSV avec le nom de la source
    pub fn csv(source_name: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            source_name: source_name.into(),
            source,
        }
    }

    /// Crée une erreur de colonne manquante
    pub fn missing_column(source_name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            source_name: source_name.into(),
            column: column.into(),
        }
    }
}

/// Anomalies non fatales : la ligne concernée est ignorée, le chargement continue
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadWarning {
    /// Géométrie illisible ou invalide
    #[error("Malformed geometry for {county_id}: {reason}")]
    MalformedGeometry { county_id: String, reason: String },

    /// Identifiant qui ne ressemble pas à un code FIPS de comté
    #[error("Invalid county id '{value}' in {source_name} (row {row})")]
    InvalidId {
        source_name: String,
        row: usize,
        value: String,
    },

    /// Identifiant déjà vu dans la même source (la première ligne gagne)
    #[error("Duplicate county id {county_id} in {source_name}")]
    DuplicateId {
        county_id: String,
        source_name: String,
    },

    /// Valeur de population non numérique
    #[error("Invalid population '{value}' for {county_id}")]
    InvalidPopulation { county_id: String, value: String },

    /// Comté sans ligne de population correspondante
    #[error("No population row for county {county_id}")]
    MissingPopulation { county_id: String },

    /// Comté hors du périmètre retenu (territoires exclus)
    #[error("County {county_id} excluded ({state})")]
    Excluded { county_id: String, state: String },
}

impl LoadWarning {
    /// Crée un warning de géométrie invalide
    pub fn malformed(county_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            county_id: county_id.into(),
            reason: reason.into(),
        }
    }

    /// Catégorie courte, utilisée pour les compteurs du rapport
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedGeometry { .. } => "malformed_geometry",
            Self::InvalidId { .. } => "invalid_id",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::InvalidPopulation { .. } => "invalid_population",
            Self::MissingPopulation { .. } => "missing_population",
            Self::Excluded { .. } => "excluded",
        }
    }

    /// Identifiant du comté concerné, si connu
    pub fn county_id(&self) -> Option<&str> {
        match self {
            Self::MalformedGeometry { county_id, .. }
            | Self::DuplicateId { county_id, .. }
            | Self::InvalidPopulation { county_id, .. }
            | Self::MissingPopulation { county_id }
            | Self::Excluded { county_id, .. } => Some(county_id),
            Self::InvalidId { .. } => None,
        }
    }
}

/// Erreur de décodage ou de validation d'une géométrie
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Encodage non reconnu (ni WKT, ni WKB hexadécimal, ni GeoJSON)
    #[error("unrecognized geometry encoding")]
    UnknownEncoding,

    /// Le décodeur a échoué
    #[error("decode failed: {0}")]
    Decode(String),

    /// Type de géométrie autre que Polygon/MultiPolygon
    #[error("expected Polygon or MultiPolygon, got {0}")]
    UnexpectedType(&'static str),

    /// Coordonnée non finie ou hors des bornes géographiques
    #[error("coordinate out of range: ({x}, {y})")]
    OutOfRange { x: f64, y: f64 },

    /// Reprojection vers les degrés géographiques impossible
    #[error("reprojection failed: {0}")]
    Reprojection(String),

    /// Plus aucun polygone exploitable après réparation
    #[error("no usable polygon left ({0})")]
    Empty(String),

    /// Anneau qui se recoupe
    #[error("self-intersecting ring near ({x:.6}, {y:.6})")]
    SelfIntersection { x: f64, y: f64 },

    /// Trou hors de son anneau extérieur
    #[error("interior ring outside its exterior near ({x:.6}, {y:.6})")]
    HoleOutsideShell { x: f64, y: f64 },

    /// Deux parties du multipolygone se recouvrent
    #[error("polygons {first} and {second} overlap")]
    OverlappingParts { first: usize, second: usize },

    /// Le calcul booléen a échoué (géométrie quasi dégénérée)
    #[error("boolean operation failed")]
    BooleanOp,
}
