//! Sorties fichier : GeoJSON du résultat, reprojection PROJ optionnelle

pub mod geojson;
pub mod reproject;

pub use self::geojson::{export_impact_geojson, write_impact_geojson};
#[cfg(feature = "reproject")]
pub use reproject::Reprojector;
