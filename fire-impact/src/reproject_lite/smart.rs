//! Reprojection intelligente : reproject_lite en priorité, fallback sur proj
//!
//! Utilise automatiquement la meilleure option disponible pour ramener la
//! colonne géométrie des contours en WGS84.

use county_data::{DataLoadError, GeometryError, ToGeographic};
use tracing::debug;

use super::ReprojectorLite;

/// Reprojection intelligente
///
/// Essaie d'abord reproject_lite (pure Rust), puis fallback sur proj si disponible.
pub enum SmartReprojector {
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::export::reproject::Reprojector),
    /// Pas de reprojection (source déjà en WGS84)
    Identity,
}

impl SmartReprojector {
    /// Crée un reprojector depuis l'EPSG de la source vers EPSG:4326
    pub fn new(source_epsg: u32) -> Result<Self, DataLoadError> {
        if source_epsg == 4326 {
            return Ok(Self::Identity);
        }

        if ReprojectorLite::is_supported_source(source_epsg) {
            let lite = ReprojectorLite::new(source_epsg)
                .map_err(|_| DataLoadError::UnsupportedCrs(source_epsg))?;
            return Ok(Self::Lite(lite));
        }

        #[cfg(feature = "reproject")]
        {
            match crate::export::reproject::Reprojector::new(source_epsg) {
                Ok(proj) => return Ok(Self::Proj(proj)),
                Err(e) => {
                    debug!(epsg = source_epsg, error = %e, "PROJ cannot handle source CRS");
                }
            }
        }

        debug!(
            epsg = source_epsg,
            "No reprojection path (reproject_lite: 4269, 5070, 3857; others need --features reproject)"
        );
        Err(DataLoadError::UnsupportedCrs(source_epsg))
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (no reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}

impl ToGeographic for SmartReprojector {
    fn source_epsg(&self) -> u32 {
        match self {
            Self::Identity => 4326,
            Self::Lite(lite) => lite.source_epsg(),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.source_epsg(),
        }
    }

    fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), GeometryError> {
        let converted = match self {
            Self::Identity => Ok((x, y)),
            Self::Lite(lite) => lite.transform_point(x, y),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_point(x, y),
        };
        converted.map_err(|e| GeometryError::Reprojection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let r = SmartReprojector::new(4326).unwrap();
        assert!(matches!(r, SmartReprojector::Identity));
        assert_eq!(r.source_epsg(), 4326);
        assert_eq!(r.to_geographic(-100.0, 40.0).unwrap(), (-100.0, 40.0));
    }

    #[test]
    fn test_lite() {
        let r = SmartReprojector::new(5070).unwrap();
        assert!(matches!(r, SmartReprojector::Lite(_)));
        let (lon, lat) = r.to_geographic(0.0, 0.0).unwrap();
        assert!((lon + 96.0).abs() < 1e-9 && (lat - 23.0).abs() < 1e-9);
    }

    #[cfg(not(feature = "reproject"))]
    #[test]
    fn test_unsupported_without_proj() {
        assert!(matches!(
            SmartReprojector::new(2154),
            Err(DataLoadError::UnsupportedCrs(2154))
        ));
    }

    #[test]
    fn test_lite_error_maps_to_geometry_error() {
        let r = SmartReprojector::new(3857).unwrap();
        assert!(matches!(
            r.to_geographic(1.0e9, 0.0),
            Err(GeometryError::Reprojection(_))
        ));
    }
}
