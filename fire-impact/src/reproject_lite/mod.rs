//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Projections prises en charge :
//! - NAD83 / Conus Albers (EPSG:5070), dans les deux sens : c'est le plan de
//!   travail à aires égales de toute la chaîne de calcul
//! - Web Mercator (EPSG:3857) → géographique
//! - NAD83 géographique (EPSG:4269), assimilé à WGS84 (écart < 2 m)
//!
//! Cible : WGS84 (EPSG:4326)

mod albers;
mod ellipsoid;
mod mercator;
mod smart;

pub use albers::{conus_albers, AlbersEqualArea};
pub use smart::SmartReprojector;

use std::convert::Infallible;

use anyhow::{bail, Result};
use county_data::{ConusAlbers, Projection, Shape, Wgs84};
use geo::Coord;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Reprojection légère des sources de contours vers WGS84
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source_epsg: u32,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32) -> Result<Self> {
        if !Self::is_supported_source(source_epsg) {
            bail!(
                "EPSG:{} not supported. Supported sources: 4269, 5070, 3857",
                source_epsg
            );
        }
        Ok(Self { source_epsg })
    }

    /// Vérifie si l'EPSG source est supporté
    pub fn is_supported_source(epsg: u32) -> bool {
        matches!(epsg, 4269 | 5070 | 3857)
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Transforme un point (x, y) de la source vers (lon, lat) en degrés
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            bail!("Non-finite coordinate ({}, {})", x, y);
        }
        let geo = match self.source_epsg {
            4269 => return Ok((x, y)),
            5070 => conus_albers().inverse(x, y),
            3857 => mercator::web_mercator_to_geographic(x, y)?,
            _ => bail!("EPSG:{} not supported", self.source_epsg),
        };
        Ok(geo.to_degrees())
    }
}

/// Degrés WGS84 vers le plan Conus Albers
#[derive(Debug, Clone, Copy, Default)]
pub struct ToConusAlbers;

impl Projection for ToConusAlbers {
    type Source = Wgs84;
    type Target = ConusAlbers;
    type Error = Infallible;

    fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, Infallible> {
        let (x, y) = conus_albers().forward(Geographic::from_degrees(coord.x, coord.y));
        Ok(Coord { x, y })
    }
}

/// Plan Conus Albers vers les degrés WGS84
#[derive(Debug, Clone, Copy, Default)]
pub struct FromConusAlbers;

impl Projection for FromConusAlbers {
    type Source = ConusAlbers;
    type Target = Wgs84;
    type Error = Infallible;

    fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, Infallible> {
        let (lon, lat) = conus_albers().inverse(coord.x, coord.y).to_degrees();
        Ok(Coord { x: lon, y: lat })
    }
}

/// Projette une surface géographique dans le plan à aires égales
pub fn to_conus_albers(shape: &Shape<Wgs84>) -> Shape<ConusAlbers> {
    match shape.project(&ToConusAlbers) {
        Ok(shape) => shape,
        Err(never) => match never {},
    }
}

/// Ramène une surface du plan à aires égales en degrés géographiques
pub fn from_conus_albers(shape: &Shape<ConusAlbers>) -> Shape<Wgs84> {
    match shape.project(&FromConusAlbers) {
        Ok(shape) => shape,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_albers_to_wgs84() {
        // Fresno approximativement
        let reproj = ReprojectorLite::new(5070).unwrap();
        let (lon, lat) = reproj.transform_point(-2_049_764.2, 1_779_751.4).unwrap();

        assert!((lon - (-119.4179)).abs() < 1e-6, "lon={}", lon);
        assert!((lat - 36.7783).abs() < 1e-6, "lat={}", lat);
    }

    #[test]
    fn test_nad83_passthrough() {
        let reproj = ReprojectorLite::new(4269).unwrap();
        assert_eq!(reproj.transform_point(-100.0, 40.0).unwrap(), (-100.0, 40.0));
    }

    #[test]
    fn test_unsupported_epsg() {
        assert!(ReprojectorLite::new(4326).is_err());
        assert!(ReprojectorLite::new(2154).is_err());
        let reproj = ReprojectorLite::new(5070).unwrap();
        assert!(reproj.transform_point(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_shape_roundtrip() {
        let shape: Shape<Wgs84> = Shape::from_polygon(polygon![
            (x: -120.0, y: 36.0),
            (x: -119.0, y: 36.0),
            (x: -119.0, y: 37.0),
            (x: -120.0, y: 37.0),
            (x: -120.0, y: 36.0),
        ]);
        let projected = to_conus_albers(&shape);
        assert_eq!(projected.epsg(), 5070);

        // ~ 89.5 km x 111 km
        let area_km2 = projected.area_m2() / 1e6;
        assert!(area_km2 > 9_500.0 && area_km2 < 10_500.0, "area={}", area_km2);

        let back = from_conus_albers(&projected);
        for (a, b) in shape.as_multi_polygon().0[0]
            .exterior()
            .coords()
            .zip(back.as_multi_polygon().0[0].exterior().coords())
        {
            assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
        }
    }
}
