//! Construction de l'empreinte de propagation
//!
//! Ellipse orientée dans le sens du vent, générée directement dans le plan
//! à aires égales (EPSG:5070). Le point d'éclosion est décalé de
//! `origin_shift_m` vers l'amont du centre de l'ellipse.

use std::f64::consts::PI;

use county_data::{ConusAlbers, Shape, Wgs84};
use geo::{Coord, LineString, MultiPolygon, Polygon, Rect};
use serde::Serialize;
use tracing::debug;

use crate::config::EllipseConfig;
use crate::error::InvalidRequestError;
use crate::reproject_lite::{conus_albers, from_conus_albers, Geographic};
use crate::request::FireSpreadRequest;

/// Direction vers laquelle le feu progresse, à partir de la direction d'où vient le vent
///
/// Convention météorologique : un vent de 245° (OSO) pousse le feu vers 65° (ENE).
pub fn spread_bearing(wind_from_deg: f64) -> f64 {
    (wind_from_deg + 180.0).rem_euclid(360.0)
}

/// Facteur d'étirement du grand axe, saturé à `max_wind_speed`
pub fn stretch_factor(wind_speed: f64, max_wind_speed: f64) -> f64 {
    1.0 + wind_speed.clamp(0.0, max_wind_speed.max(0.0)) / 100.0
}

/// Empreinte calculée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadFootprint {
    pub origin_latitude: f64,
    pub origin_longitude: f64,

    /// Demi-grand axe (m), dans le sens de propagation
    pub major_axis_m: f64,

    /// Demi-petit axe (m), égal au rayon de base
    pub minor_axis_m: f64,

    pub stretch_factor: f64,

    /// Direction d'où vient le vent
    pub wind_direction_deg: f64,

    /// Azimut vrai de l'allongement
    pub rotation_bearing_deg: f64,

    /// Même direction, mesurée depuis le nord du quadrillage EPSG:5070
    pub grid_bearing_deg: f64,

    pub origin_shift_m: f64,

    /// Centre de l'ellipse en EPSG:5070
    pub center_x_m: f64,
    pub center_y_m: f64,

    /// Aire du polygone échantillonné
    pub area_m2: f64,

    /// Ellipse en EPSG:5070
    #[serde(skip)]
    pub polygon: Shape<ConusAlbers>,

    /// Même contour en degrés (projection inverse des sommets)
    #[serde(skip)]
    pub outline: Shape<Wgs84>,
}

impl SpreadFootprint {
    /// Emprise du contour en degrés
    pub fn bbox_wgs84(&self) -> Option<Rect<f64>> {
        self.outline.bounding_rect()
    }

    /// Nombre de sommets distincts du contour
    pub fn num_points(&self) -> usize {
        self.polygon.vertex_count().saturating_sub(1)
    }

    /// Vrai si l'empreinte est un cercle (vent nul)
    pub fn is_circle(&self) -> bool {
        self.major_axis_m == self.minor_axis_m
    }
}

/// Construit l'ellipse de propagation d'une requête
///
/// # Errors
///
/// `InvalidRequestError` si le rayon n'est pas > 0 ou si le vent est négatif.
pub fn build_footprint(
    request: &FireSpreadRequest,
    config: &EllipseConfig,
) -> Result<SpreadFootprint, InvalidRequestError> {
    if !(request.base_radius_km > 0.0) || !request.base_radius_km.is_finite() {
        return Err(InvalidRequestError::new(
            "base_radius_km",
            format!("must be > 0, got {}", request.base_radius_km),
        ));
    }
    if !(request.wind_speed >= 0.0) || !request.wind_speed.is_finite() {
        return Err(InvalidRequestError::new(
            "wind_speed",
            format!("must be >= 0, got {}", request.wind_speed),
        ));
    }

    let stretch = stretch_factor(request.wind_speed, config.max_wind_speed);
    let minor = request.base_radius_km * 1000.0;
    let major = minor * stretch;
    let shift = (major - minor) / 2.0;

    let wind_from = request.wind_direction.rem_euclid(360.0);
    let bearing = spread_bearing(wind_from);

    let albers = conus_albers();
    let origin = Geographic::from_degrees(request.origin_longitude, request.origin_latitude);
    let (x0, y0) = albers.forward(origin);

    // azimut vrai -> gisement
    let grid_bearing = bearing.to_radians() - albers.convergence(origin.lon);
    let (dx, dy) = (grid_bearing.sin(), grid_bearing.cos());
    let (cx, cy) = (x0 + shift * dx, y0 + shift * dy);

    let n = config.num_points;
    let mut ring: Vec<Coord<f64>> = (0..n)
        .map(|k| {
            let t = 2.0 * PI * k as f64 / n as f64;
            let (along, across) = (major * t.cos(), minor * t.sin());
            Coord {
                x: cx + along * dx - across * dy,
                y: cy + along * dy + across * dx,
            }
        })
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }

    let polygon = Shape::<ConusAlbers>::from_projected(MultiPolygon::new(vec![Polygon::new(LineString::from(ring), vec![])]));
    let outline = from_conus_albers(&polygon);
    let area_m2 = polygon.area_m2();

    debug!(
        wind_from = wind_from,
        spread_to = bearing,
        major_m = major,
        minor_m = minor,
        shift_m = shift,
        area_km2 = area_m2 / 1e6,
        "Spread footprint built"
    );

    Ok(SpreadFootprint {
        origin_latitude: request.origin_latitude,
        origin_longitude: request.origin_longitude,
        major_axis_m: major,
        minor_axis_m: minor,
        stretch_factor: stretch,
        wind_direction_deg: wind_from,
        rotation_bearing_deg: bearing,
        grid_bearing_deg: grid_bearing.to_degrees().rem_euclid(360.0),
        origin_shift_m: shift,
        center_x_m: cx,
        center_y_m: cy,
        area_m2,
        polygon,
        outline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRESNO: (f64, f64) = (36.7783, -119.4179);

    fn request(radius: f64, speed: f64, direction: f64) -> FireSpreadRequest {
        FireSpreadRequest::new(FRESNO.0, FRESNO.1, radius, speed, direction).unwrap()
    }

    /// Azimut initial sur la sphère, en degrés
    fn true_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
        let dl = (lon2 - lon1).to_radians();
        let y = dl.sin() * p2.cos();
        let x = p1.cos() * p2.sin() - p1.sin() * p2.cos() * dl.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    #[test]
    fn test_spread_bearing_is_reciprocal() {
        assert_eq!(spread_bearing(245.0), 65.0);
        assert_eq!(spread_bearing(0.0), 180.0);
        assert_eq!(spread_bearing(180.0), 0.0);
        assert_eq!(spread_bearing(270.0), 90.0);
        assert_eq!(spread_bearing(359.0), 179.0);
        assert_eq!(spread_bearing(-90.0), 90.0);
    }

    #[test]
    fn test_stretch_factor_saturates() {
        assert_eq!(stretch_factor(0.0, 100.0), 1.0);
        assert!((stretch_factor(30.0, 100.0) - 1.3).abs() < 1e-12);
        assert_eq!(stretch_factor(250.0, 100.0), 2.0);
        assert_eq!(stretch_factor(50.0, 20.0), 1.2);
    }

    #[test]
    fn test_zero_wind_is_circle_for_any_direction() {
        for direction in [0.0, 45.0, 137.5, 245.0, 359.9] {
            let fp = build_footprint(&request(5.0, 0.0, direction), &EllipseConfig::default()).unwrap();
            assert!(fp.is_circle());
            assert_eq!(fp.major_axis_m, 5000.0);
            assert_eq!(fp.minor_axis_m, 5000.0);
            assert_eq!(fp.origin_shift_m, 0.0);
        }
    }

    #[test]
    fn test_scenario_wsw_wind() {
        let fp = build_footprint(&request(5.0, 30.0, 245.0), &EllipseConfig::default()).unwrap();
        assert_eq!(fp.rotation_bearing_deg, 65.0);
        assert!((fp.major_axis_m - 6500.0).abs() < 1e-9, "major={}", fp.major_axis_m);
        assert_eq!(fp.minor_axis_m, 5000.0);
        assert!((fp.origin_shift_m - 750.0).abs() < 1e-9);

        // premier sommet = extrémité aval, à shift + grand axe de l'origine, vers l'ENE
        let tip = fp.outline.as_multi_polygon().0[0].exterior().0[0];
        let b = true_bearing(FRESNO.0, FRESNO.1, tip.y, tip.x);
        assert!((b - 65.0).abs() < 0.5, "tip bearing={}", b);
        assert!(tip.x > FRESNO.1 && tip.y > FRESNO.0);
    }

    #[test]
    fn test_cardinal_directions_are_true_bearings() {
        // vent du sud : le feu part plein nord malgré la convergence des méridiens
        let fp = build_footprint(&request(5.0, 50.0, 180.0), &EllipseConfig::default()).unwrap();
        let tip = fp.outline.as_multi_polygon().0[0].exterior().0[0];
        assert!((tip.x - FRESNO.1).abs() < 1e-6, "tip lon={}", tip.x);
        assert!(tip.y > FRESNO.0);

        let fp = build_footprint(&request(5.0, 50.0, 90.0), &EllipseConfig::default()).unwrap();
        let tip = fp.outline.as_multi_polygon().0[0].exterior().0[0];
        let b = true_bearing(FRESNO.0, FRESNO.1, tip.y, tip.x);
        assert!((b - 270.0).abs() < 0.01, "tip bearing={}", b);
    }

    #[test]
    fn test_monotonic_stretch() {
        let config = EllipseConfig::default();
        let mut previous = 0.0;
        for speed in [0.0, 1.0, 5.0, 12.5, 30.0, 60.0, 99.0, 100.0, 150.0, 400.0] {
            let fp = build_footprint(&request(3.0, speed, 300.0), &config).unwrap();
            assert!(fp.major_axis_m >= previous, "speed={} major={}", speed, fp.major_axis_m);
            assert!(fp.major_axis_m >= fp.minor_axis_m);
            previous = fp.major_axis_m;
        }
    }

    #[test]
    fn test_polygon_area_close_to_ellipse() {
        let fp = build_footprint(&request(5.0, 30.0, 245.0), &EllipseConfig::default()).unwrap();
        let exact = PI * fp.major_axis_m * fp.minor_axis_m;
        let rel = (exact - fp.area_m2) / exact;
        assert!(rel > 0.0 && rel < 0.002, "relative error={}", rel);
        assert_eq!(fp.num_points(), 64);

        let fine = EllipseConfig {
            num_points: 512,
            ..EllipseConfig::default()
        };
        let fp = build_footprint(&request(5.0, 0.0, 0.0), &fine).unwrap();
        let exact = PI * 5000.0 * 5000.0;
        assert!((exact - fp.area_m2) / exact < 1e-4);
    }

    #[test]
    fn test_ring_is_closed_and_counter_clockwise() {
        let fp = build_footprint(&request(2.0, 40.0, 10.0), &EllipseConfig::default()).unwrap();
        let ring = &fp.polygon.as_multi_polygon().0[0].exterior().0;
        assert_eq!(ring.first(), ring.last());
        let signed: f64 = ring.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum();
        assert!(signed > 0.0);
    }

    #[test]
    fn test_rejects_bad_radius_and_wind() {
        let mut r = request(5.0, 0.0, 0.0);
        r.base_radius_km = -1.0;
        let err = build_footprint(&r, &EllipseConfig::default()).unwrap_err();
        assert_eq!(err.field, "base_radius_km");

        let mut r = request(5.0, 0.0, 0.0);
        r.wind_speed = -3.0;
        let err = build_footprint(&r, &EllipseConfig::default()).unwrap_err();
        assert_eq!(err.field, "wind_speed");
    }
}
