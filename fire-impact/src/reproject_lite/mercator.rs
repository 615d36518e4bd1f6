//! Projection Web Mercator (EPSG:3857)
//!
//! Certains exports de contours sont en Web Mercator ; seul le sens
//! Web Mercator → géographique est nécessaire au chargement.

use super::ellipsoid::WGS84;
use super::Geographic;
use anyhow::{bail, Result};

/// Limite de l'emprise Web Mercator en mètres (±π R)
const MAX_EXTENT: f64 = std::f64::consts::PI * WGS84::A;

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Result<Geographic> {
    if !x.is_finite() || !y.is_finite() || x.abs() > MAX_EXTENT * (1.0 + 1e-9) {
        bail!("Web Mercator coordinate out of range: ({}, {})", x, y);
    }
    let r = WGS84::A;

    // Longitude = x / R
    let lon = x / r;

    // Latitude = 2 * atan(exp(y/R)) - π/2
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Ok(Geographic::new(lon, lat))
}
