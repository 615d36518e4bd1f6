//! Reprojection de coordonnées avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

#[cfg(feature = "reproject")]
use std::sync::Mutex;

#[cfg(feature = "reproject")]
use anyhow::{anyhow, Context, Result};
#[cfg(feature = "reproject")]
use proj::Proj;

/// Conversion d'un système quelconque vers WGS84 (lon, lat)
#[cfg(feature = "reproject")]
pub struct Reprojector {
    // Proj n'est pas Sync : accès sérialisé
    proj: Mutex<Proj>,
    source_epsg: u32,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un reprojector EPSG:source → EPSG:4326
    pub fn new(source_epsg: u32) -> Result<Self> {
        let source = format!("EPSG:{}", source_epsg);

        let proj = Proj::new_known_crs(&source, "EPSG:4326", None)
            .context(format!("Failed to create projection from {} to EPSG:4326", source))?;

        Ok(Self {
            proj: Mutex::new(proj),
            source_epsg,
        })
    }

    /// Retourne le SRID source
    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Transforme une coordonnée unique en (lon, lat) degrés
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let proj = self
            .proj
            .lock()
            .map_err(|_| anyhow!("PROJ context poisoned"))?;
        proj.convert((x, y))
            .context("Coordinate transformation failed")
    }
}
