//! Requêtes de calcul d'impact
//!
//! `RawImpactRequest` reçoit les données externes telles quelles (nombres ou
//! chaînes, alias de champs du backend de prédiction) ; `FireSpreadRequest`
//! est la version validée.

use serde::{Deserialize, Serialize};

use crate::error::InvalidRequestError;

/// m² par acre
const SQUARE_METERS_PER_ACRE: f64 = 4046.8564224;

/// Requête validée : valeurs finies, rayon > 0, vent >= 0, direction dans [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FireSpreadRequest {
    pub origin_latitude: f64,
    pub origin_longitude: f64,
    pub base_radius_km: f64,
    pub wind_speed: f64,
    /// Direction d'où vient le vent, en degrés
    pub wind_direction: f64,
}

impl FireSpreadRequest {
    pub fn new(
        origin_latitude: f64,
        origin_longitude: f64,
        base_radius_km: f64,
        wind_speed: f64,
        wind_direction: f64,
    ) -> Result<Self, InvalidRequestError> {
        let origin_latitude = finite("origin_latitude", origin_latitude)?;
        let origin_longitude = finite("origin_longitude", origin_longitude)?;
        let base_radius_km = finite("base_radius_km", base_radius_km)?;
        let wind_speed = finite("wind_speed", wind_speed)?;
        let wind_direction = finite("wind_direction", wind_direction)?;

        if !(-90.0..=90.0).contains(&origin_latitude) {
            return Err(InvalidRequestError::new(
                "origin_latitude",
                format!("must be within [-90, 90], got {}", origin_latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&origin_longitude) {
            return Err(InvalidRequestError::new(
                "origin_longitude",
                format!("must be within [-180, 180], got {}", origin_longitude),
            ));
        }
        if base_radius_km <= 0.0 {
            return Err(InvalidRequestError::new(
                "base_radius_km",
                format!("must be > 0, got {}", base_radius_km),
            ));
        }
        if wind_speed < 0.0 {
            return Err(InvalidRequestError::new(
                "wind_speed",
                format!("must be >= 0, got {}", wind_speed),
            ));
        }

        Ok(Self {
            origin_latitude,
            origin_longitude,
            base_radius_km,
            wind_speed,
            wind_direction: wind_direction.rem_euclid(360.0),
        })
    }
}

/// Rayon du disque de même surface qu'un incendie de `acres` acres
pub fn radius_km_from_acres(acres: f64) -> f64 {
    (acres * SQUARE_METERS_PER_ACRE / std::f64::consts::PI).sqrt() / 1000.0
}

/// Nombre tolérant : `12.5` ou `"12.5"`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn value(&self, field: &'static str) -> Result<f64, InvalidRequestError> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| InvalidRequestError::new(field, format!("not a number: '{}'", s))),
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// Requête brute, telle que reçue du backend (JSON ou CSV)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawImpactRequest {
    #[serde(default, alias = "latitude", alias = "lat")]
    pub origin_latitude: Option<LooseNumber>,

    #[serde(default, alias = "longitude", alias = "lon", alias = "lng")]
    pub origin_longitude: Option<LooseNumber>,

    #[serde(default, alias = "radius_km")]
    pub base_radius_km: Option<LooseNumber>,

    /// Surface prédite, alternative au rayon
    #[serde(default)]
    pub acres: Option<LooseNumber>,

    #[serde(default, alias = "wind_speed_mph")]
    pub wind_speed: Option<LooseNumber>,

    #[serde(default, alias = "wind_direction_deg")]
    pub wind_direction: Option<LooseNumber>,
}

impl RawImpactRequest {
    /// Valide et convertit ; le vent absent vaut calme (0, 0)
    pub fn to_request(&self) -> Result<FireSpreadRequest, InvalidRequestError> {
        let lat = required(&self.origin_latitude, "origin_latitude")?;
        let lon = required(&self.origin_longitude, "origin_longitude")?;

        let radius_km = match (&self.base_radius_km, &self.acres) {
            (Some(r), None) => r.value("base_radius_km")?,
            (None, Some(a)) => {
                let acres = finite("acres", a.value("acres")?)?;
                if acres <= 0.0 {
                    return Err(InvalidRequestError::new(
                        "acres",
                        format!("must be > 0, got {}", acres),
                    ));
                }
                radius_km_from_acres(acres)
            }
            (Some(_), Some(_)) => {
                return Err(InvalidRequestError::new(
                    "base_radius_km",
                    "give either base_radius_km or acres, not both",
                ))
            }
            (None, None) => {
                return Err(InvalidRequestError::new(
                    "base_radius_km",
                    "missing (or give acres)",
                ))
            }
        };

        let wind_speed = optional(&self.wind_speed, "wind_speed")?;
        let wind_direction = optional(&self.wind_direction, "wind_direction")?;

        FireSpreadRequest::new(lat, lon, radius_km, wind_speed, wind_direction)
    }
}

fn required(value: &Option<LooseNumber>, field: &'static str) -> Result<f64, InvalidRequestError> {
    value
        .as_ref()
        .ok_or_else(|| InvalidRequestError::new(field, "missing"))?
        .value(field)
}

fn optional(value: &Option<LooseNumber>, field: &'static str) -> Result<f64, InvalidRequestError> {
    value.as_ref().map_or(Ok(0.0), |v| v.value(field))
}

fn finite(field: &'static str, value: f64) -> Result<f64, InvalidRequestError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidRequestError::new(field, format!("must be finite, got {}", value)))
    }
}
