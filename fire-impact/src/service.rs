//! Service de calcul d'impact
//!
//! Point d'entrée du backend : valide la requête, construit l'empreinte puis
//! agrège. Sans état propre : deux appels identiques donnent des résultats
//! identiques bit à bit, et le service peut être partagé entre threads.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::dataset::AreaDataset;
use crate::error::InvalidRequestError;
use crate::footprint::build_footprint;
use crate::impact::{aggregate, ImpactResult};
use crate::request::{FireSpreadRequest, RawImpactRequest};

#[derive(Debug, Clone)]
pub struct ImpactService {
    dataset: Arc<AreaDataset>,
    config: Config,
}

impl ImpactService {
    /// Refuse une configuration invalide (voir `Config::validate`)
    pub fn new(dataset: Arc<AreaDataset>, config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { dataset, config })
    }

    pub fn dataset(&self) -> &Arc<AreaDataset> {
        &self.dataset
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Calcule l'impact d'un départ de feu
    pub fn compute_impact(
        &self,
        origin_latitude: f64,
        origin_longitude: f64,
        base_radius_km: f64,
        wind_speed: f64,
        wind_direction: f64,
    ) -> Result<ImpactResult, InvalidRequestError> {
        let request = FireSpreadRequest::new(
            origin_latitude,
            origin_longitude,
            base_radius_km,
            wind_speed,
            wind_direction,
        )?;
        self.compute(&request)
    }

    /// Calcule l'impact d'une requête brute (valeurs texte, alias, acres)
    pub fn compute_raw(&self, raw: &RawImpactRequest) -> Result<ImpactResult, InvalidRequestError> {
        self.compute(&raw.to_request()?)
    }

    /// Calcule l'impact d'une requête déjà construite
    pub fn compute(&self, request: &FireSpreadRequest) -> Result<ImpactResult, InvalidRequestError> {
        self.validate(request)?;

        debug!(
            lat = request.origin_latitude,
            lon = request.origin_longitude,
            radius_km = request.base_radius_km,
            wind_speed = request.wind_speed,
            wind_from = request.wind_direction,
            "Computing impact"
        );

        let footprint = build_footprint(request, &self.config.ellipse)?;
        Ok(aggregate(&footprint, &self.dataset, &self.config.impact))
    }

    /// Vérifie les bornes configurées (emprise, rayon, vent)
    pub fn validate(&self, request: &FireSpreadRequest) -> Result<(), InvalidRequestError> {
        let limits = &self.config.limits;

        if let Some(env) = &limits.envelope {
            if !(env.min_lat..=env.max_lat).contains(&request.origin_latitude) {
                return Err(InvalidRequestError::new(
                    "origin_latitude",
                    format!(
                        "{} is outside the supported range [{}, {}]",
                        request.origin_latitude, env.min_lat, env.max_lat
                    ),
                ));
            }
            if !(env.min_lon..=env.max_lon).contains(&request.origin_longitude) {
                return Err(InvalidRequestError::new(
                    "origin_longitude",
                    format!(
                        "{} is outside the supported range [{}, {}]",
                        request.origin_longitude, env.min_lon, env.max_lon
                    ),
                ));
            }
        }

        if let Some(min) = limits.min_radius_km {
            if request.base_radius_km < min {
                return Err(InvalidRequestError::new(
                    "base_radius_km",
                    format!("must be >= {}, got {}", min, request.base_radius_km),
                ));
            }
        }
        if let Some(max) = limits.max_radius_km {
            if request.base_radius_km > max {
                return Err(InvalidRequestError::new(
                    "base_radius_km",
                    format!("must be <= {}, got {}", max, request.base_radius_km),
                ));
            }
        }
        if let Some(max) = limits.max_wind_speed {
            if request.wind_speed > max {
                return Err(InvalidRequestError::new(
                    "wind_speed",
                    format!("must be <= {}, got {}", max, request.wind_speed),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use county_data::{County, Shape, Wgs84};
    use geo::polygon;

    fn fresno() -> Arc<AreaDataset> {
        let dataset = AreaDataset::from_counties(vec![County {
            id: "06019".to_string(),
            state: "California".to_string(),
            name: "Fresno".to_string(),
            boundary: Shape::<Wgs84>::from_polygon(polygon![
                (x: -120.0, y: 36.0),
                (x: -119.0, y: 36.0),
                (x: -119.0, y: 37.0),
                (x: -120.0, y: 37.0),
                (x: -120.0, y: 36.0),
            ]),
            population: 1_000_000,
        }])
        .unwrap();
        Arc::new(dataset)
    }

    fn service(preset: &str) -> ImpactService {
        ImpactService::new(fresno(), Config::from_preset(preset).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = Config::default();
        config.ellipse.num_points = 3;
        let err = ImpactService::new(fresno(), config).unwrap_err();
        assert!(err.to_string().contains("num_points"), "{}", err);

        let mut config = Config::default();
        config.impact.min_fraction = 1.0;
        assert!(ImpactService::new(fresno(), config).is_err());
    }

    #[test]
    fn test_compute_impact() {
        let result = service("conus").compute_impact(36.7783, -119.4179, 5.0, 0.0, 0.0).unwrap();
        assert_eq!(result.contributions.len(), 1);
        assert!(result.total_population > 0);
        assert!(result.footprint.is_circle());
    }

    #[test]
    fn test_request_errors_name_the_field() {
        let s = service("conus");
        assert_eq!(s.compute_impact(36.0, -119.0, -1.0, 0.0, 0.0).unwrap_err().field, "base_radius_km");
        assert_eq!(s.compute_impact(36.0, -119.0, 5.0, -2.0, 0.0).unwrap_err().field, "wind_speed");
        assert_eq!(s.compute_impact(f64::NAN, -119.0, 5.0, 0.0, 0.0).unwrap_err().field, "origin_latitude");
    }

    #[test]
    fn test_backend_limits() {
        let s = service("backend");
        assert_eq!(s.compute_impact(0.0, -160.0, 5.0, 0.0, 0.0).unwrap_err().field, "origin_latitude");
        assert_eq!(s.compute_impact(36.0, -160.0, 5.0, 0.0, 0.0).unwrap_err().field, "origin_longitude");
        assert_eq!(s.compute_impact(36.0, -119.0, 0.5, 0.0, 0.0).unwrap_err().field, "base_radius_km");
        assert_eq!(s.compute_impact(36.0, -119.0, 150.0, 0.0, 0.0).unwrap_err().field, "base_radius_km");
        assert_eq!(s.compute_impact(36.0, -119.0, 5.0, 120.0, 0.0).unwrap_err().field, "wind_speed");
        assert!(s.compute_impact(36.7783, -119.4179, 5.0, 30.0, 245.0).is_ok());
    }

    #[test]
    fn test_open_ocean_is_empty_not_error() {
        let result = service("conus").compute_impact(0.0, -160.0, 5.0, 20.0, 90.0).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total_population, 0);
    }

    #[test]
    fn test_compute_raw() {
        let raw: RawImpactRequest =
            serde_json::from_str(r#"{"lat":"36.7783","lon":"-119.4179","acres":"5000"}"#).unwrap();
        let result = service("conus").compute_raw(&raw).unwrap();
        assert!(result.total_population > 0);
        assert_eq!(result.footprint.wind_direction_deg, 0.0);
    }
}
