//! # fire-impact
//!
//! Estimation de la population exposée à un feu de forêt poussé par le vent.
//!
//! ## Features
//!
//! - Empreinte elliptique orientée par le vent, construite en EPSG:5070 (aires égales)
//! - Jeu de comtés immuable, projeté une fois et indexé par R-tree
//! - Intersection exacte et pondération par la part de surface couverte
//! - Résultats déterministes (condensé blake3), export GeoJSON
//! - CLI : calcul unitaire, lot CSV en parallèle, inspection du jeu
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fire_impact::{AreaDataset, Config, ImpactService};
//!
//! let config = Config::from_preset("conus")?;
//! let (dataset, report) = AreaDataset::load(counties, population, &config.data)?;
//! let service = ImpactService::new(Arc::new(dataset), config)?;
//!
//! let result = service.compute_impact(36.7783, -119.4179, 5.0, 30.0, 245.0)?;
//! for c in result.top(15) {
//!     println!("{} {}: {}", c.county_id, c.county_name, c.contributing_population);
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod footprint;
pub mod impact;
pub mod report;
pub mod reproject_lite;
pub mod request;
pub mod service;

pub use config::Config;
pub use dataset::{AreaDataset, DatasetSlot};
pub use error::InvalidRequestError;
pub use footprint::{build_footprint, spread_bearing, stretch_factor, SpreadFootprint};
pub use impact::{aggregate, CountyContribution, ImpactResult};
pub use report::{LoadReport, LoadStatus};
pub use request::{FireSpreadRequest, RawImpactRequest};
pub use service::ImpactService;
