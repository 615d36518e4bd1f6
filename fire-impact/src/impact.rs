//! Agrégation de la population touchée
//!
//! 1. pré-filtre : emprise géographique de l'empreinte (plus une marge) dans le R-tree
//! 2. intersection exacte en EPSG:5070 pour chaque candidat
//! 3. `fraction = aire(intersection) / aire(comté)`, bornée à [0, 1]
//! 4. `population * fraction` arrondi au plus proche (demi vers le haut)
//! 5. tri par contribution décroissante, identifiant croissant en cas d'égalité

use std::cmp::Ordering;

use geo::Rect;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ImpactConfig;
use crate::dataset::{AreaDataset, DatasetCounty};
use crate::footprint::SpreadFootprint;

/// Part d'un comté dans l'impact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyContribution {
    pub county_id: String,
    pub state: String,
    pub county_name: String,
    pub population: u64,

    /// Part de la surface du comté couverte, dans [0, 1]
    pub fraction: f64,

    pub intersection_area_m2: f64,
    pub contributing_population: u64,
}

impl CountyContribution {
    /// Pourcentage de surface touchée, au dixième
    pub fn affected_share_percent(&self) -> f64 {
        (self.fraction * 1000.0).round() / 10.0
    }
}

/// Résultat d'un calcul d'impact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactResult {
    /// Somme des `contributing_population`
    pub total_population: u64,

    /// Somme non arrondie de `population * fraction`
    pub estimated_population: f64,

    /// Triées par contribution décroissante puis identifiant
    pub contributions: Vec<CountyContribution>,

    pub footprint: SpreadFootprint,
}

impl ImpactResult {
    /// Résultat vide (aucun comté touché)
    pub fn empty(footprint: SpreadFootprint) -> Self {
        Self {
            total_population: 0,
            estimated_population: 0.0,
            contributions: Vec::new(),
            footprint,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Les `n` premiers comtés
    pub fn top(&self, n: usize) -> &[CountyContribution] {
        &self.contributions[..n.min(self.contributions.len())]
    }
}

/// Ordre du résultat : contribution décroissante, puis identifiant croissant
pub fn contribution_order(a: &CountyContribution, b: &CountyContribution) -> Ordering {
    b.contributing_population
        .cmp(&a.contributing_population)
        .then_with(|| a.county_id.cmp(&b.county_id))
}

/// Croise une empreinte avec le jeu de comtés
pub fn aggregate(footprint: &SpreadFootprint, dataset: &AreaDataset, config: &ImpactConfig) -> ImpactResult {
    let Some(bbox) = footprint.bbox_wgs84() else {
        return ImpactResult::empty(footprint.clone());
    };
    let pad = config.candidate_padding_deg;
    let query = Rect::new(
        (bbox.min().x - pad, bbox.min().y - pad),
        (bbox.max().x + pad, bbox.max().y + pad),
    );

    let candidates = dataset.candidates(&query);
    if candidates.is_empty() {
        debug!(
            lat = footprint.origin_latitude,
            lon = footprint.origin_longitude,
            "Footprint outside dataset coverage"
        );
        return ImpactResult::empty(footprint.clone());
    }

    let mut contributions: Vec<CountyContribution> = if config.parallel {
        candidates
            .par_iter()
            .filter_map(|c| contribution(footprint, c, config.min_fraction))
            .collect()
    } else {
        candidates
            .iter()
            .filter_map(|c| contribution(footprint, c, config.min_fraction))
            .collect()
    };
    contributions.sort_by(contribution_order);

    let total_population = contributions.iter().map(|c| c.contributing_population).sum();
    let estimated_population = contributions
        .iter()
        .map(|c| c.population as f64 * c.fraction)
        .sum();

    debug!(
        candidates = candidates.len(),
        counties = contributions.len(),
        total_population = total_population,
        "Impact aggregated"
    );

    ImpactResult {
        total_population,
        estimated_population,
        contributions,
        footprint: footprint.clone(),
    }
}

/// Part d'un comté ; `None` si le comté n'est pas touché
fn contribution(footprint: &SpreadFootprint, county: &DatasetCounty, min_fraction: f64) -> Option<CountyContribution> {
    if !(county.area_m2 > 0.0) {
        return None;
    }

    let intersection = match footprint.polygon.intersection(&county.projected) {
        Ok(shape) => shape,
        Err(e) => {
            warn!(county_id = %county.county.id, error = %e, "Intersection failed, county skipped");
            return None;
        }
    };

    let intersection_area_m2 = intersection.area_m2();
    let fraction = (intersection_area_m2 / county.area_m2).clamp(0.0, 1.0);
    if !(fraction > min_fraction) {
        return None;
    }

    let population = county.county.population;
    Some(CountyContribution {
        county_id: county.county.id.clone(),
        state: county.county.state.clone(),
        county_name: county.county.name.clone(),
        population,
        fraction,
        intersection_area_m2,
        contributing_population: (population as f64 * fraction).round() as u64,
    })
}
