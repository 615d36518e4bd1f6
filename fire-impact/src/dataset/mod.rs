//! Jeu de données des comtés, indexé et projeté
//!
//! Construit une seule fois puis partagé en lecture seule (`Arc`). Chaque comté
//! est projeté en EPSG:5070 à la construction, son aire mise en cache, et son
//! emprise géographique insérée dans un R-tree.

mod slot;

pub use slot::DatasetSlot;

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use county_data::{ConusAlbers, County, DataLoadError, Shape, ToGeographic};
use geo::Rect;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use tracing::{info, warn};

use crate::config::DataConfig;
use crate::fingerprint::dataset_fingerprint;
use crate::report::LoadReport;
use crate::reproject_lite::{to_conus_albers, SmartReprojector};

/// Comté prêt pour le calcul d'impact
#[derive(Debug, Clone)]
pub struct DatasetCounty {
    pub county: County,

    /// Contour en EPSG:5070
    pub projected: Shape<ConusAlbers>,

    /// Aire du contour projeté (m²)
    pub area_m2: f64,

    /// Emprise en degrés
    pub bbox: Rect<f64>,
}

/// Entrée du R-tree : position dans `counties` et emprise
struct IndexEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Jeu de comtés immuable
pub struct AreaDataset {
    /// Triés par identifiant
    counties: Vec<DatasetCounty>,
    tree: RTree<IndexEntry>,
    fingerprint: String,
}

impl AreaDataset {
    /// Projette, indexe et fige un ensemble de comtés
    ///
    /// Les identifiants en double sont écartés (le premier gagne).
    pub fn from_counties(mut counties: Vec<County>) -> Result<Self, DataLoadError> {
        let supplied = counties.len();
        counties.sort_by(|a, b| a.id.cmp(&b.id));

        let mut seen = HashSet::with_capacity(counties.len());
        counties.retain(|c| {
            let first = seen.insert(c.id.clone());
            if !first {
                warn!(county_id = %c.id, "Duplicate county dropped from dataset");
            }
            first
        });

        if counties.is_empty() {
            return Err(DataLoadError::EmptyDataset { supplied });
        }

        let fingerprint = dataset_fingerprint(&counties);

        let prepared: Vec<DatasetCounty> = counties
            .into_par_iter()
            .filter_map(|county| {
                let Some(bbox) = county.boundary.bounding_rect() else {
                    warn!(county_id = %county.id, "County without extent dropped from dataset");
                    return None;
                };
                let projected = to_conus_albers(&county.boundary);
                let area_m2 = projected.area_m2();
                Some(DatasetCounty {
                    county,
                    projected,
                    area_m2,
                    bbox,
                })
            })
            .collect();

        if prepared.is_empty() {
            return Err(DataLoadError::EmptyDataset { supplied });
        }

        let entries = prepared
            .iter()
            .enumerate()
            .map(|(index, c)| IndexEntry {
                index,
                envelope: AABB::from_corners(
                    [c.bbox.min().x, c.bbox.min().y],
                    [c.bbox.max().x, c.bbox.max().y],
                ),
            })
            .collect();

        Ok(Self {
            counties: prepared,
            tree: RTree::bulk_load(entries),
            fingerprint,
        })
    }

    /// Charge les deux sources et construit le jeu
    ///
    /// # Errors
    ///
    /// `DataLoadError` si une source est illisible, si une population est
    /// négative, si le CRS source n'est pas pris en charge ou si la jointure
    /// est vide. Le rapport rend compte des lignes écartées.
    pub fn load(
        counties_path: &Path,
        population_path: &Path,
        data: &DataConfig,
    ) -> Result<(Self, LoadReport), DataLoadError> {
        let reprojector = SmartReprojector::new(data.source_epsg)?;
        info!(
            counties = %counties_path.display(),
            population = %population_path.display(),
            epsg = reprojector.source_epsg(),
            reprojection = reprojector.description(),
            "Loading county dataset"
        );
        Self::load_with(counties_path, population_path, data, &reprojector)
    }

    /// Comme `load`, avec une conversion de coordonnées fournie
    pub fn load_with<R>(
        counties_path: &Path,
        population_path: &Path,
        data: &DataConfig,
        reprojector: &R,
    ) -> Result<(Self, LoadReport), DataLoadError>
    where
        R: ToGeographic + ?Sized,
    {
        let start = Instant::now();
        let mut report = LoadReport::new(counties_path, population_path, reprojector.source_epsg());

        let loaded =
            county_data::load_with(counties_path, population_path, &data.load_options(), reprojector)?;

        report.record_stats(&loaded.stats);
        for warning in &loaded.warnings {
            report.record_warning(warning);
        }

        let dataset = Self::from_counties(loaded.counties)?;
        report.set_fingerprint(dataset.fingerprint.clone());
        report.set_duration(start.elapsed());
        report.finalize();

        info!(
            counties = dataset.len(),
            fingerprint = %dataset.fingerprint,
            duration_ms = start.elapsed().as_millis() as u64,
            "Area dataset ready"
        );

        Ok((dataset, report))
    }

    /// Comtés dont l'emprise intersecte `bbox` (degrés), triés par identifiant
    pub fn candidates(&self, bbox: &Rect<f64>) -> Vec<&DatasetCounty> {
        let query = AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|e| e.index)
            .collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.counties[i]).collect()
    }

    /// Parcourt tous les comtés, par identifiant croissant
    pub fn iter(&self) -> impl Iterator<Item = &DatasetCounty> {
        self.counties.iter()
    }

    pub fn get(&self, county_id: &str) -> Option<&DatasetCounty> {
        self.counties
            .binary_search_by(|c| c.county.id.as_str().cmp(county_id))
            .ok()
            .map(|i| &self.counties[i])
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }

    /// Population totale du jeu
    pub fn total_population(&self) -> u64 {
        self.counties.iter().map(|c| c.county.population).sum()
    }

    /// Empreinte blake3 (identifiants, populations, contours)
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl std::fmt::Debug for AreaDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AreaDataset")
            .field("counties", &self.counties.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}
