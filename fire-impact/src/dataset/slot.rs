//! Emplacement partagé du jeu de données courant
//!
//! Rafraîchir les données = construire un nouveau jeu puis remplacer l'`Arc`.
//! Les requêtes en cours gardent leur jeu ; le verrou ne protège que l'échange.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::AreaDataset;

pub struct DatasetSlot {
    current: RwLock<Arc<AreaDataset>>,
}

impl DatasetSlot {
    pub fn new(dataset: AreaDataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
        }
    }

    /// Jeu courant
    pub fn current(&self) -> Arc<AreaDataset> {
        // un Arc ne peut pas être laissé à moitié écrit
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installe un nouveau jeu, retourne l'ancien
    pub fn replace(&self, dataset: AreaDataset) -> Arc<AreaDataset> {
        let next = Arc::new(dataset);
        info!(
            counties = next.len(),
            fingerprint = %next.fingerprint(),
            "Area dataset swapped"
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use county_data::{County, Shape, Wgs84};
    use geo::polygon;

    fn dataset(population: u64) -> AreaDataset {
        AreaDataset::from_counties(vec![County {
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
            population,
        }])
        .unwrap()
    }

    #[test]
    fn test_swap_keeps_readers_on_old_dataset() {
        let slot = DatasetSlot::new(dataset(1));
        let held = slot.current();

        let old = slot.replace(dataset(2));
        assert!(Arc::ptr_eq(&held, &old));
        assert_eq!(held.total_population(), 1);
        assert_eq!(slot.current().total_population(), 2);
        assert_ne!(held.fingerprint(), slot.current().fingerprint());
    }

    #[test]
    fn test_concurrent_readers() {
        let slot = Arc::new(DatasetSlot::new(dataset(7)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || slot.current().total_population())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 7);
        }
    }
}
