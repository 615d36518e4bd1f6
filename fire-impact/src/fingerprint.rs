//! Empreintes blake3 du jeu de données et des résultats
//!
//! Le hash de géométrie est normalisé pour être indépendant du sommet de
//! départ des anneaux : un contour qui commence à un autre sommet garde la
//! même empreinte.

use blake3::Hasher;
use geo::{Coord, LineString, MultiPolygon};

use county_data::County;

use crate::impact::ImpactResult;

/// Hash stable d'un multipolygone
///
/// Chaque anneau est lu à partir de son sommet lexicographiquement le plus
/// petit (min x, puis min y).
pub fn geometry_hash(mp: &MultiPolygon<f64>) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(b"MULTIPOLYGON");
    for poly in mp.0.iter() {
        hasher.update(b"POLY");
        hasher.update(b"EXT");
        hash_ring_normalized(&mut hasher, poly.exterior());
        for interior in poly.interiors() {
            hasher.update(b"INT");
            hash_ring_normalized(&mut hasher, interior);
        }
    }
    *hasher.finalize().as_bytes()
}

/// Empreinte hexadécimale d'un ensemble de comtés, dans l'ordre donné
pub fn dataset_fingerprint<'a, I>(counties: I) -> String
where
    I: IntoIterator<Item = &'a County>,
{
    let mut hasher = Hasher::new();
    for county in counties {
        hasher.update(county.id.as_bytes());
        hasher.update(&[0]);
        hasher.update(&county.population.to_le_bytes());
        hasher.update(&geometry_hash(county.boundary.as_multi_polygon()));
    }
    hex::encode(hasher.finalize().as_bytes())
}

/// Condensé d'un résultat, sur les motifs binaires exacts des flottants
///
/// Deux résultats de même condensé sont identiques bit à bit.
pub fn result_digest(result: &ImpactResult) -> String {
    let mut hasher = Hasher::new();
    hasher.update(&result.total_population.to_le_bytes());
    hasher.update(&result.estimated_population.to_bits().to_le_bytes());

    let fp = &result.footprint;
    for v in [
        fp.origin_latitude,
        fp.origin_longitude,
        fp.major_axis_m,
        fp.minor_axis_m,
        fp.rotation_bearing_deg,
        fp.origin_shift_m,
        fp.area_m2,
    ] {
        hasher.update(&v.to_bits().to_le_bytes());
    }

    for c in &result.contributions {
        hasher.update(c.county_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(&c.population.to_le_bytes());
        hasher.update(&c.fraction.to_bits().to_le_bytes());
        hasher.update(&c.contributing_population.to_le_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

fn hash_ring_normalized(hasher: &mut Hasher, ring: &LineString) {
    // le dernier point d'un anneau fermé répète le premier
    let len = if ring.0.len() > 1 && ring.0.first() == ring.0.last() {
        ring.0.len() - 1
    } else {
        ring.0.len()
    };

    if len == 0 {
        return;
    }

    let min_idx = (0..len)
        .min_by(|&a, &b| {
            let ca = &ring.0[a];
            let cb = &ring.0[b];
            ca.x.partial_cmp(&cb.x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| ca.y.partial_cmp(&cb.y).unwrap_or(std::cmp::Ordering::Equal))
        })
        .unwrap_or(0);

    for i in 0..len {
        hash_coord(hasher, ring.0[(min_idx + i) % len]);
    }
}

/// Arrondi à 1e-6 degré (~10 cm)
fn hash_coord(hasher: &mut Hasher, coord: Coord) {
    let x = (coord.x * 1_000_000.0).round() as i64;
    let y = (coord.y * 1_000_000.0).round() as i64;
    hasher.update(&x.to_le_bytes());
    hasher.update(&y.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use county_data::{Shape, Wgs84};
    use geo::polygon;

    fn county(id: &str, population: u64, start_shifted: bool) -> County {
        let poly = if start_shifted {
            polygon![(x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]
        } else {
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)]
        };
        County {
            id: id.to_string(),
            state: "State".to_string(),
            name: "Name".to_string(),
            boundary: Shape::<Wgs84>::from_polygon(poly),
            population,
        }
    }

    #[test]
    fn test_ring_start_does_not_matter() {
        let a = county("06019", 10, false);
        let b = county("06019", 10, true);
        assert_eq!(
            geometry_hash(a.boundary.as_multi_polygon()),
            geometry_hash(b.boundary.as_multi_polygon())
        );
        assert_eq!(dataset_fingerprint([&a]), dataset_fingerprint([&b]));
    }

    #[test]
    fn test_fingerprint_sensitive_to_population_and_id() {
        let base = dataset_fingerprint([&county("06019", 10, false)]);
        assert_eq!(base.len(), 64);
        assert_ne!(base, dataset_fingerprint([&county("06019", 11, false)]));
        assert_ne!(base, dataset_fingerprint([&county("06029", 10, false)]));
    }
}
