//! Réparation et validation des contours de comtés

pub mod ring;
pub mod simple;
pub mod topology;

use geo::{MultiPolygon, Polygon};
use tracing::debug;

use crate::error::GeometryError;

/// Nettoie chaque polygone d'un contour
///
/// - anneau extérieur irréparable : le polygone est abandonné
/// - trou irréparable : le trou est abandonné
/// - anneau qui se recoupe, trou hors de son extérieur ou parties qui se
///   recouvrent : tout le contour est refusé
///
/// Retourne `GeometryError::Empty` si plus aucun polygone ne subsiste.
pub fn clean_boundary(mp: MultiPolygon<f64>) -> Result<MultiPolygon<f64>, GeometryError> {
    let total = mp.0.len();
    let mut polygons = Vec::with_capacity(total);

    for poly in mp {
        let (exterior, interiors) = poly.into_inner();

        let exterior = match ring::clean_ring(&exterior) {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "Dropping polygon with unusable exterior ring");
                continue;
            }
        };
        simple::check_simple(&exterior)?;
        let shell = Polygon::new(exterior, vec![]);

        let mut holes = Vec::with_capacity(interiors.len());
        for hole in &interiors {
            match ring::clean_ring(hole) {
                Ok(r) => {
                    simple::check_simple(&r)?;
                    topology::check_hole(&shell, &r)?;
                    holes.push(r);
                }
                Err(e) => debug!(error = %e, "Dropping unusable interior ring"),
            }
        }

        let (exterior, _) = shell.into_inner();
        polygons.push(Polygon::new(exterior, holes));
    }

    if polygons.is_empty() {
        return Err(GeometryError::Empty(format!("{} polygon(s) in input", total)));
    }
    topology::check_parts_disjoint(&polygons)?;

    Ok(MultiPolygon::new(polygons))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString};

    #[test]
    fn test_keeps_valid_polygon_with_hole() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 4.0, y: 2.0), (x: 4.0, y: 4.0), (x: 2.0, y: 2.0)]],
        );
        let cleaned = clean_boundary(MultiPolygon::new(vec![poly])).unwrap();
        assert_eq!(cleaned.0.len(), 1);
        assert_eq!(cleaned.0[0].interiors().len(), 1);
    }

    #[test]
    fn test_drops_degenerate_parts() {
        let good = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let flat = Polygon::new(
            LineString::from(vec![(5.0, 5.0), (6.0, 5.0), (7.0, 5.0), (5.0, 5.0)]),
            vec![],
        );
        let cleaned = clean_boundary(MultiPolygon::new(vec![good, flat])).unwrap();
        assert_eq!(cleaned.0.len(), 1);
    }

    #[test]
    fn test_all_degenerate_is_empty() {
        let flat = Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]), vec![]);
        assert!(matches!(
            clean_boundary(MultiPolygon::new(vec![flat])),
            Err(GeometryError::Empty(_))
        ));
    }

    #[test]
    fn test_duplicated_part_rejects_boundary() {
        let part = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)];
        assert!(matches!(
            clean_boundary(MultiPolygon::new(vec![part.clone(), part])),
            Err(GeometryError::OverlappingParts { first: 0, second: 1 })
        ));
    }

    #[test]
    fn test_hole_outside_exterior_rejects_boundary() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 20.0, y: 20.0), (x: 24.0, y: 20.0), (x: 24.0, y: 24.0), (x: 20.0, y: 20.0)]],
        );
        assert!(matches!(
            clean_boundary(MultiPolygon::new(vec![poly])),
            Err(GeometryError::HoleOutsideShell { .. })
        ));
    }

    #[test]
    fn test_separate_islands_are_kept() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let b = polygon![(x: 3.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 1.0), (x: 3.0, y: 0.0)];
        assert_eq!(clean_boundary(MultiPolygon::new(vec![a, b])).unwrap().0.len(), 2);
    }

    #[test]
    fn test_self_intersection_rejects_boundary() {
        let bowtie = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)];
        assert!(matches!(
            clean_boundary(MultiPolygon::new(vec![bowtie])),
            Err(GeometryError::SelfIntersection { .. })
        ));
    }
}
