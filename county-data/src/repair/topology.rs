//! Validité topologique entre anneaux et entre polygones
//!
//! Les anneaux sont déjà simples ; on vérifie ici que chaque trou est dans
//! son extérieur et que les parties d'un multipolygone ne se recouvrent pas.

use geo::{BoundingRect, Contains, LineString, Polygon, Relate};
use rstar::{RTree, RTreeObject, AABB};

use crate::error::GeometryError;

struct Part {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for Part {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Un trou doit être contenu dans l'extérieur (contact ponctuel toléré)
pub fn check_hole(shell: &Polygon<f64>, hole: &LineString<f64>) -> Result<(), GeometryError> {
    if shell.contains(hole) {
        return Ok(());
    }
    let at = hole.0.first().copied().unwrap_or_default();
    Err(GeometryError::HoleOutsideShell { x: at.x, y: at.y })
}

/// Les intérieurs de deux parties ne doivent jamais se couper
///
/// Les paires candidates viennent d'un R-tree sur les emprises ; seules
/// celles-ci passent par la matrice DE-9IM.
pub fn check_parts_disjoint(polygons: &[Polygon<f64>]) -> Result<(), GeometryError> {
    if polygons.len() < 2 {
        return Ok(());
    }

    let parts: Vec<Part> = polygons
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            p.bounding_rect().map(|r| Part {
                index,
                envelope: AABB::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y]),
            })
        })
        .collect();
    let tree = RTree::bulk_load(parts);

    for part in tree.iter() {
        for other in tree.locate_in_envelope_intersecting(&part.envelope) {
            if other.index <= part.index {
                continue;
            }
            let matrix = polygons[part.index].relate(&polygons[other.index]);
            if matrix.is_intersects() && !matrix.is_touches() {
                return Err(GeometryError::OverlappingParts {
                    first: part.index,
                    second: other.index,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_hole_inside_and_touching() {
        let shell = square(0.0, 0.0, 10.0);
        let inside = LineString::from(vec![(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 2.0)]);
        // sommet du trou posé sur le bord extérieur
        let touching = LineString::from(vec![(0.0, 5.0), (3.0, 4.0), (3.0, 6.0), (0.0, 5.0)]);
        assert!(check_hole(&shell, &inside).is_ok());
        assert!(check_hole(&shell, &touching).is_ok());
    }

    #[test]
    fn test_hole_outside_or_crossing() {
        let shell = square(0.0, 0.0, 10.0);
        let outside = LineString::from(vec![(20.0, 20.0), (22.0, 20.0), (22.0, 22.0), (20.0, 20.0)]);
        let crossing = LineString::from(vec![(8.0, 2.0), (12.0, 2.0), (12.0, 4.0), (8.0, 2.0)]);
        assert!(matches!(
            check_hole(&shell, &outside),
            Err(GeometryError::HoleOutsideShell { x, y }) if x == 20.0 && y == 20.0
        ));
        assert!(check_hole(&shell, &crossing).is_err());
    }

    #[test]
    fn test_disjoint_and_edge_sharing_parts() {
        let parts = vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0), square(5.0, 5.0, 1.0)];
        assert!(check_parts_disjoint(&parts).is_ok());
    }

    #[test]
    fn test_duplicated_part_is_rejected() {
        let parts = vec![square(3.0, 3.0, 1.0), square(0.0, 0.0, 1.0), square(0.0, 0.0, 1.0)];
        assert_eq!(
            check_parts_disjoint(&parts),
            Err(GeometryError::OverlappingParts { first: 1, second: 2 })
        );
    }

    #[test]
    fn test_nested_part_is_rejected() {
        let parts = vec![square(0.0, 0.0, 10.0), square(2.0, 2.0, 1.0)];
        assert!(matches!(
            check_parts_disjoint(&parts),
            Err(GeometryError::OverlappingParts { .. })
        ));
    }
}
