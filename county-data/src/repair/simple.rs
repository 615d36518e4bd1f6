//! Détection des anneaux qui se recoupent
//!
//! Les segments sont indexés dans un R-tree ; seules les paires dont les
//! emprises se touchent sont testées.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString};
use rstar::{RTree, RTreeObject, AABB};

use crate::error::GeometryError;

struct Segment {
    index: usize,
    line: Line<f64>,
}

impl RTreeObject for Segment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let (a, b) = (self.line.start, self.line.end);
        AABB::from_corners([a.x.min(b.x), a.y.min(b.y)], [a.x.max(b.x), a.y.max(b.y)])
    }
}

/// Vérifie qu'un anneau fermé ne se recoupe pas
///
/// Deux segments consécutifs partagent un sommet : ce contact est permis,
/// un recouvrement colinéaire (aller-retour) ne l'est pas.
pub fn check_simple(ring: &LineString<f64>) -> Result<(), GeometryError> {
    let segments: Vec<Segment> = ring
        .lines()
        .enumerate()
        .map(|(index, line)| Segment { index, line })
        .collect();
    let count = segments.len();
    if count < 3 {
        return Ok(());
    }

    let tree = RTree::bulk_load(segments);

    for seg in tree.iter() {
        for other in tree.locate_in_envelope_intersecting(&seg.envelope()) {
            if other.index <= seg.index {
                continue;
            }
            let adjacent = other.index == seg.index + 1 || (seg.index == 0 && other.index == count - 1);

            match line_intersection(seg.line, other.line) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    if !adjacent {
                        return Err(crossing(intersection));
                    }
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    let overlap = (intersection.end.x - intersection.start.x).hypot(
                        intersection.end.y - intersection.start.y,
                    );
                    if !adjacent || overlap > 0.0 {
                        return Err(crossing(intersection.start));
                    }
                }
            }
        }
    }

    Ok(())
}

fn crossing(at: Coord<f64>) -> GeometryError {
    GeometryError::SelfIntersection { x: at.x, y: at.y }
}
