//! Nettoyage des anneaux

use geo::{Coord, LineString};

use crate::error::GeometryError;

/// Tolérance de comparaison des sommets, en degrés (~0.1 mm)
const TOLERANCE: f64 = 1e-9;

/// Nettoie un anneau : sommets consécutifs dupliqués retirés, fermeture garantie
///
/// Un anneau non fermé est refermé sur son premier sommet (avec un log).
/// Un anneau de moins de trois sommets distincts ou d'aire nulle est refusé.
pub fn clean_ring(ring: &LineString<f64>) -> Result<LineString<f64>, GeometryError> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in ring.coords() {
        if !coords.last().is_some_and(|last| coords_equal(*last, *c)) {
            coords.push(*c);
        }
    }

    if coords.len() < 3 {
        return Err(GeometryError::Empty(format!(
            "ring has {} distinct vertices",
            coords.len()
        )));
    }

    let first = coords[0];
    let last = coords[coords.len() - 1];
    if coords_equal(first, last) {
        // Fermeture exacte, même si les deux sommets diffèrent sous la tolérance
        let n = coords.len();
        coords[n - 1] = first;
    } else {
        let gap = ((first.x - last.x).powi(2) + (first.y - last.y).powi(2)).sqrt();
        tracing::warn!(
            points = coords.len(),
            gap_degrees = gap,
            "Auto-closing unclosed ring"
        );
        coords.push(first);
    }

    if coords.len() < 4 {
        return Err(GeometryError::Empty(format!(
            "closed ring has {} vertices",
            coords.len()
        )));
    }

    if signed_area(&coords).abs() <= f64::EPSILON * TOLERANCE {
        return Err(GeometryError::Empty("ring has zero area".to_string()));
    }

    Ok(LineString::new(coords))
}

/// Aire signée d'un anneau fermé (formule du lacet)
pub(crate) fn signed_area(coords: &[Coord<f64>]) -> f64 {
    coords
        .windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

/// Compare deux coordonnées avec tolérance
pub(crate) fn coords_equal(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}
