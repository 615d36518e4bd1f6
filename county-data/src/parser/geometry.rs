//! Décodage des géométries de comtés
//!
//! Encodages acceptés dans la colonne géométrie :
//! - WKT / EWKT (`POLYGON`, `MULTIPOLYGON`, préfixe `SRID=...;` toléré)
//! - WKB / EWKB en hexadécimal
//! - GeoJSON (objet `Geometry` ou `Feature`)

use std::sync::OnceLock;

use geo::{Coord, Geometry, MultiPolygon};
use geozero::ToGeo;
use regex::Regex;

use crate::crs::{map_multi_polygon, Shape, ToGeographic, Wgs84};
use crate::error::GeometryError;
use crate::repair;

/// Encodage détecté d'une géométrie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Wkt,
    HexWkb,
    GeoJson,
}

/// Devine l'encodage d'après les premiers caractères
pub fn sniff(text: &str) -> Option<Encoding> {
    static WKT: OnceLock<Regex> = OnceLock::new();
    static HEX: OnceLock<Regex> = OnceLock::new();

    let text = text.trim();
    if text.starts_with('{') {
        return Some(Encoding::GeoJson);
    }

    let wkt = WKT.get_or_init(|| {
        Regex::new(r"(?i)^(SRID=\d+;)?\s*(MULTI)?POLYGON\b").expect("valid regex")
    });
    if wkt.is_match(text) {
        return Some(Encoding::Wkt);
    }

    let hex = HEX.get_or_init(|| Regex::new(r"^(?:[0-9A-Fa-f]{2})+$").expect("valid regex"));
    if hex.is_match(text) {
        return Some(Encoding::HexWkb);
    }

    None
}

/// Décode, ramène en degrés géographiques et répare une géométrie de comté
pub fn decode_boundary<R>(text: &str, reprojector: &R) -> Result<Shape<Wgs84>, GeometryError>
where
    R: ToGeographic + ?Sized,
{
    let geometry = match sniff(text).ok_or(GeometryError::UnknownEncoding)? {
        Encoding::Wkt => decode_wkt(text.trim())?,
        Encoding::HexWkb => decode_hex_wkb(text.trim())?,
        Encoding::GeoJson => decode_geojson(text.trim())?,
    };

    let polygons = into_multi_polygon(geometry)?;
    let raw: Shape<Wgs84> = if reprojector.source_epsg() == 4326 {
        Shape::from_degrees(polygons)
    } else {
        let converted = map_multi_polygon(&polygons, |c| {
            let (lon, lat) = reprojector.to_geographic(c.x, c.y)?;
            Ok::<_, GeometryError>(Coord { x: lon, y: lat })
        })?;
        Shape::from_degrees(converted)
    };

    check_geographic_range(&raw)?;
    repair::clean_boundary(raw.into_multi_polygon()).map(Shape::from_degrees)
}

fn decode_wkt(text: &str) -> Result<Geometry<f64>, GeometryError> {
    // EWKT : le SRID éventuel est porté par la configuration, pas par la ligne
    let body = match text.find(';') {
        Some(pos) if text[..pos].to_ascii_uppercase().starts_with("SRID=") => &text[pos + 1..],
        _ => text,
    };
    geozero::wkt::Wkt(body.to_owned())
        .to_geo()
        .map_err(|e| GeometryError::Decode(e.to_string()))
}

fn decode_hex_wkb(text: &str) -> Result<Geometry<f64>, GeometryError> {
    let bytes = hex::decode(text).map_err(|e| GeometryError::Decode(e.to_string()))?;

    match geozero::wkb::Wkb(bytes.clone()).to_geo() {
        Ok(geometry) => Ok(geometry),
        // EWKB (PostGIS) : drapeau SRID dans le type
        Err(_) => geozero::wkb::Ewkb(bytes)
            .to_geo()
            .map_err(|e| GeometryError::Decode(e.to_string())),
    }
}

fn decode_geojson(text: &str) -> Result<Geometry<f64>, GeometryError> {
    let parsed: geojson::GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| GeometryError::Decode(e.to_string()))?;

    let geometry = match parsed {
        geojson::GeoJson::Geometry(g) => g,
        geojson::GeoJson::Feature(f) => f
            .geometry
            .ok_or_else(|| GeometryError::Decode("feature without geometry".to_string()))?,
        geojson::GeoJson::FeatureCollection(_) => {
            return Err(GeometryError::UnexpectedType("FeatureCollection"))
        }
    };

    Geometry::<f64>::try_from(geometry).map_err(|e| GeometryError::Decode(e.to_string()))
}

/// Ne garde que les surfaces ; une collection de polygones est aplatie
fn into_multi_polygon(geometry: Geometry<f64>) -> Result<MultiPolygon<f64>, GeometryError> {
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Ok(mp),
        Geometry::GeometryCollection(gc) => {
            let mut polygons = Vec::new();
            for g in gc.0 {
                polygons.extend(into_multi_polygon(g)?.0);
            }
            Ok(MultiPolygon::new(polygons))
        }
        Geometry::Rect(r) => Ok(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Ok(MultiPolygon::new(vec![t.to_polygon()])),
        other => Err(GeometryError::UnexpectedType(kind_name(&other))),
    }
}

fn kind_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        _ => "other",
    }
}

/// Refuse les coordonnées non finies ou hors (±180, ±90)
///
/// Attrape aussi les sources projetées déclarées à tort en EPSG:4326.
fn check_geographic_range(shape: &Shape<Wgs84>) -> Result<(), GeometryError> {
    for poly in shape.as_multi_polygon() {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for c in ring.coords() {
                let ok = c.x.is_finite()
                    && c.y.is_finite()
                    && (-180.0..=180.0).contains(&c.x)
                    && (-90.0..=90.0).contains(&c.y);
                if !ok {
                    return Err(GeometryError::OutOfRange { x: c.x, y: c.y });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::AlreadyGeographic;

    const SQUARE_WKT: &str = "POLYGON((-120 36, -119 36, -119 37, -120 37, -120 36))";

    #[test]
    fn test_sniff() {
        assert_eq!(sniff(SQUARE_WKT), Some(Encoding::Wkt));
        assert_eq!(sniff("  multipolygon (((0 0,1 0,1 1,0 0)))"), Some(Encoding::Wkt));
        assert_eq!(sniff("SRID=4326;POLYGON((0 0,1 0,1 1,0 0))"), Some(Encoding::Wkt));
        assert_eq!(sniff("0103000000"), Some(Encoding::HexWkb));
        assert_eq!(sniff(r#"{"type":"Polygon"}"#), Some(Encoding::GeoJson));
        assert_eq!(sniff("POINT(1 2)"), None);
        assert_eq!(sniff("not a geometry"), None);
    }

    #[test]
    fn test_decode_wkt_polygon() {
        let shape = decode_boundary(SQUARE_WKT, &AlreadyGeographic).unwrap();
        assert_eq!(shape.as_multi_polygon().0.len(), 1);
        let rect = shape.bounding_rect().unwrap();
        assert_eq!(rect.min().x, -120.0);
        assert_eq!(rect.max().y, 37.0);
    }

    #[test]
    fn test_decode_ewkt_prefix() {
        let text = format!("SRID=4326;{}", SQUARE_WKT);
        assert!(decode_boundary(&text, &AlreadyGeographic).is_ok());
    }

    #[test]
    fn test_decode_multipolygon() {
        let text = "MULTIPOLYGON(((-120 36,-119 36,-119 37,-120 36)),((-118 36,-117 36,-117 37,-118 36)))";
        let shape = decode_boundary(text, &AlreadyGeographic).unwrap();
        assert_eq!(shape.as_multi_polygon().0.len(), 2);
    }

    #[test]
    fn test_decode_geojson() {
        let text = r#"{"type":"Polygon","coordinates":[[[-120,36],[-119,36],[-119,37],[-120,37],[-120,36]]]}"#;
        let shape = decode_boundary(text, &AlreadyGeographic).unwrap();
        assert_eq!(shape.as_multi_polygon().0.len(), 1);
    }

    #[test]
    fn test_decode_hex_wkb() {
        // POLYGON((0 0,1 0,1 1,0 0)) en WKB little-endian
        let mut wkb = String::from("01030000000100000004000000");
        for (x, y) in [(0.0f64, 0.0f64), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)] {
            wkb.push_str(&hex::encode(x.to_le_bytes()));
            wkb.push_str(&hex::encode(y.to_le_bytes()));
        }
        let shape = decode_boundary(&wkb, &AlreadyGeographic).unwrap();
        assert_eq!(shape.as_multi_polygon().0[0].exterior().0.len(), 4);
    }

    #[test]
    fn test_reject_point_and_garbage() {
        assert_eq!(
            decode_boundary("POINT(1 2)", &AlreadyGeographic).unwrap_err(),
            GeometryError::UnknownEncoding
        );
        assert!(matches!(
            decode_boundary("POLYGON((0 0, 1", &AlreadyGeographic),
            Err(GeometryError::Decode(_))
        ));
    }

    #[test]
    fn test_reject_projected_coordinates() {
        let text = "POLYGON((-2000000 1500000,-1990000 1500000,-1990000 1510000,-2000000 1500000))";
        assert!(matches!(
            decode_boundary(text, &AlreadyGeographic),
            Err(GeometryError::OutOfRange { .. })
        ));
    }

    struct Shifted;

    impl ToGeographic for Shifted {
        fn source_epsg(&self) -> u32 {
            9999
        }

        fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), GeometryError> {
            Ok((x / 1000.0, y / 1000.0))
        }
    }

    #[test]
    fn test_reprojected_source() {
        let text = "POLYGON((-120000 36000,-119000 36000,-119000 37000,-120000 36000))";
        let shape = decode_boundary(text, &Shifted).unwrap();
        let rect = shape.bounding_rect().unwrap();
        assert!((rect.min().x + 120.0).abs() < 1e-9);
        assert!((rect.max().y - 37.0).abs() < 1e-9);
    }
}
