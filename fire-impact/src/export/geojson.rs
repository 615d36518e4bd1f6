//! Export d'un résultat d'impact en GeoJSON avec geozero (streaming)
//!
//! Une FeatureCollection en EPSG:4326 : le contour de l'empreinte, le point
//! d'éclosion, puis chaque comté touché avec sa part et sa contribution.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, Point};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use serde_json::{json, Value};

use crate::dataset::AreaDataset;
use crate::impact::ImpactResult;

/// Écrit le résultat dans un fichier propre à la requête
pub fn export_impact_geojson(result: &ImpactResult, dataset: &AreaDataset, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_impact_geojson(&mut writer, result, dataset)?;
    writer.flush()?;
    Ok(())
}

/// Écrit la FeatureCollection dans `writer`
pub fn write_impact_geojson<W: Write>(writer: &mut W, result: &ImpactResult, dataset: &AreaDataset) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::4326"}}}},"features":["#
    )?;

    let fp = &result.footprint;
    let mut properties = serde_json::to_value(fp)?;
    if let Value::Object(map) = &mut properties {
        map.insert("kind".to_string(), json!("footprint"));
        map.insert("total_population".to_string(), json!(result.total_population));
        map.insert("estimated_population".to_string(), json!(result.estimated_population));
    }
    write_feature(
        writer,
        "footprint",
        &Geometry::MultiPolygon(fp.outline.as_multi_polygon().clone()),
        &properties,
    )?;

    write!(writer, ",")?;
    write_feature(
        writer,
        "origin",
        &Geometry::Point(Point::new(fp.origin_longitude, fp.origin_latitude)),
        &json!({ "kind": "origin" }),
    )?;

    for c in &result.contributions {
        let Some(county) = dataset.get(&c.county_id) else {
            continue;
        };
        write!(writer, ",")?;
        write_feature(
            writer,
            &c.county_id,
            &Geometry::MultiPolygon(county.county.boundary.as_multi_polygon().clone()),
            &json!({
                "kind": "county",
                "county_id": c.county_id,
                "state": c.state,
                "county_name": c.county_name,
                "population": c.population,
                "fraction": c.fraction,
                "heat": c.fraction.clamp(0.0, 1.0),
                "affected_share_percent": c.affected_share_percent(),
                "contributing_population": c.contributing_population,
            }),
        )?;
    }

    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit une feature : géométrie via geozero, propriétés via serde_json
fn write_feature<W: Write>(writer: &mut W, id: &str, geometry: &Geometry<f64>, properties: &Value) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","id":"#)?;
    serde_json::to_writer(&mut *writer, id)?;

    write!(writer, r#","geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, properties)?;
    write!(writer, "}}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use county_data::{County, Shape, Wgs84};
    use geo::polygon;

    use crate::config::Config;
    use crate::service::ImpactService;

    fn service() -> ImpactService {
        let dataset = AreaDataset::from_counties(vec![County {
            id: "06019".to_string(),
            state: "California".to_string(),
            name: "Fresno \"Central\"".to_string(),
            boundary: Shape::<Wgs84>::from_polygon(polygon![
                (x: -120.0, y: 36.0),
                (x: -119.0, y: 36.0),
                (x: -119.0, y: 37.0),
                (x: -120.0, y: 37.0),
                (x: -120.0, y: 36.0),
            ]),
            population: 1_000_000,
        }])
        .unwrap();
        ImpactService::new(Arc::new(dataset), Config::default()).unwrap()
    }

    #[test]
    fn test_feature_collection_is_valid_geojson() {
        let s = service();
        let result = s.compute_impact(36.7783, -119.4179, 5.0, 30.0, 245.0).unwrap();

        let mut buffer = Vec::new();
        write_impact_geojson(&mut buffer, &result, s.dataset()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let parsed: geojson::GeoJson = text.parse().unwrap();
        let geojson::GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(fc.features.len(), 3);

        let county = &fc.features[2];
        let props = county.properties.as_ref().unwrap();
        assert_eq!(props["county_id"], "06019");
        assert_eq!(props["county_name"], "Fresno \"Central\"");
        assert!(props["heat"].as_f64().unwrap() > 0.0);
        assert_eq!(
            props["contributing_population"].as_u64().unwrap(),
            result.contributions[0].contributing_population
        );

        let footprint = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(footprint["kind"], "footprint");
        assert_eq!(footprint["rotation_bearing_deg"], 65.0);
    }

    #[test]
    fn test_export_to_file() {
        let s = service();
        let result = s.compute_impact(36.7783, -119.4179, 5.0, 0.0, 0.0).unwrap();

        let output_path = std::env::temp_dir().join("fire_impact_test_export.geojson");
        export_impact_geojson(&result, s.dataset(), &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains("EPSG::4326"));
        assert!(content.contains(r#""id":"06019""#));

        std::fs::remove_file(output_path).ok();
    }
}
