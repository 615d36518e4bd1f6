//! Parser de la source des contours de comtés
//!
//! Une ligne par comté : identifiant, état, nom, géométrie. Les lignes
//! inexploitables sont écartées avec un `LoadWarning`, le reste du fichier
//! continue d'être lu.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::crs::ToGeographic;
use crate::error::{DataLoadError, LoadWarning};
use crate::filter::ExclusionSet;
use crate::parser::{column_index, geometry, normalize_id};
use crate::types::{ColumnNames, CountyRow, LoadStats};

const SOURCE: &str = "counties";

/// Parse la source des contours
pub fn parse<R>(
    text: &str,
    columns: &ColumnNames,
    exclusions: &ExclusionSet,
    reprojector: &R,
    warnings: &mut Vec<LoadWarning>,
    stats: &mut LoadStats,
) -> Result<Vec<CountyRow>, DataLoadError>
where
    R: ToGeographic + ?Sized,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataLoadError::csv(SOURCE, e))?
        .clone();
    let id_col = column_index(&headers, &columns.county_id, SOURCE)?;
    let state_col = column_index(&headers, &columns.state, SOURCE)?;
    let name_col = column_index(&headers, &columns.county_name, SOURCE)?;
    let geom_col = column_index(&headers, &columns.geometry, SOURCE)?;

    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataLoadError::csv(SOURCE, e))?;
        stats.county_rows += 1;
        // ligne 1 = en-tête
        let row = index + 2;

        let raw_id = record.get(id_col).unwrap_or_default();
        let Some(id) = normalize_id(raw_id) else {
            warnings.push(LoadWarning::InvalidId {
                source_name: SOURCE.to_string(),
                row,
                value: raw_id.to_string(),
            });
            continue;
        };

        let state = record.get(state_col).unwrap_or_default().trim().to_string();
        if exclusions.contains(&state) {
            debug!(county_id = %id, state = %state, "County excluded");
            stats.excluded += 1;
            warnings.push(LoadWarning::Excluded {
                county_id: id,
                state,
            });
            continue;
        }

        if !seen.insert(id.clone()) {
            warn!(county_id = %id, "Duplicate county id, keeping first row");
            stats.duplicate_ids += 1;
            warnings.push(LoadWarning::DuplicateId {
                county_id: id,
                source_name: SOURCE.to_string(),
            });
            continue;
        }

        let geometry_text = record.get(geom_col).unwrap_or_default();
        if geometry_text.trim().is_empty() {
            warn!(county_id = %id, "County has no geometry, skipping");
            stats.malformed_geometries += 1;
            warnings.push(LoadWarning::malformed(&id, "missing geometry"));
            continue;
        }

        match geometry::decode_boundary(geometry_text, reprojector) {
            Ok(boundary) => rows.push(CountyRow {
                id,
                state,
                name: record.get(name_col).unwrap_or_default().trim().to_string(),
                boundary,
            }),
            Err(e) => {
                warn!(county_id = %id, error = %e, "Malformed county geometry, skipping");
                stats.malformed_geometries += 1;
                warnings.push(LoadWarning::malformed(&id, e.to_string()));
            }
        }
    }

    Ok(rows)
}
