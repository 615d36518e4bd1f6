//! Parser de la source de population

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{DataLoadError, LoadWarning};
use crate::parser::{column_index, normalize_id};
use crate::types::{ColumnNames, LoadStats};

const SOURCE: &str = "population";

/// Valeur de population lue dans une cellule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Count {
    Value(u64),
    Negative(i64),
    Invalid,
}

/// Parse la source de population en une table `id -> population`
///
/// Une population négative rend tout le jeu de données suspect : erreur fatale.
pub fn parse(
    text: &str,
    columns: &ColumnNames,
    warnings: &mut Vec<LoadWarning>,
    stats: &mut LoadStats,
) -> Result<BTreeMap<String, u64>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataLoadError::csv(SOURCE, e))?
        .clone();
    let id_col = column_index(&headers, &columns.population_id, SOURCE)?;
    let pop_col = column_index(&headers, &columns.population, SOURCE)?;

    let mut table = BTreeMap::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataLoadError::csv(SOURCE, e))?;
        stats.population_rows += 1;

        let raw_id = record.get(id_col).unwrap_or_default();
        let Some(id) = normalize_id(raw_id) else {
            warnings.push(LoadWarning::InvalidId {
                source_name: SOURCE.to_string(),
                row: index + 2,
                value: raw_id.to_string(),
            });
            continue;
        };

        let raw = record.get(pop_col).unwrap_or_default();
        let value = match parse_count(raw) {
            Count::Value(v) => v,
            Count::Negative(value) => {
                return Err(DataLoadError::NegativePopulation {
                    county_id: id,
                    value,
                })
            }
            Count::Invalid => {
                warnings.push(LoadWarning::InvalidPopulation {
                    county_id: id,
                    value: raw.to_string(),
                });
                continue;
            }
        };

        if table.contains_key(&id) {
            warn!(county_id = %id, "Duplicate population row, keeping first");
            stats.duplicate_ids += 1;
            warnings.push(LoadWarning::DuplicateId {
                county_id: id,
                source_name: SOURCE.to_string(),
            });
            continue;
        }
        table.insert(id, value);
    }

    Ok(table)
}

/// Lit un effectif : séparateurs de milliers tolérés, flottants entiers acceptés
fn parse_count(raw: &str) -> Count {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Count::Invalid;
    }

    if let Ok(v) = cleaned.parse::<i64>() {
        return classify(v);
    }

    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => classify(f as i64),
        _ => Count::Invalid,
    }
}

fn classify(v: i64) -> Count {
    if v < 0 {
        Count::Negative(v)
    } else {
        Count::Value(v as u64)
    }
}
