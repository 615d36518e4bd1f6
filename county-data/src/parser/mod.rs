//! Parsers des deux sources tabulaires

pub mod counties;
pub mod geometry;
pub mod population;
pub mod text;

use std::sync::OnceLock;

use regex::Regex;

use crate::DataLoadError;

/// Normalise un identifiant de comté en code FIPS à 5 chiffres
///
/// Accepte les identifiants numériques sans zéros de tête (`6019` -> `06019`)
/// et ceux écrits comme des flottants par un tableur (`6019.0`).
pub fn normalize_id(raw: &str) -> Option<String> {
    static ID: OnceLock<Regex> = OnceLock::new();
    let re = ID.get_or_init(|| Regex::new(r"^\s*(\d{1,5})(?:\.0+)?\s*$").expect("valid regex"));

    let digits = re.captures(raw)?.get(1)?.as_str();
    Some(format!("{:0>5}", digits))
}

/// Retrouve l'index d'une colonne (insensible à la casse et aux espaces)
pub(crate) fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    source_name: &str,
) -> Result<usize, DataLoadError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column.trim()))
        .ok_or_else(|| DataLoadError::missing_column(source_name, column))
}
