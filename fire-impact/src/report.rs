//! Rapport de chargement du jeu de données
//!
//! Les lignes écartées au chargement ne bloquent pas le démarrage ; ce rapport
//! les rend visibles (console ou JSON).

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use county_data::{DataLoadError, LoadStats, LoadWarning};

/// Statut global du chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    /// Toutes les lignes retenues
    Success,
    /// Jeu utilisable, certaines lignes écartées
    PartialSuccess,
    /// Aucun jeu utilisable
    Failed,
}

/// Anomalie d'une ligne
#[derive(Debug, Clone, Serialize)]
pub struct ReportWarning {
    /// Catégorie (`malformed_geometry`, `duplicate_id`, ...)
    pub kind: String,
    pub county_id: Option<String>,
    pub message: String,
}

/// Rapport complet de chargement
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub counties_source: String,
    pub population_source: String,
    pub source_epsg: u32,
    pub duration_secs: f64,
    pub status: LoadStatus,

    // Compteurs
    pub county_rows: usize,
    pub population_rows: usize,
    pub counties_loaded: usize,
    pub malformed_geometries: usize,
    pub excluded: usize,
    pub duplicate_ids: usize,
    pub missing_population: usize,

    /// Anomalies par catégorie
    pub by_kind: BTreeMap<String, usize>,

    pub warnings: Vec<ReportWarning>,

    /// Erreur fatale, le cas échéant
    pub error: Option<String>,

    /// Empreinte blake3 du jeu retenu
    pub fingerprint: Option<String>,
}

impl Default for LoadReport {
    fn default() -> Self {
        Self {
            counties_source: String::new(),
            population_source: String::new(),
            source_epsg: 4326,
            duration_secs: 0.0,
            status: LoadStatus::Success,
            county_rows: 0,
            population_rows: 0,
            counties_loaded: 0,
            malformed_geometries: 0,
            excluded: 0,
            duplicate_ids: 0,
            missing_population: 0,
            by_kind: BTreeMap::new(),
            warnings: Vec::new(),
            error: None,
            fingerprint: None,
        }
    }
}

impl LoadReport {
    /// Crée un rapport pour une paire de sources
    pub fn new(counties_source: &Path, population_source: &Path, source_epsg: u32) -> Self {
        Self {
            counties_source: counties_source.display().to_string(),
            population_source: population_source.display().to_string(),
            source_epsg,
            ..Default::default()
        }
    }

    /// Reprend les compteurs du chargeur
    pub fn record_stats(&mut self, stats: &LoadStats) {
        self.county_rows = stats.county_rows;
        self.population_rows = stats.population_rows;
        self.counties_loaded = stats.joined;
        self.malformed_geometries = stats.malformed_geometries;
        self.excluded = stats.excluded;
        self.duplicate_ids = stats.duplicate_ids;
        self.missing_population = stats.missing_population;
    }

    /// Enregistre une anomalie
    pub fn record_warning(&mut self, warning: &LoadWarning) {
        *self.by_kind.entry(warning.kind().to_string()).or_default() += 1;
        self.warnings.push(ReportWarning {
            kind: warning.kind().to_string(),
            county_id: warning.county_id().map(str::to_string),
            message: warning.to_string(),
        });
    }

    /// Enregistre l'erreur fatale
    pub fn record_failure(&mut self, error: &DataLoadError) {
        self.error = Some(error.to_string());
    }

    pub fn set_fingerprint(&mut self, fingerprint: String) {
        self.fingerprint = Some(fingerprint);
    }

    /// Définit la durée du chargement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    ///
    /// Les exclusions de territoires sont attendues et ne dégradent pas le statut.
    pub fn finalize(&mut self) {
        let degraded = self.warnings.iter().any(|w| w.kind != "excluded");

        self.status = if self.error.is_some() || self.counties_loaded == 0 {
            LoadStatus::Failed
        } else if degraded {
            LoadStatus::PartialSuccess
        } else {
            LoadStatus::Success
        };
    }

    /// Nombre de lignes de contours écartées
    pub fn total_dropped(&self) -> usize {
        self.county_rows.saturating_sub(self.counties_loaded)
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LOAD REPORT - EPSG:{}", self.source_epsg);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Counties: {}", self.counties_source);
        println!("Population: {}", self.population_source);

        println!("\n--- SUMMARY ---");
        println!(
            "Rows: {} county, {} population",
            self.county_rows, self.population_rows
        );
        println!(
            "Counties: {} loaded, {} malformed, {} excluded, {} duplicates, {} without population",
            self.counties_loaded,
            self.malformed_geometries,
            self.excluded,
            self.duplicate_ids,
            self.missing_population
        );
        if let Some(fp) = &self.fingerprint {
            println!("Fingerprint: {}", fp);
        }

        if !self.by_kind.is_empty() {
            println!("\n--- BY KIND ---");
            for (kind, count) in &self.by_kind {
                println!("  {}: {}", kind, count);
            }
        }

        let notable: Vec<_> = self.warnings.iter().filter(|w| w.kind != "excluded").collect();
        if !notable.is_empty() {
            println!("\n--- WARNINGS ({}) ---", notable.len());
            for w in notable.iter().take(20) {
                println!("  [{}] {}", w.kind, w.message);
            }
            if notable.len() > 20 {
                println!("  ... and {} more", notable.len() - 20);
            }
        }

        if let Some(e) = &self.error {
            println!("\n--- ERROR ---");
            println!("  {}", e);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} counties loaded, {} malformed, {} without population",
            self.status, self.counties_loaded, self.malformed_geometries, self.missing_population
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_default() {
        let report = LoadReport::default();
        assert_eq!(report.status, LoadStatus::Success);
        assert_eq!(report.counties_loaded, 0);
        assert!(report.fingerprint.is_none());
    }

    #[test]
    fn test_excluded_only_is_success() {
        let mut report = LoadReport::new(Path::new("c.csv"), Path::new("p.csv"), 4326);
        report.record_stats(&LoadStats {
            county_rows: 3,
            joined: 2,
            excluded: 1,
            ..Default::default()
        });
        report.record_warning(&LoadWarning::Excluded {
            county_id: "15001".into(),
            state: "Hawaii".into(),
        });
        report.finalize();

        assert_eq!(report.status, LoadStatus::Success);
        assert_eq!(report.by_kind.get("excluded"), Some(&1));
        assert_eq!(report.total_dropped(), 1);
    }

    #[test]
    fn test_partial_success() {
        let mut report = LoadReport::default();
        report.record_stats(&LoadStats {
            county_rows: 3,
            joined: 2,
            malformed_geometries: 1,
            ..Default::default()
        });
        report.record_warning(&LoadWarning::malformed("06019", "self-intersecting ring"));
        report.finalize();

        assert_eq!(report.status, LoadStatus::PartialSuccess);
        assert_eq!(report.warnings[0].county_id.as_deref(), Some("06019"));
        assert!(report.summary().contains("1 malformed"));
    }

    #[test]
    fn test_failure() {
        let mut report = LoadReport::default();
        report.record_failure(&DataLoadError::EmptyJoin {
            county_rows: 3,
            population_rows: 0,
        });
        report.finalize();
        assert_eq!(report.status, LoadStatus::Failed);
        assert!(report.error.as_deref().unwrap_or_default().contains("no counties"));
    }

    #[test]
    fn test_saved_kinds_are_ordered() {
        let mut report = LoadReport::default();
        report.record_warning(&LoadWarning::MissingPopulation { county_id: "06997".into() });
        report.record_warning(&LoadWarning::malformed("06999", "bad ring"));
        report.record_warning(&LoadWarning::Excluded {
            county_id: "15003".into(),
            state: "Hawaii".into(),
        });

        let path = std::env::temp_dir().join("fire_impact_test_report_kinds.json");
        report.save_to_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let by_kind = &content[content.find(r#""by_kind""#).unwrap()..];
        let positions: Vec<usize> = [r#""excluded""#, r#""malformed_geometry""#, r#""missing_population""#]
            .iter()
            .map(|k| by_kind.find(k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", by_kind);
    }

    #[test]
    fn test_save_to_file() {
        let mut report = LoadReport::default();
        report.set_fingerprint("abc".to_string());
        report.set_duration(Duration::from_millis(1500));

        let path = std::env::temp_dir().join("fire_impact_test_load_report.json");
        report.save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""fingerprint": "abc""#));
        assert!(content.contains(r#""duration_secs": 1.5"#));

        std::fs::remove_file(path).ok();
    }
}
