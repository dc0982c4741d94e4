use crate::error::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Scenario results file, or a glob pattern resolved to its latest match
    pub scenario_path: String,
    pub real_price_path: PathBuf,
    pub country_code: String,
    /// Regions whose load, wind and solar enter the residual load
    pub residual_load_regions: Vec<String>,
    pub polynomial_degree: usize,
    pub dispatch_week_start: NaiveDate,
    pub dispatch_week_end: NaiveDate,
    /// Hours shown in the zoomed price chart
    pub price_zoom_hours: usize,
    pub output_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub language: Language,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scenario_path: "results/scenario_nep_2014_*_DE.csv".to_string(),
            real_price_path: PathBuf::from("price_eex_day_ahead_2014.csv"),
            country_code: "DE".to_string(),
            residual_load_regions: vec!["DE".to_string(), "AT".to_string(), "LU".to_string()],
            polynomial_degree: 3,
            dispatch_week_start: NaiveDate::from_ymd_opt(2014, 1, 21).unwrap_or_default(),
            dispatch_week_end: NaiveDate::from_ymd_opt(2014, 1, 27).unwrap_or_default(),
            price_zoom_hours: 24 * 7 * 8,
            output_dir: PathBuf::from("results/charts"),
            chart_width: 1200,
            chart_height: 600,
            language: Language::De,
        }
    }
}

impl AnalysisConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    pub fn regions(&self) -> Vec<&str> {
        self.residual_load_regions.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = AnalysisConfig::default();
        assert_eq!(config.polynomial_degree, 3);
        assert_eq!(config.regions(), vec!["DE", "AT", "LU"]);
        assert_eq!(config.price_zoom_hours, 1344);
        assert_eq!(config.language, Language::De);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"country_code": "AT", "language": "en"}}"#).unwrap();

        let config = AnalysisConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.country_code, "AT");
        assert_eq!(config.language, Language::En);
        assert_eq!(config.polynomial_degree, 3);
        assert_eq!(
            config.dispatch_week_start,
            NaiveDate::from_ymd_opt(2014, 1, 21).unwrap()
        );
    }
}
