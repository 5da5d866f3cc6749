use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::classify::Classification;
use crate::data::model::Metric;

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Inputs, outputs and schema assumptions of one pipeline run.
///
/// Every field has a default, so a YAML file only needs the keys it changes:
///
/// ```yaml
/// emissions_path: data/CO2 emissions.xlsx
/// participation_path: data/GVCpt_WIOD2016.csv
/// output_dir: out
/// year_min: 2005
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub emissions_path: PathBuf,
    pub participation_path: PathBuf,
    pub output_dir: PathBuf,
    /// File name inside `output_dir`; the extension picks the format.
    pub output_file: String,
    /// Countries whose emissions sheets are read.
    pub countries: Vec<String>,
    pub year_min: i32,
    pub year_max: i32,
    /// Detailed sectors per country sheet (C01..Cnn).
    pub industry_count: usize,
    /// Header names recognised as an industry label column in a sheet.
    pub industry_columns: Vec<String>,
    /// Region codes dropped from the participation table.
    pub excluded_regions: Vec<String>,
    /// Sector labels kept verbatim as industry instead of truncated.
    pub aggregate_sectors: Vec<String>,
}

pub const DEFAULT_COUNTRIES: [&str; 42] = [
    "AUS", "AUT", "BEL", "BGR", "BRA", "CAN", "CHE", "CHN", "CYP", "CZE", "DEU", "DNK", "ESP",
    "EST", "FIN", "FRA", "GBR", "GRC", "HRV", "HUN", "IDN", "IND", "IRL", "ITA", "JPN", "KOR",
    "LTU", "LUX", "LVA", "MEX", "MLT", "NOR", "POL", "PRT", "ROU", "RUS", "SVK", "SVN", "SWE",
    "TUR", "TWN", "USA",
];

pub const DEFAULT_AGGREGATE_SECTORS: [&str; 5] = [
    "Total",
    "goods",
    "manufacture",
    "all service",
    "services related to production",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            emissions_path: PathBuf::from("data/CO2 emissions.xlsx"),
            participation_path: PathBuf::from("data/GVCpt_WIOD2016.csv"),
            output_dir: PathBuf::from("data"),
            output_file: "df.xlsx".to_string(),
            countries: strings(&DEFAULT_COUNTRIES),
            year_min: 2000,
            year_max: 2014,
            industry_count: 56,
            industry_columns: strings(&["Code", "Industry", "Sector", "industry", "sector"]),
            // NLD has no emissions data; ROW is the rest-of-world aggregate.
            excluded_regions: strings(&["NLD", "ROW"]),
            aggregate_sectors: strings(&DEFAULT_AGGREGATE_SECTORS),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, else use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.year_min..=self.year_max
    }

    pub fn validate(&self) -> Result<()> {
        if self.year_min > self.year_max {
            anyhow::bail!(
                "year_min ({}) is after year_max ({})",
                self.year_min,
                self.year_max
            );
        }
        if self.industry_count == 0 || self.industry_count > 99 {
            anyhow::bail!("industry_count must be in 1..=99, got {}", self.industry_count);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Presentation configuration
// ---------------------------------------------------------------------------

/// Chart annotations for the dashboard. Kept apart from the pipeline: none
/// of it changes the merged table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Countries labelled on the industry-level scatters, per metric and
    /// classification.
    pub highlights: BTreeMap<Metric, BTreeMap<Classification, Vec<String>>>,
    /// Countries drawn on the forward/backward trend figure.
    pub trend_countries: Vec<String>,
    /// Panels of the country-sector figures.
    pub sector_panels: Vec<SectorPanel>,
    /// Panels of the simple/complex country-sector figure.
    pub complexity_panels: Vec<SectorPanel>,
    /// Default year of the exploratory figures.
    pub figure_year: i32,
}

/// One panel of a country-sector scatter: the industries averaged and the
/// countries labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPanel {
    pub title: String,
    pub industries: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl SectorPanel {
    fn new(title: &str, industries: &[&str], labels: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            industries: strings(industries),
            labels: strings(labels),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        use Classification::*;

        let base = |service: &[&str]| {
            BTreeMap::from([
                (Agriculture, strings(&["CHN", "USA", "IND"])),
                (Service, strings(service)),
                (Manufacturing, strings(&["CHN", "USA", "JPN"])),
                (Mining, strings(&["USA", "CHN", "RUS"])),
            ])
        };
        let highlights = BTreeMap::from([
            (Metric::Forward, base(&["USA", "CHN", "LUX"])),
            (Metric::Backward, base(&["USA", "CHN", "RUS"])),
            (Metric::GvcSimple, base(&["USA", "CHN", "RUS", "JPN"])),
            (Metric::GvcComplex, base(&["USA", "CHN", "RUS", "JPN"])),
        ]);

        Self {
            highlights,
            trend_countries: strings(&["USA", "CHN", "JPN", "RUS"]),
            sector_panels: vec![
                SectorPanel::new("Manufacture", &["manufacture"], &["IND", "DEU", "JPN"]),
                SectorPanel::new("Agriculture", &["C01", "C02", "C03"], &[]),
                SectorPanel::new("All service", &["all service"], &[]),
                SectorPanel::new("Mining", &["C04"], &["JPN", "RUS"]),
            ],
            complexity_panels: vec![
                SectorPanel::new("Manufacture", &["manufacture"], &["CHN", "USA", "RUS", "BEL"]),
                SectorPanel::new("Agriculture", &["C01", "C02", "C03"], &["IND", "CAN"]),
                SectorPanel::new("All service", &["all service"], &[]),
                SectorPanel::new("Mining", &["C04"], &["USA"]),
            ],
            figure_year: 2014,
        }
    }
}

impl PresentationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading presentation config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing presentation config {}", path.display()))
    }

    /// Countries to label for a metric/classification pair; empty when the
    /// pair is not configured.
    pub fn highlight_countries(&self, metric: Metric, class: Classification) -> &[String] {
        self.highlights
            .get(&metric)
            .and_then(|by_class| by_class.get(&class))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
