use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Result;

use gvc_emissions::config::{PresentationConfig, SectorPanel};
use gvc_emissions::data::aggregate::{
    classification_summary, country_means, country_metric, country_trend, linear_fit,
    nation_summary, rank_by_emissions, sector_means, ClassYear, CountryPoint, NationYear, Order,
    SectorPoint, TrendPoint,
};
use gvc_emissions::data::classify::Classification;
use gvc_emissions::data::geo::BoundarySet;
use gvc_emissions::data::loader::{load_boundaries, load_file};
use gvc_emissions::data::model::{MergedTable, Metric};

use crate::color::ColorMap;

/// Rows shown in each ranking table.
pub const RANK_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Geo,
    Nation,
    Industry,
    Explore,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Geo, Tab::Nation, Tab::Industry, Tab::Explore];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Geo => "Geo Plot",
            Tab::Nation => "Nation Level",
            Tab::Industry => "Industry Level",
            Tab::Explore => "Explore",
        }
    }
}

/// User inputs. Any change triggers [`AppState::refresh`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub geo_year: i32,
    pub nation_countries: [String; 4],
    pub nation_metric: Metric,
    pub industry_year: i32,
    pub industry_metric: Metric,
    pub figure_year: i32,
}

/// One country's series on the nation-level scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct NationSeries {
    pub country: String,
    pub points: Vec<[f64; 2]>,
    pub fit: Option<(f64, f64)>,
}

/// A labelled point on an industry-level scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoint {
    pub country: String,
    pub point: [f64; 2],
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub title: String,
    pub points: Vec<CountryPoint>,
    pub labels: Vec<String>,
}

/// Derived views cached between input changes.
#[derive(Debug, Clone, Default)]
pub struct Views {
    pub geo_values: HashMap<String, f64>,
    pub top: Vec<NationYear>,
    pub bottom: Vec<NationYear>,
    pub nation_series: Vec<NationSeries>,
    pub industry: BTreeMap<Classification, Vec<LabeledPoint>>,
    pub trend: Vec<TrendPoint>,
    pub sectors: Vec<SectorPoint>,
    pub linkage_panels: Vec<PanelView>,
    pub complexity_panels: Vec<PanelView>,
    pub gvc_by_country: HashMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded merged table (None until the user loads a file).
    pub table: Option<MergedTable>,
    pub nations: Vec<NationYear>,
    pub classes: Vec<ClassYear>,

    /// Member-state boundaries for the maps.
    pub boundaries: Option<BoundarySet>,

    pub presentation: PresentationConfig,
    pub tab: Tab,
    pub selections: Selections,
    pub views: Views,
    pub country_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PresentationConfig::default())
    }
}

impl AppState {
    pub fn new(presentation: PresentationConfig) -> Self {
        let figure_year = presentation.figure_year;
        Self {
            table: None,
            nations: Vec::new(),
            classes: Vec::new(),
            boundaries: None,
            presentation,
            tab: Tab::Geo,
            selections: Selections {
                geo_year: 2000,
                nation_countries: Default::default(),
                nation_metric: Metric::Forward,
                industry_year: 2000,
                industry_metric: Metric::Forward,
                figure_year,
            },
            views: Views::default(),
            country_colors: ColorMap::new(std::iter::empty()),
            status_message: None,
        }
    }

    /// Ingest a newly loaded table, reset selections and recompute views.
    pub fn set_table(&mut self, table: MergedTable) {
        self.nations = nation_summary(&table);
        self.classes = classification_summary(&table);
        self.country_colors = ColorMap::new(&table.countries);

        let first_year = table.years.first().copied().unwrap_or(2000);
        let s = &mut self.selections;
        s.geo_year = first_year;
        s.industry_year = first_year;
        if !table.years.contains(&s.figure_year) {
            s.figure_year = table.years.last().copied().unwrap_or(first_year);
        }
        // Defaults: the first four countries in table order.
        let mut seen: Vec<&str> = Vec::new();
        for r in &table.records {
            if !seen.contains(&r.country()) {
                seen.push(r.country());
                if seen.len() == 4 {
                    break;
                }
            }
        }
        let fallback = seen.first().copied().unwrap_or_default();
        for (i, slot) in s.nation_countries.iter_mut().enumerate() {
            *slot = seen.get(i).copied().unwrap_or(fallback).to_string();
        }

        self.table = Some(table);
        self.status_message = None;
        self.refresh();
    }

    pub fn load_table(&mut self, path: &Path) -> Result<()> {
        let table = load_file(path)?;
        log::info!(
            "Loaded {} rows from {} ({} countries)",
            table.len(),
            path.display(),
            table.countries.len()
        );
        self.set_table(table);
        Ok(())
    }

    pub fn load_boundaries(&mut self, path: &Path) -> Result<()> {
        let members = load_boundaries(path)?.member_states();
        log::info!("Using {} member-state boundaries", members.len());
        self.boundaries = Some(members);
        Ok(())
    }

    /// Record a failure in the status line and the log.
    pub fn report(&mut self, context: &str, err: anyhow::Error) {
        log::error!("{context}: {err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }

    /// Year range of the loaded table.
    pub fn year_bounds(&self) -> (i32, i32) {
        self.table
            .as_ref()
            .and_then(|t| Some((*t.years.first()?, *t.years.last()?)))
            .unwrap_or((2000, 2014))
    }

    /// Apply new selections; recompute views only when something changed.
    pub fn update_selections(&mut self, selections: Selections) {
        if selections != self.selections {
            self.selections = selections;
            self.refresh();
        }
    }

    /// Recompute every cached view from the table and current selections.
    pub fn refresh(&mut self) {
        let Some(table) = &self.table else {
            self.views = Views::default();
            return;
        };
        let s = &self.selections;
        let cfg = &self.presentation;

        let geo_values = self
            .nations
            .iter()
            .filter(|n| n.year == s.geo_year)
            .filter_map(|n| Some((n.country.clone(), n.ce?)))
            .collect();
        let top = rank_by_emissions(&self.nations, s.geo_year, RANK_SIZE, Order::Top)
            .into_iter()
            .cloned()
            .collect();
        let bottom = rank_by_emissions(&self.nations, s.geo_year, RANK_SIZE, Order::Bottom)
            .into_iter()
            .cloned()
            .collect();

        let mut nation_series: Vec<NationSeries> = Vec::new();
        for country in &s.nation_countries {
            if nation_series.iter().any(|n| &n.country == country) {
                continue;
            }
            let points: Vec<[f64; 2]> = self
                .nations
                .iter()
                .filter(|n| &n.country == country)
                .filter_map(|n| Some([n.metric(s.nation_metric)?, n.ce?]))
                .collect();
            let fit = linear_fit(&points);
            nation_series.push(NationSeries {
                country: country.clone(),
                points,
                fit,
            });
        }

        let mut industry: BTreeMap<Classification, Vec<LabeledPoint>> = BTreeMap::new();
        for c in self.classes.iter().filter(|c| c.year == s.industry_year) {
            let (Some(x), Some(y)) = (c.metric(s.industry_metric), c.ce) else {
                continue;
            };
            let highlighted = cfg
                .highlight_countries(s.industry_metric, c.classification)
                .contains(&c.country);
            industry
                .entry(c.classification)
                .or_default()
                .push(LabeledPoint {
                    country: c.country.clone(),
                    point: [x, y],
                    highlighted,
                });
        }

        let year_range = self.year_bounds();
        let panel_views = |panels: &[SectorPanel], x: Metric, y: Metric| -> Vec<PanelView> {
            panels
                .iter()
                .map(|p| PanelView {
                    title: p.title.clone(),
                    points: country_means(table, s.figure_year, &p.industries, x, y),
                    labels: p.labels.clone(),
                })
                .collect()
        };

        self.views = Views {
            geo_values,
            top,
            bottom,
            nation_series,
            industry,
            trend: country_trend(table, &cfg.trend_countries, year_range.0..=year_range.1),
            sectors: sector_means(table, s.figure_year),
            linkage_panels: panel_views(&cfg.sector_panels, Metric::Backward, Metric::Forward),
            complexity_panels: panel_views(
                &cfg.complexity_panels,
                Metric::GvcComplex,
                Metric::GvcSimple,
            ),
            gvc_by_country: country_metric(table, s.figure_year, Metric::Gvc)
                .into_iter()
                .collect(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gvc_emissions::data::model::{Linkages, MergedRecord, ParticipationRecord};

    fn record(year: i32, country: &str, industry: &str, f: f64, ce: Option<f64>) -> MergedRecord {
        let l = Linkages {
            forward: f,
            backward: f / 2.0,
            ..Linkages::default()
        };
        MergedRecord {
            participation: ParticipationRecord::new(year, country.into(), industry.into(), l),
            ce,
        }
    }

    fn table() -> MergedTable {
        let mut records = Vec::new();
        for year in [2013, 2014] {
            for (i, c) in ["CHN", "DEU", "JPN", "USA", "ZAF"].iter().enumerate() {
                let scale = (i + 1) as f64;
                records.push(record(year, c, "C01", 0.1 * scale, Some(scale * 10.0)));
                records.push(record(year, c, "C30", 0.2, Some(scale)));
                records.push(record(year, c, "Total", 0.3, None));
            }
        }
        MergedTable::from_records(records)
    }

    #[test]
    fn set_table_picks_defaults_and_builds_views() {
        let mut state = AppState::default();
        state.set_table(table());

        assert_eq!(state.selections.geo_year, 2013);
        assert_eq!(state.selections.figure_year, 2014);
        assert_eq!(
            state.selections.nation_countries,
            ["CHN", "DEU", "JPN", "USA"].map(String::from)
        );
        assert_eq!(state.views.top.len(), RANK_SIZE);
        assert_eq!(state.views.top[0].country, "ZAF");
        assert_eq!(state.views.nation_series.len(), 4);
        assert!(state.views.nation_series.iter().all(|s| s.points.len() == 2));
    }

    #[test]
    fn views_follow_selection_changes() {
        let mut state = AppState::default();
        state.set_table(table());
        let mut next = state.selections.clone();
        next.geo_year = 2014;
        next.nation_countries = ["USA", "USA", "USA", "USA"].map(String::from);
        state.update_selections(next);

        assert_eq!(state.selections.geo_year, 2014);
        assert_eq!(state.views.geo_values.get("ZAF"), Some(&55.0));
        assert_eq!(state.views.nation_series.len(), 1);
    }

    #[test]
    fn industry_views_group_by_classification() {
        let mut state = AppState::default();
        state.set_table(table());

        let views = &state.views.industry;
        assert_eq!(views[&Classification::Agriculture].len(), 5);
        assert_eq!(views[&Classification::Service].len(), 5);
        assert!(!views.contains_key(&Classification::Manufacturing));
        assert!(views[&Classification::Service]
            .iter()
            .all(|p| p.point[1] <= 5.0));
    }
}
