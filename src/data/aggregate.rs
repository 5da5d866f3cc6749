//! Read-only views derived from the merged table for the dashboard and the
//! exploratory figures. Nothing here mutates the table.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::classify::{is_detailed, Classification};
use super::filter::{filtered, PanelFilter};
use super::model::{MergedTable, Metric};

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

/// Running mean that ignores NaN.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, v: f64) {
        if !v.is_nan() {
            self.sum += v;
            self.n += 1;
        }
    }

    fn get(self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Running sum of present values; `None` if nothing was added.
#[derive(Debug, Clone, Copy, Default)]
struct Total {
    sum: f64,
    any: bool,
}

impl Total {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v.filter(|v| !v.is_nan()) {
            self.sum += v;
            self.any = true;
        }
    }

    fn get(self) -> Option<f64> {
        self.any.then_some(self.sum)
    }
}

// ---------------------------------------------------------------------------
// Nation level
// ---------------------------------------------------------------------------

/// One country in one year: detailed-sector averages and total emissions.
#[derive(Debug, Clone, PartialEq)]
pub struct NationYear {
    pub country: String,
    pub year: i32,
    /// Sum of CE over detailed sectors.
    pub ce: Option<f64>,
    pub average_f: Option<f64>,
    pub average_b: Option<f64>,
    pub average_gvc: Option<f64>,
    pub average_gvcs: Option<f64>,
    pub average_gvcc: Option<f64>,
}

impl NationYear {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Forward => self.average_f,
            Metric::Backward => self.average_b,
            Metric::Gvc => self.average_gvc,
            Metric::GvcSimple => self.average_gvcs,
            Metric::GvcComplex => self.average_gvcc,
            Metric::Emissions => self.ce,
            _ => None,
        }
    }
}

#[derive(Default)]
struct NationAcc {
    ce: Total,
    f: Mean,
    b: Mean,
    gvc: Mean,
    gvcs: Mean,
    gvcc: Mean,
}

/// Per (country, year) summary over detailed sectors, sorted by
/// (country, year).
pub fn nation_summary(table: &MergedTable) -> Vec<NationYear> {
    let mut groups: BTreeMap<(String, i32), NationAcc> = BTreeMap::new();
    for r in table.records.iter().filter(|r| is_detailed(r.industry())) {
        let acc = groups
            .entry((r.country().to_string(), r.year()))
            .or_default();
        let p = &r.participation;
        acc.ce.push(r.ce);
        acc.f.push(p.forward);
        acc.b.push(p.backward);
        acc.gvc.push(p.gvc);
        acc.gvcs.push(p.gvc_simple);
        acc.gvcc.push(p.gvc_complex);
    }
    groups
        .into_iter()
        .map(|((country, year), acc)| NationYear {
            country,
            year,
            ce: acc.ce.get(),
            average_f: acc.f.get(),
            average_b: acc.b.get(),
            average_gvc: acc.gvc.get(),
            average_gvcs: acc.gvcs.get(),
            average_gvcc: acc.gvcc.get(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Classification level
// ---------------------------------------------------------------------------

/// One country, year and sector classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassYear {
    pub country: String,
    pub year: i32,
    pub classification: Classification,
    pub forward: Option<f64>,
    pub backward: Option<f64>,
    pub gvc_simple: Option<f64>,
    pub gvc_complex: Option<f64>,
    pub ce: Option<f64>,
}

impl ClassYear {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Forward => self.forward,
            Metric::Backward => self.backward,
            Metric::GvcSimple => self.gvc_simple,
            Metric::GvcComplex => self.gvc_complex,
            Metric::Emissions => self.ce,
            _ => None,
        }
    }
}

#[derive(Default)]
struct ClassAcc {
    f: Mean,
    b: Mean,
    gvcs: Mean,
    gvcc: Mean,
    ce: Total,
}

/// Mean participation and summed CE per (country, year, classification).
pub fn classification_summary(table: &MergedTable) -> Vec<ClassYear> {
    let mut groups: BTreeMap<(String, i32, Classification), ClassAcc> = BTreeMap::new();
    for r in &table.records {
        let Some(class) = Classification::from_industry(r.industry()) else {
            continue;
        };
        let acc = groups
            .entry((r.country().to_string(), r.year(), class))
            .or_default();
        let p = &r.participation;
        acc.f.push(p.forward);
        acc.b.push(p.backward);
        acc.gvcs.push(p.gvc_simple);
        acc.gvcc.push(p.gvc_complex);
        acc.ce.push(r.ce);
    }
    groups
        .into_iter()
        .map(|((country, year, classification), acc)| ClassYear {
            country,
            year,
            classification,
            forward: acc.f.get(),
            backward: acc.b.get(),
            gvc_simple: acc.gvcs.get(),
            gvc_complex: acc.gvcc.get(),
            ce: acc.ce.get(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Highest CE first.
    Top,
    /// Lowest CE first.
    Bottom,
}

/// The `n` countries with the highest (or lowest) CE in `year`.
///
/// Rows without CE are left out. Equal CE values are ordered by country code.
pub fn rank_by_emissions(rows: &[NationYear], year: i32, n: usize, order: Order) -> Vec<&NationYear> {
    let mut ranked: Vec<(&NationYear, f64)> = rows
        .iter()
        .filter(|r| r.year == year)
        .filter_map(|r| r.ce.map(|ce| (r, ce)))
        .collect();
    ranked.sort_by(|(a, ca), (b, cb)| {
        let by_ce = match order {
            Order::Top => cb.total_cmp(ca),
            Order::Bottom => ca.total_cmp(cb),
        };
        by_ce.then_with(|| a.country.cmp(&b.country))
    });
    ranked.into_iter().take(n).map(|(r, _)| r).collect()
}

// ---------------------------------------------------------------------------
// Figure views
// ---------------------------------------------------------------------------

/// Mean forward and backward participation of a country in a year.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub country: String,
    pub year: i32,
    pub forward: f64,
    pub backward: f64,
}

/// Mean f and b per (country, year) over every industry row, for the
/// listed countries and years. Sorted by (country, year).
pub fn country_trend(
    table: &MergedTable,
    countries: &[String],
    years: std::ops::RangeInclusive<i32>,
) -> Vec<TrendPoint> {
    let filter = PanelFilter {
        years: Some(years.collect()),
        ..PanelFilter::default()
    }
    .with_countries(countries.iter().cloned());
    let mut groups: BTreeMap<(String, i32), (Mean, Mean)> = BTreeMap::new();
    for r in filtered(table, &filter) {
        let (f, b) = groups
            .entry((r.country().to_string(), r.year()))
            .or_default();
        f.push(r.participation.forward);
        b.push(r.participation.backward);
    }
    groups
        .into_iter()
        .filter_map(|((country, year), (f, b))| {
            Some(TrendPoint {
                country,
                year,
                forward: f.get()?,
                backward: b.get()?,
            })
        })
        .collect()
}

/// Cross-country mean linkage of one detailed sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorPoint {
    pub industry: String,
    pub classification: Classification,
    pub forward: f64,
    pub backward: f64,
}

/// Mean f and b per detailed sector in `year`, keeping only points inside
/// the unit square.
pub fn sector_means(table: &MergedTable, year: i32) -> Vec<SectorPoint> {
    let filter = PanelFilter::year(year);
    let mut groups: BTreeMap<&str, (Mean, Mean)> = BTreeMap::new();
    for r in filtered(table, &filter).filter(|r| is_detailed(r.industry())) {
        let (f, b) = groups.entry(r.industry()).or_default();
        f.push(r.participation.forward);
        b.push(r.participation.backward);
    }
    let unit = 0.0..=1.0;
    groups
        .into_iter()
        .filter_map(|(industry, (f, b))| {
            let (forward, backward) = (f.get()?, b.get()?);
            if !unit.contains(&forward) || !unit.contains(&backward) {
                return None;
            }
            Some(SectorPoint {
                industry: industry.to_string(),
                classification: Classification::from_industry(industry)?,
                forward,
                backward,
            })
        })
        .collect()
}

/// A country's mean of two metrics over an industry selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPoint {
    pub country: String,
    pub x: f64,
    pub y: f64,
}

/// Mean of `x` and `y` per country over rows of `year` whose industry is
/// listed. Sorted by country.
pub fn country_means(
    table: &MergedTable,
    year: i32,
    industries: &[String],
    x: Metric,
    y: Metric,
) -> Vec<CountryPoint> {
    let filter = PanelFilter::year(year).with_industries(industries.iter().cloned());
    let mut groups: BTreeMap<&str, (Mean, Mean)> = BTreeMap::new();
    for r in filtered(table, &filter) {
        let (mx, my) = groups.entry(r.country()).or_default();
        if let Some(v) = r.metric(x) {
            mx.push(v);
        }
        if let Some(v) = r.metric(y) {
            my.push(v);
        }
    }
    groups
        .into_iter()
        .filter_map(|(country, (mx, my))| {
            Some(CountryPoint {
                country: country.to_string(),
                x: mx.get()?,
                y: my.get()?,
            })
        })
        .collect()
}

/// Mean of a metric per country for one year over every industry row,
/// aggregates included; the input of the world and Europe maps.
pub fn country_metric(table: &MergedTable, year: i32, metric: Metric) -> BTreeMap<String, f64> {
    let filter = PanelFilter::year(year);
    let mut groups: BTreeMap<&str, Mean> = BTreeMap::new();
    for r in filtered(table, &filter) {
        if let Some(v) = r.metric(metric) {
            groups.entry(r.country()).or_default().push(v);
        }
    }
    groups
        .into_iter()
        .filter_map(|(c, m)| Some((c.to_string(), m.get()?)))
        .collect()
}

/// Least-squares line through `points` as `(slope, intercept)`.
///
/// Points with a non-finite coordinate are skipped. `None` for fewer than
/// two usable points or no spread in x.
pub fn linear_fit(points: &[[f64; 2]]) -> Option<(f64, f64)> {
    let usable: Vec<[f64; 2]> = points
        .iter()
        .copied()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect();
    if usable.len() < 2 {
        return None;
    }
    let n = usable.len() as f64;
    let mean_x = usable.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = usable.iter().map(|p| p[1]).sum::<f64>() / n;
    let sxx: f64 = usable.iter().map(|p| (p[0] - mean_x).powi(2)).sum();
    let sxy: f64 = usable
        .iter()
        .map(|p| (p[0] - mean_x) * (p[1] - mean_y))
        .sum();
    if sxx.partial_cmp(&0.0) != Some(Ordering::Greater) {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Linkages, MergedRecord, ParticipationRecord};

    fn row(year: i32, country: &str, industry: &str, f: f64, b: f64) -> MergedRecord {
        let l = Linkages {
            forward: f,
            backward: b,
            ..Linkages::default()
        };
        MergedRecord {
            participation: ParticipationRecord::new(year, country.into(), industry.into(), l),
            ce: None,
        }
    }

    #[test]
    fn country_metric_averages_all_rows_of_the_year() {
        let table = MergedTable::from_records(vec![
            row(2014, "USA", "C01", 0.1, 0.1),
            row(2014, "USA", "C02", 0.2, 0.2),
            row(2014, "USA", "Total", 0.6, 0.6),
            row(2013, "USA", "C01", 5.0, 5.0),
            row(2014, "JPN", "manufacture", 0.3, 0.1),
        ]);
        let gvc = country_metric(&table, 2014, Metric::Gvc);

        // (0.2 + 0.4 + 1.2) / 3
        assert!((gvc["USA"] - 0.6).abs() < 1e-12);
        assert!((gvc["JPN"] - 0.4).abs() < 1e-12);
        assert_eq!(gvc.len(), 2);
    }

    #[test]
    fn fit_recovers_line() {
        let pts = [[0.0, 1.0], [1.0, 3.0], [2.0, 5.0], [f64::NAN, 9.0]];
        let (m, c) = linear_fit(&pts).unwrap();
        assert!((m - 2.0).abs() < 1e-12);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fit_needs_x_spread() {
        assert_eq!(linear_fit(&[[1.0, 1.0], [1.0, 2.0]]), None);
        assert_eq!(linear_fit(&[[1.0, 1.0]]), None);
    }

    #[test]
    fn mean_skips_nan() {
        let mut m = Mean::default();
        m.push(1.0);
        m.push(f64::NAN);
        m.push(3.0);
        assert_eq!(m.get(), Some(2.0));
        assert_eq!(Mean::default().get(), None);
    }
}
