use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result};

use super::error::PipelineError;
use super::model::{Linkages, ParticipationRecord};
use crate::config::PipelineConfig;

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// One row of the wide participation CSV before key derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParticipation {
    pub region: String,
    pub sector: String,
    pub year: i32,
    pub linkages: Linkages,
}

/// Source header for each raw index, in `Linkages` field order.
pub const RAW_METRIC_COLUMNS: [&str; 6] = [
    "GVCpt_f",
    "GVCpt_f_s",
    "GVCpt_f_c",
    "GVCpt_b",
    "GVCpt_b_s",
    "GVCpt_b_c",
];

const SOURCE_NAME: &str = "participation table";

/// Read the wide participation CSV. Columns are found by header name; any
/// column not needed (the saved index, other indicators) is ignored.
pub fn read_participation<R: Read>(reader: R) -> Result<Vec<RawParticipation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers().context("reading participation headers")?.clone();

    let position = |name: &str| -> Result<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            PipelineError::MissingColumn {
                source_name: SOURCE_NAME.into(),
                column: name.into(),
            }
            .into()
        })
    };
    let region_idx = position("region")?;
    let sector_idx = position("sector")?;
    let year_idx = position("year")?;
    let metric_idx = RAW_METRIC_COLUMNS
        .iter()
        .map(|c| position(c))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (row_no, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("participation CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let number = |idx: usize, column: &str| -> Result<f64> {
            parse_number(field(idx), row_no, column)
        };

        let year_f = number(year_idx, "year")?;
        if year_f.is_nan() || year_f.fract() != 0.0 {
            return Err(not_numeric(row_no, "year", field(year_idx)));
        }

        let m: Vec<f64> = metric_idx
            .iter()
            .zip(RAW_METRIC_COLUMNS)
            .map(|(&idx, col)| number(idx, col))
            .collect::<Result<_>>()?;

        rows.push(RawParticipation {
            region: field(region_idx).to_string(),
            sector: field(sector_idx).to_string(),
            year: year_f as i32,
            linkages: Linkages {
                forward: m[0],
                forward_simple: m[1],
                forward_complex: m[2],
                backward: m[3],
                backward_simple: m[4],
                backward_complex: m[5],
            },
        });
    }
    Ok(rows)
}

/// Blank cells read as `NaN`.
fn parse_number(s: &str, row: usize, column: &str) -> Result<f64> {
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|_| not_numeric(row, column, s))
}

fn not_numeric(row: usize, column: &str, value: &str) -> anyhow::Error {
    PipelineError::NotNumeric {
        source_name: SOURCE_NAME.into(),
        row,
        column: column.into(),
        value: value.into(),
    }
    .into()
}

// ---------------------------------------------------------------------------
// Key derivation and derived sums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeriveOptions {
    pub excluded_regions: HashSet<String>,
    pub aggregate_sectors: HashSet<String>,
}

impl From<&PipelineConfig> for DeriveOptions {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            excluded_regions: cfg.excluded_regions.iter().cloned().collect(),
            aggregate_sectors: cfg.aggregate_sectors.iter().cloned().collect(),
        }
    }
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// First `n` characters of `s` (all of it when shorter).
fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Country code of a region label: its first three characters.
pub fn country_of(region: &str) -> &str {
    prefix(region, 3)
}

/// Industry of a sector label: aggregate labels verbatim, detailed sector
/// labels cut to their three-character code.
pub fn industry_of<'a>(sector: &'a str, opts: &DeriveOptions) -> &'a str {
    if opts.aggregate_sectors.contains(sector) {
        sector
    } else {
        prefix(sector, 3)
    }
}

/// Turn raw rows into keyed participation records with derived sums,
/// dropping excluded regions. Sorted by (year, country, industry).
pub fn derive_participation(
    rows: Vec<RawParticipation>,
    opts: &DeriveOptions,
) -> Vec<ParticipationRecord> {
    let before = rows.len();
    let mut records: Vec<ParticipationRecord> = rows
        .into_iter()
        .filter_map(|raw| {
            let country = country_of(&raw.region);
            if opts.excluded_regions.contains(country) {
                return None;
            }
            Some(ParticipationRecord::new(
                raw.year,
                country.to_string(),
                industry_of(&raw.sector, opts).to_string(),
                raw.linkages,
            ))
        })
        .collect();

    records.sort_by(|a, b| {
        (a.year, &a.country, &a.industry).cmp(&(b.year, &b.country, &b.industry))
    });
    log::info!(
        "derived {} participation rows ({} dropped as excluded regions)",
        records.len(),
        before - records.len()
    );
    records
}
