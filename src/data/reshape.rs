use std::collections::HashSet;
use std::ops::RangeInclusive;

use anyhow::{Context, Result};

use super::classify::{sector_code, sector_number};
use super::error::PipelineError;
use super::model::{EmissionRecord, EmissionsTable, PanelKey};
use super::sheet::{SheetGrid, SheetSource};
use crate::config::PipelineConfig;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Schema assumptions applied to every country sheet.
#[derive(Debug, Clone)]
pub struct ReshapeOptions {
    pub years: RangeInclusive<i32>,
    pub industry_count: usize,
    pub industry_columns: Vec<String>,
}

impl From<&PipelineConfig> for ReshapeOptions {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            years: cfg.years(),
            industry_count: cfg.industry_count,
            industry_columns: cfg.industry_columns.clone(),
        }
    }
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Industry rows
// ---------------------------------------------------------------------------

/// How industry rows are located in a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndustryLayout {
    /// A header names the label column; rows are keyed by their `Cnn` label.
    Labeled { column: usize },
    /// No label column; the first `industry_count` non-blank rows are
    /// C01..Cnn in order.
    Positional,
}

impl IndustryLayout {
    pub fn detect(grid: &SheetGrid, opts: &ReshapeOptions) -> Self {
        match grid.find_column(&opts.industry_columns) {
            Some(column) => IndustryLayout::Labeled { column },
            None => IndustryLayout::Positional,
        }
    }
}

/// Resolve (row index, industry code) pairs for the sheet.
fn industry_rows(
    grid: &SheetGrid,
    layout: IndustryLayout,
    opts: &ReshapeOptions,
) -> Result<Vec<(usize, String)>> {
    let positional = || -> Vec<(usize, String)> {
        grid.non_blank_rows()
            .take(opts.industry_count)
            .enumerate()
            .map(|(pos, (i, _))| (i, sector_code(pos + 1)))
            .collect()
    };
    let rows: Vec<(usize, String)> = match layout {
        IndustryLayout::Labeled { column } => {
            let labeled: Vec<(usize, String)> = grid
                .non_blank_rows()
                .filter_map(|(i, _)| {
                    let label = grid.cell(i, column).to_string();
                    let code = label.trim().get(..3)?.to_string();
                    match sector_number(&code) {
                        Some(n) if (n as usize) <= opts.industry_count => Some((i, code)),
                        _ => None,
                    }
                })
                .collect();
            // A label column with a different coding scheme says nothing
            // about row identity; fall back to row order.
            if labeled.is_empty() {
                log::debug!(
                    "sheet {}: no Cnn labels in column {column}, using row order",
                    grid.name
                );
                positional()
            } else {
                labeled
            }
        }
        IndustryLayout::Positional => positional(),
    };

    if rows.len() != opts.industry_count {
        return Err(PipelineError::IndustryRows {
            sheet: grid.name.clone(),
            found: rows.len(),
            expected: opts.industry_count,
        }
        .into());
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Reshape
// ---------------------------------------------------------------------------

/// Un-pivot one country's sheet from wide year columns into long rows.
///
/// Only years inside `opts.years` are kept. Output is in (year, industry)
/// order.
pub fn reshape_country(
    country: &str,
    grid: &SheetGrid,
    opts: &ReshapeOptions,
) -> Result<Vec<EmissionRecord>> {
    let year_columns: Vec<(usize, i32)> = grid
        .headers
        .iter()
        .enumerate()
        .filter_map(|(col, h)| h.as_year().map(|y| (col, y)))
        .collect();
    if year_columns.is_empty() {
        return Err(PipelineError::NoYearColumns {
            sheet: grid.name.clone(),
        }
        .into());
    }

    let layout = IndustryLayout::detect(grid, opts);
    let industries = industry_rows(grid, layout, opts)?;
    log::debug!(
        "sheet {}: {:?}, {} year columns",
        grid.name,
        layout,
        year_columns.len()
    );

    let mut records = Vec::with_capacity(industries.len() * year_columns.len());
    for &(col, year) in &year_columns {
        if !opts.years.contains(&year) {
            continue;
        }
        for (row, industry) in &industries {
            let cell = grid.cell(*row, col);
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.as_f64().ok_or_else(|| PipelineError::NotNumeric {
                    source_name: format!("sheet '{}'", grid.name),
                    row: *row + 2,
                    column: year.to_string(),
                    value: cell.to_string(),
                })?
            };
            records.push(EmissionRecord {
                country: country.to_string(),
                year,
                industry: industry.clone(),
                co2_emissions: value,
            });
        }
    }
    Ok(records)
}

/// Reshape every listed country present in the workbook and concatenate.
///
/// Countries without a sheet are skipped. The result is sorted by
/// (year, country, industry) with unique keys.
pub fn reshape_workbook<S: SheetSource>(
    source: &mut S,
    countries: &[String],
    opts: &ReshapeOptions,
) -> Result<EmissionsTable> {
    let available: HashSet<String> = source.sheet_names().into_iter().collect();
    let mut all = Vec::new();

    for country in countries {
        if !available.contains(country) {
            log::warn!("no emissions sheet for {country}, skipping");
            continue;
        }
        let grid = source.sheet(country)?;
        let records = reshape_country(country, &grid, opts)
            .with_context(|| format!("reshaping emissions for {country}"))?;
        all.extend(records);
    }

    let table = EmissionsTable::from_records(all);
    ensure_unique(&table)?;
    log::info!(
        "reshaped {} emission rows for {} countries",
        table.len(),
        table.countries().len()
    );
    Ok(table)
}

fn ensure_unique(table: &EmissionsTable) -> Result<()> {
    // Sorted input: duplicates are adjacent.
    for pair in table.records.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.year == b.year && a.country == b.country && a.industry == b.industry {
            let PanelKey {
                year,
                country,
                industry,
            } = a.key();
            return Err(PipelineError::DuplicateKey {
                table: "emissions".into(),
                year,
                country,
                industry,
            }
            .into());
        }
    }
    Ok(())
}
