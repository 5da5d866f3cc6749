use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::data::export::export_file;
use crate::data::join::merge_emissions;
use crate::data::loader::{load_emissions_workbook, load_participation_csv};
use crate::data::model::{EmissionsTable, MergedTable};
use crate::data::participation::{derive_participation, DeriveOptions, RawParticipation};
use crate::data::reshape::{reshape_workbook, ReshapeOptions};
use crate::data::sheet::SheetSource;

/// Row counts of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub emission_rows: usize,
    pub emission_countries: usize,
    pub raw_participation_rows: usize,
    pub merged_rows: usize,
    pub matched_rows: usize,
    pub output: PathBuf,
}

/// Reshape, derive and join already-loaded sources.
pub fn build_panel<S: SheetSource>(
    config: &PipelineConfig,
    emissions_source: &mut S,
    participation_rows: Vec<RawParticipation>,
) -> Result<(EmissionsTable, MergedTable)> {
    let emissions = reshape_workbook(
        emissions_source,
        &config.countries,
        &ReshapeOptions::from(config),
    )
    .context("reshaping emissions workbook")?;
    let participation = derive_participation(participation_rows, &DeriveOptions::from(config));
    let merged = merge_emissions(participation, &emissions)?;
    Ok((emissions, merged))
}

/// Load both sources from disk, build the panel and export it to
/// `config.output_path()`.
pub fn run_pipeline(config: &PipelineConfig) -> Result<(MergedTable, PipelineOutcome)> {
    let mut workbook = load_emissions_workbook(&config.emissions_path)?;
    let raw = load_participation_csv(&config.participation_path)?;
    let raw_participation_rows = raw.len();

    let (emissions, merged) = build_panel(config, &mut workbook, raw)?;

    let output = config.output_path();
    export_file(&merged, &output)?;

    let outcome = PipelineOutcome {
        emission_rows: emissions.len(),
        emission_countries: emissions.countries().len(),
        raw_participation_rows,
        merged_rows: merged.len(),
        matched_rows: merged.matched(),
        output,
    };
    Ok((merged, outcome))
}
