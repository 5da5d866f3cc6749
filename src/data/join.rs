use std::collections::HashMap;

use anyhow::Result;

use super::classify::is_aggregate;
use super::error::PipelineError;
use super::model::{EmissionsTable, MergedRecord, MergedTable, ParticipationRecord};

/// Left-join emissions onto participation on (year, country, industry).
///
/// Every participation row appears exactly once in the output, in input
/// order. Rows without a matching emissions row, or whose matched value is
/// `NaN`, get `ce = None`. Aggregate industries never match, which is
/// expected. Duplicate emission keys are rejected since they would break
/// the one-to-one attachment.
pub fn merge_emissions(
    participation: Vec<ParticipationRecord>,
    emissions: &EmissionsTable,
) -> Result<MergedTable> {
    let mut index: HashMap<(i32, &str, &str), f64> = HashMap::with_capacity(emissions.len());
    for e in &emissions.records {
        let key = (e.year, e.country.as_str(), e.industry.as_str());
        if index.insert(key, e.co2_emissions).is_some() {
            return Err(PipelineError::DuplicateKey {
                table: "emissions".into(),
                year: e.year,
                country: e.country.clone(),
                industry: e.industry.clone(),
            }
            .into());
        }
    }

    let records: Vec<MergedRecord> = participation
        .into_iter()
        .map(|p| {
            let ce = index
                .get(&(p.year, p.country.as_str(), p.industry.as_str()))
                .copied()
                .filter(|v| !v.is_nan());
            MergedRecord { participation: p, ce }
        })
        .collect();

    let table = MergedTable::from_records(records);
    let unmatched_aggregates = table
        .records
        .iter()
        .filter(|r| r.ce.is_none() && is_aggregate(r.industry()))
        .count();
    log::info!(
        "merged {} rows, {} with emissions, {} without ({} of them aggregate sectors)",
        table.len(),
        table.matched(),
        table.len() - table.matched(),
        unmatched_aggregates
    );
    Ok(table)
}
