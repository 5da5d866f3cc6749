#![allow(dead_code)]

use std::ops::RangeInclusive;

use gvc_emissions::data::classify::sector_code;
use gvc_emissions::data::model::Linkages;
use gvc_emissions::data::participation::RawParticipation;
use gvc_emissions::data::sheet::{CellValue, SheetGrid};

/// Deterministic emissions value for a sheet cell.
pub fn emission(country: &str, industry: usize, year: i32) -> f64 {
    let c = country.bytes().map(f64::from).sum::<f64>();
    c + industry as f64 * 10.0 + f64::from(year - 1990)
}

/// A country sheet with a `Code` column (when `labeled`), a description
/// column and one column per year.
pub fn country_sheet(
    country: &str,
    years: RangeInclusive<i32>,
    industries: usize,
    labeled: bool,
) -> SheetGrid {
    let mut header = Vec::new();
    if labeled {
        header.push(CellValue::from("Code"));
    }
    header.push(CellValue::from("Description"));
    let label_cols = header.len();
    header.extend(years.clone().map(|y| CellValue::from(f64::from(y))));

    let mut cells = vec![header];
    for n in 1..=industries {
        let code = sector_code(n);
        let mut row = Vec::new();
        if labeled {
            row.push(CellValue::from(code.as_str()));
        }
        row.push(CellValue::from(format!("{code} industry").as_str()));
        row.extend(years.clone().map(|y| CellValue::from(emission(country, n, y))));
        cells.push(row);
    }
    debug_assert_eq!(cells[0].len(), label_cols + years.count());
    SheetGrid::from_cells(country, cells)
}

pub fn linkages(seed: f64) -> Linkages {
    Linkages {
        forward: 0.10 + seed,
        forward_simple: 0.06 + seed,
        forward_complex: 0.03 + seed,
        backward: 0.20 + seed,
        backward_simple: 0.12 + seed,
        backward_complex: 0.05 + seed,
    }
}

/// Participation rows for `countries`: every detailed sector plus a `Total`
/// aggregate per country and year.
pub fn raw_participation(
    countries: &[&str],
    years: RangeInclusive<i32>,
    industries: usize,
) -> Vec<RawParticipation> {
    let mut rows = Vec::new();
    for year in years {
        for (ci, country) in countries.iter().enumerate() {
            for n in 1..=industries {
                let code = sector_code(n);
                rows.push(RawParticipation {
                    region: format!("{country}{code}"),
                    sector: format!("{code} industry"),
                    year,
                    linkages: linkages(0.001 * (ci * industries + n) as f64),
                });
            }
            rows.push(RawParticipation {
                region: country.to_string(),
                sector: "Total".into(),
                year,
                linkages: linkages(0.0),
            });
        }
    }
    rows
}
