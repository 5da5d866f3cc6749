mod common;

use gvc_emissions::data::error::PipelineError;
use gvc_emissions::data::join::merge_emissions;
use gvc_emissions::data::model::{EmissionRecord, EmissionsTable};
use gvc_emissions::data::participation::{derive_participation, DeriveOptions};

use common::raw_participation;

fn emissions(countries: &[&str], years: std::ops::RangeInclusive<i32>, industries: usize) -> EmissionsTable {
    let mut records = Vec::new();
    for year in years {
        for country in countries {
            for n in 1..=industries {
                records.push(EmissionRecord {
                    country: country.to_string(),
                    year,
                    industry: format!("C{n:02}"),
                    co2_emissions: common::emission(country, n, year),
                });
            }
        }
    }
    EmissionsTable::from_records(records)
}

#[test]
fn cardinality_matches_participation() {
    let participation =
        derive_participation(raw_participation(&["USA", "CHN"], 2012..=2014, 5), &DeriveOptions::default());
    let n = participation.len();
    // Emissions only for USA: CHN rows stay, unmatched.
    let merged = merge_emissions(participation, &emissions(&["USA"], 2012..=2014, 5)).unwrap();

    assert_eq!(merged.len(), n);
    assert_eq!(merged.matched(), 3 * 5);
    assert!(merged
        .records
        .iter()
        .filter(|r| r.country() == "CHN")
        .all(|r| r.ce.is_none()));
}

#[test]
fn aggregates_have_no_emissions() {
    let participation =
        derive_participation(raw_participation(&["USA"], 2014..=2014, 3), &DeriveOptions::default());
    let merged = merge_emissions(participation, &emissions(&["USA"], 2014..=2014, 3)).unwrap();

    let total = merged
        .records
        .iter()
        .find(|r| r.industry() == "Total")
        .unwrap();
    assert_eq!(total.ce, None);
    let c02 = merged.records.iter().find(|r| r.industry() == "C02").unwrap();
    assert_eq!(c02.ce, Some(common::emission("USA", 2, 2014)));
}

#[test]
fn nan_emissions_become_null() {
    let participation =
        derive_participation(raw_participation(&["FRA"], 2014..=2014, 1), &DeriveOptions::default());
    let table = EmissionsTable::from_records(vec![EmissionRecord {
        country: "FRA".into(),
        year: 2014,
        industry: "C01".into(),
        co2_emissions: f64::NAN,
    }]);
    let merged = merge_emissions(participation, &table).unwrap();
    assert_eq!(merged.matched(), 0);
}

#[test]
fn duplicate_emission_keys_are_rejected() {
    let participation =
        derive_participation(raw_participation(&["FRA"], 2014..=2014, 1), &DeriveOptions::default());
    let row = EmissionRecord {
        country: "FRA".into(),
        year: 2014,
        industry: "C01".into(),
        co2_emissions: 1.0,
    };
    let table = EmissionsTable::from_records(vec![row.clone(), row]);
    let err = merge_emissions(participation, &table).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::DuplicateKey { year: 2014, .. })
    ));
}

#[test]
fn participation_order_is_kept() {
    let participation =
        derive_participation(raw_participation(&["USA", "AUS"], 2013..=2014, 2), &DeriveOptions::default());
    let keys: Vec<_> = participation.iter().map(|p| p.key()).collect();
    let merged = merge_emissions(participation, &emissions(&["AUS"], 2013..=2014, 2)).unwrap();
    let merged_keys: Vec<_> = merged.records.iter().map(|r| r.participation.key()).collect();
    assert_eq!(keys, merged_keys);
}
