mod common;

use gvc_emissions::config::PipelineConfig;
use gvc_emissions::data::error::PipelineError;
use gvc_emissions::data::export::{export_file, header};
use gvc_emissions::data::loader::load_file;
use gvc_emissions::data::model::MergedTable;
use gvc_emissions::data::sheet::MemorySheets;
use gvc_emissions::pipeline::build_panel;

use common::{country_sheet, raw_participation};

fn small_panel() -> MergedTable {
    let config = PipelineConfig {
        countries: vec!["AUS".into(), "USA".into()],
        year_min: 2013,
        year_max: 2014,
        industry_count: 4,
        ..PipelineConfig::default()
    };
    let mut sheets = MemorySheets::new();
    sheets.insert(country_sheet("AUS", 2010..=2016, 4, true));
    sheets.insert(country_sheet("USA", 2010..=2016, 4, false));
    let raw = raw_participation(&["AUS", "USA", "NLD"], 2013..=2014, 4);
    let (_, merged) = build_panel(&config, &mut sheets, raw).unwrap();
    merged
}

fn assert_same(loaded: &MergedTable, original: &MergedTable) {
    assert_eq!(loaded.len(), original.len());
    assert_eq!(loaded.records, original.records);
    assert_eq!(loaded.countries, original.countries);
    assert_eq!(loaded.matched(), original.matched());
}

#[test]
fn header_order() {
    assert_eq!(
        header(),
        vec![
            "year", "country", "industry", "f", "fs", "fc", "b", "bs", "bc", "gvc", "gvcc",
            "gvcs", "CE"
        ]
    );
}

#[test]
fn xlsx_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df.xlsx");
    let merged = small_panel();

    export_file(&merged, &path).unwrap();
    assert_same(&load_file(&path).unwrap(), &merged);
}

#[test]
fn csv_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df.csv");
    let merged = small_panel();

    export_file(&merged, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let first = text.lines().next().unwrap();
    assert_eq!(first, header().join(","));
    // Aggregate rows end with an empty CE field.
    assert!(text.lines().any(|l| l.contains(",Total,") && l.ends_with(',')));

    assert_same(&load_file(&path).unwrap(), &merged);
}

#[test]
fn parquet_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df.parquet");
    let merged = small_panel();

    export_file(&merged, &path).unwrap();
    assert_same(&load_file(&path).unwrap(), &merged);
}

#[test]
fn unwritable_destination_fails_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("df.xlsx");

    let err = export_file(&small_panel(), &path).unwrap_err();
    assert!(format!("{err:#}").contains("df.xlsx"));
    assert!(!path.exists());
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df.json");

    let err = export_file(&small_panel(), &path).unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::UnsupportedExtension("json".into()))
    );
}

#[test]
fn loader_requires_ce_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.csv");
    std::fs::write(
        &path,
        "year,country,industry,f,fs,fc,b,bs,bc\n2014,USA,C01,0.1,0.1,0.1,0.1,0.1,0.1\n",
    )
    .unwrap();

    let err = load_file(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MissingColumn { column, .. }) if column == "CE"
    ));
}

#[test]
fn csv_leaves_infinite_values_blank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("df.csv");
    let mut merged = small_panel();
    merged.records[0].ce = Some(f64::INFINITY);
    merged.records[1].participation.gvc = f64::NEG_INFINITY;

    export_file(&merged, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("inf"));

    let loaded = load_file(&path).unwrap();
    assert_eq!(loaded.records[0].ce, None);
}
