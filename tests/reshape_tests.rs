mod common;

use gvc_emissions::data::error::PipelineError;
use gvc_emissions::data::reshape::{reshape_country, reshape_workbook, ReshapeOptions};
use gvc_emissions::data::sheet::{CellValue, MemorySheets, SheetGrid};

use common::{country_sheet, emission};

fn countries(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

#[test]
fn one_row_per_industry_and_panel_year() {
    let mut sheets = MemorySheets::new();
    sheets.insert(country_sheet("AUS", 1995..=2016, 56, true));
    sheets.insert(country_sheet("USA", 1995..=2016, 56, false));

    let table = reshape_workbook(
        &mut sheets,
        &countries(&["AUS", "USA"]),
        &ReshapeOptions::default(),
    )
    .unwrap();

    assert_eq!(table.len(), 2 * 56 * 15);
    for country in ["AUS", "USA"] {
        let n = table.records.iter().filter(|r| r.country == country).count();
        assert_eq!(n, 56 * 15);
    }
    assert!(table.records.iter().all(|r| (2000..=2014).contains(&r.year)));
}

#[test]
fn absent_countries_are_skipped() {
    let mut sheets = MemorySheets::new();
    sheets.insert(country_sheet("AUS", 2000..=2014, 56, true));

    let table = reshape_workbook(
        &mut sheets,
        &countries(&["AUS", "NOR", "TWN"]),
        &ReshapeOptions::default(),
    )
    .unwrap();

    assert_eq!(table.countries().into_iter().collect::<Vec<_>>(), vec!["AUS"]);
    assert_eq!(table.len(), 56 * 15);
}

#[test]
fn output_sorted_by_year_country_industry() {
    let mut sheets = MemorySheets::new();
    for c in ["USA", "AUS", "CHN"] {
        sheets.insert(country_sheet(c, 2000..=2002, 56, true));
    }
    let opts = ReshapeOptions {
        years: 2000..=2002,
        ..ReshapeOptions::default()
    };
    let table = reshape_workbook(&mut sheets, &countries(&["USA", "CHN", "AUS"]), &opts).unwrap();

    let keys: Vec<_> = table.records.iter().map(|r| r.key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(table.records[0].country, "AUS");
    assert_eq!(table.records[0].industry, "C01");
}

#[test]
fn values_follow_their_labels() {
    let grid = country_sheet("DEU", 2000..=2014, 56, true);
    let records = reshape_country("DEU", &grid, &ReshapeOptions::default()).unwrap();

    let r = records
        .iter()
        .find(|r| r.year == 2007 && r.industry == "C17")
        .unwrap();
    assert_eq!(r.co2_emissions, emission("DEU", 17, 2007));
}

#[test]
fn labeled_rows_skip_notes_and_totals() {
    let mut grid = country_sheet("FRA", 2000..=2001, 3, true);
    grid.rows.insert(
        1,
        vec![
            CellValue::from("Note"),
            CellValue::from("not an industry"),
            CellValue::from(1.0),
            CellValue::from(1.0),
        ],
    );
    grid.rows.push(vec![
        CellValue::from("Total"),
        CellValue::Empty,
        CellValue::from(99.0),
        CellValue::from(99.0),
    ]);
    let opts = ReshapeOptions {
        years: 2000..=2001,
        industry_count: 3,
        ..ReshapeOptions::default()
    };

    let records = reshape_country("FRA", &grid, &opts).unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.co2_emissions != 99.0));
    let c02: Vec<f64> = records
        .iter()
        .filter(|r| r.industry == "C02")
        .map(|r| r.co2_emissions)
        .collect();
    assert_eq!(c02, vec![emission("FRA", 2, 2000), emission("FRA", 2, 2001)]);
}

#[test]
fn blank_cells_become_nan() {
    let mut grid = country_sheet("ITA", 2000..=2014, 56, true);
    // Column 2 holds year 2000.
    grid.rows[4][2] = CellValue::Empty;

    let records = reshape_country("ITA", &grid, &ReshapeOptions::default()).unwrap();
    let r = records
        .iter()
        .find(|r| r.year == 2000 && r.industry == "C05")
        .unwrap();
    assert!(r.co2_emissions.is_nan());
}

#[test]
fn short_sheet_is_rejected() {
    let grid = country_sheet("ESP", 2000..=2014, 40, false);
    let err = reshape_country("ESP", &grid, &ReshapeOptions::default()).unwrap_err();

    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::IndustryRows {
            sheet: "ESP".into(),
            found: 40,
            expected: 56,
        })
    );
}

#[test]
fn sheet_without_year_columns_is_rejected() {
    let grid = SheetGrid::from_cells(
        "GBR",
        vec![
            vec![CellValue::from("Code"), CellValue::from("Description")],
            vec![CellValue::from("C01"), CellValue::from("Crops")],
        ],
    );
    let err = reshape_country("GBR", &grid, &ReshapeOptions::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoYearColumns { sheet }) if sheet == "GBR"
    ));
}

#[test]
fn text_in_a_value_cell_is_an_error() {
    let mut grid = country_sheet("POL", 2000..=2014, 56, true);
    grid.rows[0][3] = CellValue::from("n/a");

    let err = reshape_country("POL", &grid, &ReshapeOptions::default()).unwrap_err();
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::NotNumeric { row, column, value, .. }) => {
            assert_eq!(*row, 2);
            assert_eq!(column, "2001");
            assert_eq!(value, "n/a");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn country_errors_carry_context() {
    let mut sheets = MemorySheets::new();
    sheets.insert(country_sheet("CAN", 2000..=2014, 10, false));

    let err = reshape_workbook(&mut sheets, &countries(&["CAN"]), &ReshapeOptions::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("reshaping emissions for CAN"));
    assert!(err.downcast_ref::<PipelineError>().is_some());
}

#[test]
fn foreign_codes_fall_back_to_row_order() {
    let mut cells = vec![vec![CellValue::from("Code"), CellValue::from("2000")]];
    for n in 1..=56 {
        cells.push(vec![
            CellValue::from(format!("A{n:02}").as_str()),
            CellValue::from(n as f64),
        ]);
    }
    let grid = SheetGrid::from_cells("AUS", cells);
    let opts = ReshapeOptions {
        years: 2000..=2000,
        ..ReshapeOptions::default()
    };

    let records = reshape_country("AUS", &grid, &opts).unwrap();
    assert_eq!(records.len(), 56);
    let c10 = records.iter().find(|r| r.industry == "C10").unwrap();
    assert_eq!(c10.co2_emissions, 10.0);
}

#[test]
fn code_column_wins_over_earlier_sector_column() {
    let mut cells = vec![vec![
        CellValue::from("Sector"),
        CellValue::from("Code"),
        CellValue::from("2000"),
    ]];
    // Reverse order so a row-order reading would mislabel every value.
    for n in (1..=56).rev() {
        cells.push(vec![
            CellValue::from("Crop and animal production"),
            CellValue::from(format!("C{n:02}").as_str()),
            CellValue::from(n as f64),
        ]);
    }
    let grid = SheetGrid::from_cells("AUS", cells);
    let opts = ReshapeOptions {
        years: 2000..=2000,
        ..ReshapeOptions::default()
    };

    let records = reshape_country("AUS", &grid, &opts).unwrap();
    assert_eq!(records.len(), 56);
    for r in &records {
        let n: f64 = r.industry[1..].parse().unwrap();
        assert_eq!(r.co2_emissions, n, "value of {}", r.industry);
    }
}

#[test]
fn c00_label_is_not_an_industry() {
    let mut grid = country_sheet("FRA", 2000..=2000, 3, true);
    grid.rows.insert(
        0,
        vec![
            CellValue::from("C00"),
            CellValue::from("header note"),
            CellValue::from(-1.0),
        ],
    );
    let opts = ReshapeOptions {
        years: 2000..=2000,
        industry_count: 3,
        ..ReshapeOptions::default()
    };

    let records = reshape_country("FRA", &grid, &opts).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.co2_emissions >= 0.0));
}
