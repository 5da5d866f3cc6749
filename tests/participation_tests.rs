mod common;

use gvc_emissions::data::error::PipelineError;
use gvc_emissions::data::model::Linkages;
use gvc_emissions::data::participation::{
    derive_participation, read_participation, DeriveOptions, RawParticipation,
};

const CSV: &str = "\
,region,sector,year,GVCpt_f,GVCpt_f_s,GVCpt_f_c,GVCpt_b,GVCpt_b_s,GVCpt_b_c
0,USAC01,C01 Crop and animal production,2014,0.25,0.125,0.0625,0.5,0.25,0.125
1,CHN,Total,2014,0.3,0.1,0.1,0.2,0.1,0.05
2,NLDC01,C01 Crop and animal production,2014,0.1,0.1,0.1,0.1,0.1,0.1
3,ROW,Total,2014,0.1,0.1,0.1,0.1,0.1,0.1
4,DEUC24,C24 Electricity,2013,0.4,,0.1,0.2,0.1,0.05
";

fn raw(region: &str, sector: &str) -> RawParticipation {
    RawParticipation {
        region: region.into(),
        sector: sector.into(),
        year: 2014,
        linkages: common::linkages(0.0),
    }
}

#[test]
fn reads_by_header_name() {
    let rows = read_participation(CSV.as_bytes()).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].region, "USAC01");
    assert_eq!(rows[0].year, 2014);
    assert_eq!(rows[0].linkages.forward_simple, 0.125);
    assert_eq!(rows[0].linkages.backward_complex, 0.125);
    assert!(rows[4].linkages.forward_simple.is_nan());
}

#[test]
fn keys_come_from_region_and_sector() {
    let out = derive_participation(
        vec![raw("USAC01", "C01 Crop and animal production"), raw("CHN", "Total")],
        &DeriveOptions::default(),
    );
    let keys: Vec<(&str, &str)> = out
        .iter()
        .map(|r| (r.country.as_str(), r.industry.as_str()))
        .collect();
    assert_eq!(keys, vec![("CHN", "Total"), ("USA", "C01")]);
}

#[test]
fn aggregate_labels_are_kept_whole() {
    let out = derive_participation(
        vec![
            raw("JPN", "services related to production"),
            raw("JPN", "all service"),
            raw("JPN", "manufacture"),
        ],
        &DeriveOptions::default(),
    );
    let industries: Vec<&str> = out.iter().map(|r| r.industry.as_str()).collect();
    assert_eq!(
        industries,
        vec!["all service", "manufacture", "services related to production"]
    );
}

#[test]
fn excluded_regions_are_dropped() {
    let rows = read_participation(CSV.as_bytes()).unwrap();
    let out = derive_participation(rows, &DeriveOptions::default());

    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|r| r.country != "NLD" && r.country != "ROW"));
}

#[test]
fn derived_sums_equal_components() {
    let rows = read_participation(CSV.as_bytes()).unwrap();
    for r in derive_participation(rows, &DeriveOptions::default()) {
        if r.forward_simple.is_nan() {
            assert!(r.gvc_simple.is_nan());
            continue;
        }
        assert_eq!(r.gvc, r.forward + r.backward);
        assert_eq!(r.gvc_simple, r.forward_simple + r.backward_simple);
        assert_eq!(r.gvc_complex, r.forward_complex + r.backward_complex);
    }
}

#[test]
fn sorted_by_year_then_country() {
    let rows = read_participation(CSV.as_bytes()).unwrap();
    let out = derive_participation(rows, &DeriveOptions::default());
    let years: Vec<i32> = out.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2013, 2014, 2014]);
    assert_eq!(out[1].country, "CHN");
}

#[test]
fn missing_metric_column_is_named() {
    let csv = "region,sector,year,GVCpt_f,GVCpt_b\nUSAC01,C01,2014,0.1,0.2\n";
    let err = read_participation(csv.as_bytes()).unwrap_err();
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::MissingColumn { column, .. }) => assert_eq!(column, "GVCpt_f_s"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn fractional_year_is_rejected() {
    let csv = "region,sector,year,GVCpt_f,GVCpt_f_s,GVCpt_f_c,GVCpt_b,GVCpt_b_s,GVCpt_b_c\n\
               USAC01,C01,2014.5,0.1,0.1,0.1,0.1,0.1,0.1\n";
    let err = read_participation(csv.as_bytes()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NotNumeric { column, .. }) if column == "year"
    ));
}

#[test]
fn custom_exclusions() {
    let opts = DeriveOptions {
        excluded_regions: ["USA".to_string()].into_iter().collect(),
        ..DeriveOptions::default()
    };
    let out = derive_participation(vec![raw("USAC01", "C01"), raw("NLDC01", "C01")], &opts);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].country, "NLD");
    assert_eq!(
        Linkages {
            forward: out[0].forward,
            forward_simple: out[0].forward_simple,
            forward_complex: out[0].forward_complex,
            backward: out[0].backward,
            backward_simple: out[0].backward_simple,
            backward_complex: out[0].backward_complex,
        },
        common::linkages(0.0)
    );
}
