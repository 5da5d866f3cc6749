/// Data layer: core types, loading, reshaping, joining, export and views.
///
/// Architecture:
/// ```text
///  CO2 emissions.xlsx        GVCpt_WIOD2016.csv
///        │                          │
///        ▼                          ▼
///   ┌──────────┐             ┌───────────────┐
///   │  reshape  │ wide→long  │ participation │ region/sector → keys, sums
///   └──────────┘             └───────────────┘
///        │                          │
///        └────────────┬─────────────┘
///                     ▼
///               ┌──────────┐
///               │   join    │  left join on (year, country, industry)
///               └──────────┘
///                     │
///          ┌──────────┴──────────┐
///          ▼                     ▼
///   ┌──────────┐        ┌────────────────────┐
///   │  export   │        │ aggregate / filter │  dashboard views
///   └──────────┘        └────────────────────┘
/// ```

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod join;
pub mod loader;
pub mod model;
pub mod participation;
pub mod reshape;
pub mod sheet;
