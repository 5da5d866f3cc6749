use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Panel key
// ---------------------------------------------------------------------------

/// The (year, country, industry) key every table in the panel is indexed by.
///
/// Field order gives the `Ord` used for sorting: year, then country, then
/// industry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelKey {
    pub year: i32,
    pub country: String,
    pub industry: String,
}

impl fmt::Display for PanelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.country, self.industry)
    }
}

// ---------------------------------------------------------------------------
// EmissionRecord – one row of the long emissions table
// ---------------------------------------------------------------------------

/// CO2 emissions of one country/industry in one year.
///
/// A blank source cell is kept as `NaN` so every (industry, year) slot of a
/// country exists in the long table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub country: String,
    pub year: i32,
    pub industry: String,
    pub co2_emissions: f64,
}

impl EmissionRecord {
    pub fn key(&self) -> PanelKey {
        PanelKey {
            year: self.year,
            country: self.country.clone(),
            industry: self.industry.clone(),
        }
    }
}

/// The reshaped emissions table, sorted by (year, country, industry).
#[derive(Debug, Clone, Default)]
pub struct EmissionsTable {
    pub records: Vec<EmissionRecord>,
}

impl EmissionsTable {
    /// Sort into the canonical (year, country, industry) order.
    pub fn from_records(mut records: Vec<EmissionRecord>) -> Self {
        records.sort_by(|a, b| {
            (a.year, &a.country, &a.industry).cmp(&(b.year, &b.country, &b.industry))
        });
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct countries present in the table.
    pub fn countries(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.country.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// ParticipationRecord – one row of the derived participation table
// ---------------------------------------------------------------------------

/// GVC participation indices of one country/industry in one year.
///
/// `gvc`, `gvc_simple` and `gvc_complex` are always the elementwise sums of
/// their forward/backward counterparts; build records through
/// [`ParticipationRecord::new`] to keep that true.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationRecord {
    pub year: i32,
    pub country: String,
    pub industry: String,
    pub forward: f64,
    pub forward_simple: f64,
    pub forward_complex: f64,
    pub backward: f64,
    pub backward_simple: f64,
    pub backward_complex: f64,
    pub gvc: f64,
    pub gvc_simple: f64,
    pub gvc_complex: f64,
}

/// Raw forward/backward indices as read from the source table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Linkages {
    pub forward: f64,
    pub forward_simple: f64,
    pub forward_complex: f64,
    pub backward: f64,
    pub backward_simple: f64,
    pub backward_complex: f64,
}

impl ParticipationRecord {
    pub fn new(year: i32, country: String, industry: String, l: Linkages) -> Self {
        Self {
            year,
            country,
            industry,
            forward: l.forward,
            forward_simple: l.forward_simple,
            forward_complex: l.forward_complex,
            backward: l.backward,
            backward_simple: l.backward_simple,
            backward_complex: l.backward_complex,
            gvc: l.forward + l.backward,
            gvc_simple: l.forward_simple + l.backward_simple,
            gvc_complex: l.forward_complex + l.backward_complex,
        }
    }

    pub fn key(&self) -> PanelKey {
        PanelKey {
            year: self.year,
            country: self.country.clone(),
            industry: self.industry.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// MergedRecord / MergedTable
// ---------------------------------------------------------------------------

/// A participation row with the matching emissions value attached.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub participation: ParticipationRecord,
    /// Total CO2 emissions (`CE`); `None` when no emissions row matched.
    pub ce: Option<f64>,
}

impl MergedRecord {
    pub fn year(&self) -> i32 {
        self.participation.year
    }

    pub fn country(&self) -> &str {
        &self.participation.country
    }

    pub fn industry(&self) -> &str {
        &self.participation.industry
    }

    /// Value of a metric column; `CE` may be absent.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        let p = &self.participation;
        match metric {
            Metric::Forward => Some(p.forward),
            Metric::ForwardSimple => Some(p.forward_simple),
            Metric::ForwardComplex => Some(p.forward_complex),
            Metric::Backward => Some(p.backward),
            Metric::BackwardSimple => Some(p.backward_simple),
            Metric::BackwardComplex => Some(p.backward_complex),
            Metric::Gvc => Some(p.gvc),
            Metric::GvcSimple => Some(p.gvc_simple),
            Metric::GvcComplex => Some(p.gvc_complex),
            Metric::Emissions => self.ce,
        }
    }
}

/// The merged panel with pre-computed dimension indices.
#[derive(Debug, Clone, Default)]
pub struct MergedTable {
    pub records: Vec<MergedRecord>,
    pub countries: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    pub industries: BTreeSet<String>,
}

impl MergedTable {
    /// Build dimension indices from the merged rows. Row order is kept.
    pub fn from_records(records: Vec<MergedRecord>) -> Self {
        let mut countries = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut industries = BTreeSet::new();
        for r in &records {
            countries.insert(r.country().to_string());
            years.insert(r.year());
            industries.insert(r.industry().to_string());
        }
        MergedTable {
            records,
            countries,
            years,
            industries,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows that carry an emissions value.
    pub fn matched(&self) -> usize {
        self.records.iter().filter(|r| r.ce.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Metric – the numeric columns of the merged table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "f")]
    Forward,
    #[serde(rename = "fs")]
    ForwardSimple,
    #[serde(rename = "fc")]
    ForwardComplex,
    #[serde(rename = "b")]
    Backward,
    #[serde(rename = "bs")]
    BackwardSimple,
    #[serde(rename = "bc")]
    BackwardComplex,
    #[serde(rename = "gvc")]
    Gvc,
    #[serde(rename = "gvcs")]
    GvcSimple,
    #[serde(rename = "gvcc")]
    GvcComplex,
    #[serde(rename = "CE")]
    Emissions,
}

impl Metric {
    /// Numeric columns in export order (after year, country, industry).
    pub const COLUMNS: [Metric; 10] = [
        Metric::Forward,
        Metric::ForwardSimple,
        Metric::ForwardComplex,
        Metric::Backward,
        Metric::BackwardSimple,
        Metric::BackwardComplex,
        Metric::Gvc,
        Metric::GvcComplex,
        Metric::GvcSimple,
        Metric::Emissions,
    ];

    /// The participation measures offered as dashboard choices.
    pub const PARTICIPATION_CHOICES: [Metric; 4] = [
        Metric::Forward,
        Metric::Backward,
        Metric::GvcSimple,
        Metric::GvcComplex,
    ];

    /// Column name in the exported table.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Forward => "f",
            Metric::ForwardSimple => "fs",
            Metric::ForwardComplex => "fc",
            Metric::Backward => "b",
            Metric::BackwardSimple => "bs",
            Metric::BackwardComplex => "bc",
            Metric::Gvc => "gvc",
            Metric::GvcSimple => "gvcs",
            Metric::GvcComplex => "gvcc",
            Metric::Emissions => "CE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Forward => "Forward Participation",
            Metric::ForwardSimple => "Simple Forward Participation",
            Metric::ForwardComplex => "Complex Forward Participation",
            Metric::Backward => "Backward Participation",
            Metric::BackwardSimple => "Simple Backward Participation",
            Metric::BackwardComplex => "Complex Backward Participation",
            Metric::Gvc => "GVC Participation",
            Metric::GvcSimple => "Simple GVC Participation",
            Metric::GvcComplex => "Complex GVC Participation",
            Metric::Emissions => "Total CO2 Emissions",
        }
    }

    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::COLUMNS.into_iter().find(|m| m.column() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Key columns of the merged table, in export order.
pub const KEY_COLUMNS: [&str; 3] = ["year", "country", "industry"];
