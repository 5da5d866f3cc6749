use std::collections::BTreeSet;

use super::model::{MergedRecord, MergedTable};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per panel dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state.
///
/// `None` means "no filter" for that dimension. `Some` with an empty set
/// means nothing is selected, so no row passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelFilter {
    pub years: Option<BTreeSet<i32>>,
    pub countries: Option<BTreeSet<String>>,
    pub industries: Option<BTreeSet<String>>,
}

impl PanelFilter {
    pub fn year(year: i32) -> Self {
        Self {
            years: Some(BTreeSet::from([year])),
            ..Self::default()
        }
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = Some(countries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries = Some(industries.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self, rec: &MergedRecord) -> bool {
        fn passes<T: Ord + ?Sized, O: Ord + std::borrow::Borrow<T>>(
            sel: &Option<BTreeSet<O>>,
            value: &T,
        ) -> bool {
            match sel {
                None => true,
                Some(set) => set.contains(value),
            }
        }
        passes(&self.years, &rec.year())
            && passes(&self.countries, rec.country())
            && passes(&self.industries, rec.industry())
    }
}

/// Return indices of records that pass the filter, in table order.
pub fn filtered_indices(table: &MergedTable, filter: &PanelFilter) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Records that pass the filter.
pub fn filtered<'a>(table: &'a MergedTable, filter: &'a PanelFilter) -> impl Iterator<Item = &'a MergedRecord> + 'a {
    table.records.iter().filter(move |r| filter.matches(r))
}
