use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad grouping of the 56 WIOD sectors used by the industry-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    Agriculture,
    Mining,
    Manufacturing,
    Service,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Agriculture,
        Classification::Manufacturing,
        Classification::Service,
        Classification::Mining,
    ];

    /// Classify a detailed sector code (`C01`..`C56`). Aggregate labels and
    /// codes outside the range have no classification.
    pub fn from_industry(industry: &str) -> Option<Self> {
        match sector_number(industry)? {
            1..=3 => Some(Classification::Agriculture),
            4 => Some(Classification::Mining),
            5..=23 => Some(Classification::Manufacturing),
            24..=56 => Some(Classification::Service),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Classification::Agriculture => "Agriculture",
            Classification::Mining => "Mining",
            Classification::Manufacturing => "Manufacturing",
            Classification::Service => "Service",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse `Cnn` into `nn`.
pub fn sector_number(industry: &str) -> Option<u32> {
    let digits = industry.strip_prefix('C')?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n >= 1)
}

/// Sector code for the 1-based position `n`: `1 → C01`.
pub fn sector_code(n: usize) -> String {
    format!("C{n:02}")
}

/// Whether an industry value is a detailed sector code rather than an
/// aggregate label such as `Total` or `manufacture`.
pub fn is_detailed(industry: &str) -> bool {
    sector_number(industry).is_some()
}

pub fn is_aggregate(industry: &str) -> bool {
    !is_detailed(industry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(Classification::from_industry("C01"), Some(Classification::Agriculture));
        assert_eq!(Classification::from_industry("C03"), Some(Classification::Agriculture));
        assert_eq!(Classification::from_industry("C04"), Some(Classification::Mining));
        assert_eq!(Classification::from_industry("C05"), Some(Classification::Manufacturing));
        assert_eq!(Classification::from_industry("C23"), Some(Classification::Manufacturing));
        assert_eq!(Classification::from_industry("C24"), Some(Classification::Service));
        assert_eq!(Classification::from_industry("C56"), Some(Classification::Service));
        assert_eq!(Classification::from_industry("C57"), None);
        assert_eq!(Classification::from_industry("Total"), None);
    }

    #[test]
    fn aggregates_are_not_detailed() {
        assert!(is_aggregate("all service"));
        assert!(is_aggregate("C1"));
        assert!(is_detailed("C10"));
        assert!(is_aggregate("C00"));
        assert_eq!(sector_number("C00"), None);
        assert_eq!(sector_number("C99"), Some(99));
        assert_eq!(sector_code(7), "C07");
    }
}
