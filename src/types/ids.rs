//! Newtype wrappers for domain identifiers.
//!
//! These types keep team names, era indices and leaderboard sort keys from being
//! mixed up with each other or with arbitrary strings and integers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The display name of a squadron, as it appears on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(pub String);

impl TeamName {
    pub fn new(s: impl Into<String>) -> Self {
        TeamName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another name.
    ///
    /// Surrounding whitespace is ignored on both sides. Leaderboard markup
    /// frequently pads names, and users type them in any case.
    pub fn matches(&self, other: &str) -> bool {
        let ours = self.0.trim();
        let theirs = other.trim();
        ours.eq_ignore_ascii_case(theirs) || ours.to_lowercase() == theirs.to_lowercase()
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TeamName {
    fn from(s: String) -> Self {
        TeamName(s)
    }
}

impl From<&str> for TeamName {
    fn from(s: &str) -> Self {
        TeamName(s.to_string())
    }
}

/// A scoring epoch. The leaderboard ranks by a per-era cumulative field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EraIndex(pub u8);

impl EraIndex {
    /// The sort key the leaderboard uses to rank by this era.
    pub fn sort_key(self) -> SortKey {
        SortKey(format!("dr_era{}", self.0))
    }
}

impl fmt::Display for EraIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "era {}", self.0)
    }
}

impl From<u8> for EraIndex {
    fn from(n: u8) -> Self {
        EraIndex(n)
    }
}

/// A leaderboard sort key, passed verbatim to the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortKey(pub String);

impl SortKey {
    pub fn new(s: impl Into<String>) -> Self {
        SortKey(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1-based leaderboard page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(pub u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn next(self) -> PageNumber {
        PageNumber(self.0 + 1)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_name_matches_ignoring_case_and_padding() {
        let name = TeamName::new("Pirates of the Sky");
        assert!(name.matches("pirates of the sky"));
        assert!(name.matches("  PIRATES OF THE SKY "));
        assert!(!name.matches("Pirates of the Sea"));
    }

    #[test]
    fn team_name_matches_non_ascii() {
        let name = TeamName::new("Вороны");
        assert!(name.matches("вороны"));
    }

    #[test]
    fn era_sort_key_format() {
        assert_eq!(EraIndex(5).sort_key().as_str(), "dr_era5");
        assert_eq!(EraIndex(12).sort_key().as_str(), "dr_era12");
    }

    #[test]
    fn page_number_navigation() {
        assert_eq!(PageNumber(3).next(), PageNumber(4));
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&TeamName::new("ABC")).unwrap();
        assert_eq!(json, "\"ABC\"");
        let era: EraIndex = serde_json::from_str("7").unwrap();
        assert_eq!(era, EraIndex(7));
    }
}
