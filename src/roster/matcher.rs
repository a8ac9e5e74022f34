//! Pluggable fuzzy name matching.

/// Decides whether a free-form name refers to a roster member.
pub trait NameMatcher: Send + Sync {
    fn matches(&self, query: &str, candidate: &str) -> bool;
}

/// Minimum normalized length of the shorter name for containment to count.
const MIN_CONTAINED_LEN: usize = 3;

/// Compares names after lowercasing and dropping everything that is not a
/// letter or digit, so `"[SQD] Ace_Pilot"` matches `"acepilot"`.
///
/// Equal normalized names match. Otherwise one must contain the other and the
/// shorter must be at least three characters long.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedMatcher;

impl NormalizedMatcher {
    pub fn normalize(name: &str) -> String {
        name.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl NameMatcher for NormalizedMatcher {
    fn matches(&self, query: &str, candidate: &str) -> bool {
        let query = Self::normalize(query);
        let candidate = Self::normalize(candidate);
        if query.is_empty() || candidate.is_empty() {
            return false;
        }
        if query == candidate {
            return true;
        }

        let (shorter, longer) = if query.chars().count() <= candidate.chars().count() {
            (&query, &candidate)
        } else {
            (&candidate, &query)
        };
        shorter.chars().count() >= MIN_CONTAINED_LEN && longer.contains(shorter.as_str())
    }
}
