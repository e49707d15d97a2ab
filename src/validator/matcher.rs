//! Medication name matching seam for the rule tables.
//!
//! Free-text prescription names ("Warfarin Sodium 5mg tablets") are matched
//! against lowercase substance patterns ("warfarin"). The trait isolates
//! that policy so a normalized-vocabulary matcher can replace it without
//! touching the rules.

/// Decides whether a free-text medication name refers to a watched substance.
pub trait MedicationNameMatcher {
    fn matches(&self, medication_name: &str, pattern: &str) -> bool;

    fn matches_any(&self, medication_name: &str, patterns: &[&str]) -> bool {
        patterns.iter().any(|p| self.matches(medication_name, p))
    }
}

/// Case-insensitive substring containment.
pub struct SubstringNameMatcher;

impl MedicationNameMatcher for SubstringNameMatcher {
    fn matches(&self, medication_name: &str, pattern: &str) -> bool {
        medication_name
            .to_lowercase()
            .contains(&pattern.to_lowercase())
    }
}
