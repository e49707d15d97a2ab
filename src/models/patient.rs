use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::demographics;

/// Demographic and clinical context for one patient, as supplied by the
/// caller. Identifiers are opaque strings owned by the surrounding app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Whole years. When absent it is derived from `date_of_birth`.
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub known_conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
}

impl PatientProfile {
    /// Age in whole years, preferring an explicit age over derivation
    /// from the date of birth.
    pub fn resolved_age(&self) -> Option<u32> {
        self.age
            .or_else(|| self.date_of_birth.map(demographics::age_years))
    }
}
