use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One prescribed medication as the caller knows it. Strength, dosage and
/// frequency stay free text; name matching downstream is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationData {
    pub id: String,
    pub name: String,
    pub strength: String,
    pub dosage: String,
    pub frequency: String,
    /// Conceptually defaults to oral when absent.
    pub route: Option<String>,
    pub duration_days: Option<u32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub instructions: Option<String>,
}
