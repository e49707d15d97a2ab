use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{FlagCategory, FlagSeverity, RiskLevel, ValidationMethod};

/// One explainable safety concern raised by an evaluator.
///
/// Pair findings (drug interactions) carry the representative drug's id and
/// a combined display name such as "Warfarin + NSAID".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFlag {
    pub severity: FlagSeverity,
    pub category: FlagCategory,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub medication_id: String,
    pub medication_name: String,
    pub requires_physician_review: bool,
    pub references: Option<Vec<String>>,
}

/// Outcome of validating one regimen. Created fresh per call and never
/// mutated afterwards; `is_safe` is false exactly when a critical flag
/// is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_safe: bool,
    pub overall_risk_level: RiskLevel,
    pub flags: Vec<ValidationFlag>,
    pub validated_at: DateTime<Utc>,
    pub validation_method: ValidationMethod,
    pub summary: String,
}

/// Persisted validation row (flags stored separately).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredValidation {
    pub id: Uuid,
    pub patient_id: String,
    pub is_safe: bool,
    pub overall_risk_level: RiskLevel,
    pub validation_method: ValidationMethod,
    pub summary: String,
    pub validated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Persisted flag row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredValidationFlag {
    pub id: Uuid,
    pub validation_id: Uuid,
    pub medication_id: Option<String>,
    pub medication_name: String,
    pub severity: FlagSeverity,
    pub category: FlagCategory,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub requires_physician_review: bool,
    pub references: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate view over one patient's validation history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_validations: i64,
    pub critical_count: i64,
    pub warning_count: i64,
    pub safe_count: i64,
    pub last_validated: Option<DateTime<Utc>>,
}
