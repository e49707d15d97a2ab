use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AlertSeverity, AlertStatus};

/// A persistent patient-facing alert with its own lifecycle, independent
/// of the validation result that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAlert {
    pub id: Uuid,
    pub patient_id: String,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub alert_type: String,
    pub related_id: Option<String>,
    /// Structured context (flag category, medication name, validation
    /// method and timestamp) for downstream display.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}
