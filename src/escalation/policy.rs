//! Escalation of validation findings into persistent alerts.
//!
//! Fires per flag, critical and high severities only — lower severities
//! stay inside the validation result. One failed write never blocks the
//! remaining flags; callers inspect the report for partial outcomes.

use chrono::Utc;
use tracing;
use uuid::Uuid;

use super::EscalationError;
use crate::models::{
    AlertSeverity, AlertStatus, FlagSeverity, HealthAlert, ValidationFlag, ValidationResult,
};

/// Alert type under which escalated validation findings are filed.
pub const MEDICATION_SAFETY_ALERT_TYPE: &str = "medication_safety";

/// Persistence boundary for escalated alerts.
pub trait AlertStore {
    fn insert(&self, alert: &HealthAlert) -> Result<(), EscalationError>;
}

/// Outcome of escalating one validation result.
#[derive(Debug, Default)]
pub struct EscalationReport {
    /// Ids of alerts written, in flag order.
    pub created: Vec<Uuid>,
    pub failed: Vec<FailedEscalation>,
}

#[derive(Debug)]
pub struct FailedEscalation {
    pub flag_title: String,
    pub medication_name: String,
    pub error: String,
}

impl EscalationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_attempted(&self) -> usize {
        self.created.len() + self.failed.len()
    }
}

/// Escalate every critical and high flag of a result into the store.
pub fn escalate_validation(
    patient_id: &str,
    result: &ValidationResult,
    store: &dyn AlertStore,
) -> EscalationReport {
    let mut report = EscalationReport::default();

    for flag in &result.flags {
        let Some(severity) = alert_severity(&flag.severity) else {
            continue;
        };

        let alert = build_alert(patient_id, result, flag, severity);
        match store.insert(&alert) {
            Ok(()) => report.created.push(alert.id),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    severity = flag.severity.as_str(),
                    category = flag.category.as_str(),
                    "Failed to persist escalated safety alert"
                );
                report.failed.push(FailedEscalation {
                    flag_title: flag.title.clone(),
                    medication_name: flag.medication_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        created = report.created.len(),
        failed = report.failed.len(),
        "Validation escalation finished"
    );
    report
}

/// Map flag severity onto the alert scale. Anything below high does not
/// escalate.
fn alert_severity(severity: &FlagSeverity) -> Option<AlertSeverity> {
    match severity {
        FlagSeverity::Critical => Some(AlertSeverity::Critical),
        FlagSeverity::High => Some(AlertSeverity::Warning),
        _ => None,
    }
}

fn build_alert(
    patient_id: &str,
    result: &ValidationResult,
    flag: &ValidationFlag,
    severity: AlertSeverity,
) -> HealthAlert {
    HealthAlert {
        id: Uuid::new_v4(),
        patient_id: patient_id.to_string(),
        title: format!("Safety Validation: {}", flag.title),
        message: format!(
            "{}\n\nRecommendation: {}",
            flag.description, flag.recommendation
        ),
        severity,
        status: AlertStatus::Pending,
        alert_type: MEDICATION_SAFETY_ALERT_TYPE.to_string(),
        related_id: (!flag.medication_id.is_empty()).then(|| flag.medication_id.clone()),
        metadata: serde_json::json!({
            "category": flag.category.as_str(),
            "medication_name": flag.medication_name,
            "requires_physician_review": flag.requires_physician_review,
            "validation_method": result.validation_method.as_str(),
            "validated_at": result.validated_at.to_rfc3339(),
        }),
        created_at: Utc::now(),
        acknowledged_at: None,
        resolved_at: None,
    }
}
