//! Regimen validation entry point.
//!
//! Owns the preconditions and strategy selection. Past the precondition
//! checks validation cannot fail — the reasoner degrades internally — so
//! callers only ever handle the two input errors.

use tracing;

use super::reasoner::ClinicalReasoner;
use super::rules::RuleBasedEvaluator;
use super::ValidationError;
use crate::models::{MedicationData, PatientProfile, RiskLevel, ValidationResult};

pub struct RegimenValidator {
    reasoner: Option<ClinicalReasoner>,
    rules: RuleBasedEvaluator,
}

impl RegimenValidator {
    /// Build a validator. Passing None leaves only the rule-based path.
    pub fn new(reasoner: Option<ClinicalReasoner>) -> Self {
        Self {
            reasoner,
            rules: RuleBasedEvaluator::new(),
        }
    }

    pub fn with_reasoner(reasoner: ClinicalReasoner) -> Self {
        Self::new(Some(reasoner))
    }

    /// Validator without generative capability; every call evaluates
    /// against the deterministic rules.
    pub fn rule_based_only() -> Self {
        Self::new(None)
    }

    /// Validate a full regimen for one patient.
    pub fn validate(
        &self,
        medications: &[MedicationData],
        patient: &PatientProfile,
    ) -> Result<ValidationResult, ValidationError> {
        if medications.is_empty() {
            return Err(ValidationError::EmptyRegimen);
        }
        if patient.date_of_birth.is_none() {
            return Err(ValidationError::IncompletePatientProfile);
        }

        // Resolve age once so both strategies see identical demographics.
        let mut enriched = patient.clone();
        enriched.age = enriched.resolved_age();

        let result = match &self.reasoner {
            Some(reasoner) => reasoner.evaluate(medications, &enriched),
            None => {
                tracing::debug!("No generative reasoner configured, using rule-based evaluation");
                self.rules.evaluate(medications, &enriched)
            }
        };

        tracing::info!(
            medication_count = medications.len(),
            flag_count = result.flags.len(),
            risk_level = result.overall_risk_level.as_str(),
            method = result.validation_method.as_str(),
            "Regimen validation completed"
        );

        Ok(result)
    }

    /// Validate a single medication in isolation.
    pub fn validate_single(
        &self,
        medication: &MedicationData,
        patient: &PatientProfile,
    ) -> Result<ValidationResult, ValidationError> {
        self.validate(std::slice::from_ref(medication), patient)
    }

    /// Condensed yes/no check before administration. Conservative: any
    /// validation error reads as unsafe.
    pub fn quick_safety_check(
        &self,
        medications: &[MedicationData],
        patient: &PatientProfile,
    ) -> bool {
        match self.validate(medications, patient) {
            Ok(result) => result.is_safe && result.overall_risk_level != RiskLevel::Critical,
            Err(e) => {
                tracing::warn!(error = %e, "Quick safety check rejected input");
                false
            }
        }
    }
}
