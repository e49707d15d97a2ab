//! Generative clinical reasoning with rule-based degradation.

use chrono::Utc;
use tracing;

use super::parser::parse_validation_response;
use super::prompt::build_clinical_prompt;
use super::rules::{derive_risk_level, RuleBasedEvaluator};
use super::ReasonerError;
use crate::genai::{GenerationOptions, TextGenerator};
use crate::models::{
    MedicationData, PatientProfile, RiskLevel, ValidationMethod, ValidationResult,
};

/// Generative evaluation strategy.
///
/// Wraps any [`TextGenerator`] and absorbs every failure past the
/// orchestrator's preconditions by degrading to the deterministic rule
/// engine, so callers always get a usable result.
pub struct ClinicalReasoner {
    generator: Box<dyn TextGenerator + Send + Sync>,
    options: GenerationOptions,
    fallback: RuleBasedEvaluator,
}

impl ClinicalReasoner {
    pub fn new(generator: Box<dyn TextGenerator + Send + Sync>) -> Self {
        Self {
            generator,
            options: GenerationOptions::default(),
            fallback: RuleBasedEvaluator::new(),
        }
    }

    /// Override the sampling options for the generate call.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluate a regimen. Never fails: any generative-path error falls
    /// back to rule-based evaluation.
    pub fn evaluate(
        &self,
        medications: &[MedicationData],
        patient: &PatientProfile,
    ) -> ValidationResult {
        match self.generative_evaluation(medications, patient) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    medication_count = medications.len(),
                    "Generative validation failed, falling back to rule-based evaluation"
                );
                self.fallback.evaluate(medications, patient)
            }
        }
    }

    fn generative_evaluation(
        &self,
        medications: &[MedicationData],
        patient: &PatientProfile,
    ) -> Result<ValidationResult, ReasonerError> {
        let age = patient
            .resolved_age()
            .ok_or(ReasonerError::MissingDemographics)?;

        let prompt = build_clinical_prompt(medications, patient, age);
        let response = self.generator.generate(&prompt, &self.options)?;
        let parsed = parse_validation_response(&response)?;

        // The model's own risk assessment is advisory; both strategies
        // derive the published level from the flag set.
        let overall_risk_level = derive_risk_level(&parsed.flags);

        Ok(ValidationResult {
            is_safe: overall_risk_level != RiskLevel::Critical,
            overall_risk_level,
            flags: parsed.flags,
            validated_at: Utc::now(),
            validation_method: ValidationMethod::AiClinicalNlp,
            summary: parsed.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::MockTextGenerator;
    use crate::models::FlagSeverity;
    use chrono::NaiveDate;

    fn patient_aged(age: u32) -> PatientProfile {
        PatientProfile {
            id: "patient-1".into(),
            full_name: "Test Patient".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1960, 1, 1),
            age: Some(age),
            weight_kg: None,
            height_cm: None,
            known_conditions: vec![],
            allergies: vec![],
            chronic_conditions: vec![],
        }
    }

    fn med(id: &str, name: &str) -> MedicationData {
        MedicationData {
            id: id.into(),
            name: name.into(),
            strength: "5mg".into(),
            dosage: "1 tablet".into(),
            frequency: "once daily".into(),
            route: None,
            duration_days: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            instructions: None,
        }
    }

    fn response_with_flag(severity: &str, claimed_risk: &str, claimed_safe: bool) -> String {
        format!(
            r#"{{
                "is_safe": {claimed_safe},
                "overall_risk_level": "{claimed_risk}",
                "flags": [{{
                    "severity": "{severity}",
                    "category": "interaction",
                    "title": "Model Finding",
                    "description": "A concern spotted by the model.",
                    "recommendation": "Review with a physician.",
                    "medication_id": "m1",
                    "medication_name": "Testazol",
                    "requires_physician_review": true
                }}]
            }}"#
        )
    }

    #[test]
    fn successful_generation_marks_ai_method() {
        let reasoner = ClinicalReasoner::new(Box::new(MockTextGenerator::new(
            &response_with_flag("high", "warning", true),
        )));
        let result = reasoner.evaluate(&[med("m1", "Testazol")], &patient_aged(40));

        assert_eq!(result.validation_method, ValidationMethod::AiClinicalNlp);
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.overall_risk_level, RiskLevel::Warning);
        assert!(result.is_safe);
    }

    #[test]
    fn risk_level_recomputed_from_flags() {
        // The model claims "safe" while reporting a critical flag; the
        // published result must reflect the flag.
        let reasoner = ClinicalReasoner::new(Box::new(MockTextGenerator::new(
            &response_with_flag("critical", "safe", true),
        )));
        let result = reasoner.evaluate(&[med("m1", "Testazol")], &patient_aged(40));

        assert_eq!(result.overall_risk_level, RiskLevel::Critical);
        assert!(!result.is_safe);
        assert_eq!(result.validation_method, ValidationMethod::AiClinicalNlp);
    }

    #[test]
    fn clean_flag_list_is_safe() {
        let reasoner = ClinicalReasoner::new(Box::new(MockTextGenerator::new(
            r#"{"is_safe": false, "overall_risk_level": "critical", "flags": []}"#,
        )));
        let result = reasoner.evaluate(&[med("m1", "Vitamin D")], &patient_aged(40));

        assert_eq!(result.overall_risk_level, RiskLevel::Safe);
        assert!(result.is_safe);
    }

    #[test]
    fn generator_failure_falls_back_to_rules() {
        let reasoner = ClinicalReasoner::new(Box::new(MockTextGenerator::failing()));
        let result = reasoner.evaluate(&[med("m1", "Digoxin")], &patient_aged(80));

        assert_eq!(result.validation_method, ValidationMethod::RuleBased);
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.flags[0].severity, FlagSeverity::Medium);
    }

    #[test]
    fn malformed_response_falls_back_to_rules() {
        let reasoner = ClinicalReasoner::new(Box::new(MockTextGenerator::new(
            "I am unable to produce JSON today.",
        )));
        let result = reasoner.evaluate(
            &[med("m1", "Warfarin"), med("m2", "Ibuprofen")],
            &patient_aged(40),
        );

        assert_eq!(result.validation_method, ValidationMethod::RuleBased);
        assert_eq!(result.overall_risk_level, RiskLevel::Critical);
    }

    #[test]
    fn missing_demographics_falls_back_without_generate() {
        let mut patient = patient_aged(40);
        patient.age = None;
        patient.date_of_birth = None;

        let reasoner = ClinicalReasoner::new(Box::new(MockTextGenerator::new(
            &response_with_flag("high", "warning", true),
        )));
        let result = reasoner.evaluate(&[med("m1", "Testazol")], &patient);

        assert_eq!(result.validation_method, ValidationMethod::RuleBased);
        assert!(result.flags.is_empty());
    }
}
