//! Deterministic regimen screening rules.
//!
//! Total and side-effect free: no I/O, no failure path. This evaluator is
//! the validation of record whenever the generative reasoner is absent or
//! fails, so its findings must stand on their own.

use chrono::Utc;

use crate::demographics::AgeCategory;
use crate::models::{
    FlagCategory, FlagSeverity, MedicationData, PatientProfile, RiskLevel, ValidationFlag,
    ValidationMethod, ValidationResult,
};

use super::matcher::{MedicationNameMatcher, SubstringNameMatcher};

// ── Substance watch lists ───────────────────────────────────

/// Drugs that commonly need dose adjustment past 65.
static ELDERLY_WATCH_LIST: &[&str] = &[
    "metformin", "digoxin", "warfarin", "lithium",
    "benzodiazepine", "opioid", "nsaid",
];

/// Name fragments identifying antibiotics for course-length checks.
static ANTIBIOTIC_MARKERS: &[&str] = &["antibiotic", "cillin", "mycin"];

static WARFARIN: &[&str] = &["warfarin"];
static NSAIDS: &[&str] = &["ibuprofen", "naproxen", "diclofenac"];
static ACE_INHIBITORS: &[&str] = &["lisinopril", "enalapril", "ramipril"];
static POTASSIUM_SUPPLEMENTS: &[&str] = &["potassium"];

/// Typical antibiotic course ceiling in days. Strictly longer courses flag.
const MAX_ANTIBIOTIC_COURSE_DAYS: u32 = 14;

// ── Interaction table ───────────────────────────────────────

/// A known drug-drug interaction between two substance sets.
struct InteractionRule {
    /// Representative side; its matching medication supplies the flag's id.
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
    severity: FlagSeverity,
    /// Combined display name covering both drugs.
    pair_name: &'static str,
    title: &'static str,
    description: &'static str,
    recommendation: &'static str,
}

fn interaction_rules() -> Vec<InteractionRule> {
    vec![
        InteractionRule {
            primary: WARFARIN,
            secondary: NSAIDS,
            severity: FlagSeverity::Critical,
            pair_name: "Warfarin + NSAID",
            title: "Critical Drug Interaction: Warfarin + NSAID",
            description: "Concurrent use of warfarin and NSAIDs significantly increases bleeding risk.",
            recommendation: "Consider alternative pain management. If combination necessary, increase INR monitoring frequency.",
        },
        InteractionRule {
            primary: ACE_INHIBITORS,
            secondary: POTASSIUM_SUPPLEMENTS,
            severity: FlagSeverity::High,
            pair_name: "ACE Inhibitor + Potassium",
            title: "Drug Interaction: ACE Inhibitor + Potassium",
            description: "ACE inhibitors can increase potassium levels. Concurrent potassium supplementation may cause hyperkalemia.",
            recommendation: "Monitor serum potassium levels regularly. Consider discontinuing potassium supplement if not essential.",
        },
    ]
}

// ── Risk derivation ─────────────────────────────────────────

/// Overall risk from a flag set: the worst severity present wins.
/// `is_safe` is equivalent to the derived level not being critical.
pub fn derive_risk_level(flags: &[ValidationFlag]) -> RiskLevel {
    if flags.iter().any(|f| f.severity == FlagSeverity::Critical) {
        RiskLevel::Critical
    } else if flags.iter().any(|f| f.severity == FlagSeverity::High) {
        RiskLevel::Warning
    } else if flags.iter().any(|f| f.severity == FlagSeverity::Medium) {
        RiskLevel::Caution
    } else {
        RiskLevel::Safe
    }
}

// ── Evaluator ───────────────────────────────────────────────

/// Deterministic evaluator over the fixed rule tables.
pub struct RuleBasedEvaluator {
    matcher: Box<dyn MedicationNameMatcher + Send + Sync>,
}

impl RuleBasedEvaluator {
    pub fn new() -> Self {
        Self {
            matcher: Box::new(SubstringNameMatcher),
        }
    }

    pub fn with_matcher(matcher: Box<dyn MedicationNameMatcher + Send + Sync>) -> Self {
        Self { matcher }
    }

    /// Screen a regimen against the rule tables. Flags accumulate in rule
    /// order: geriatric, pediatric, interactions, antibiotic duration.
    pub fn evaluate(
        &self,
        medications: &[MedicationData],
        patient: &PatientProfile,
    ) -> ValidationResult {
        let mut flags = Vec::new();

        if let Some(age) = patient.resolved_age() {
            let category = AgeCategory::from_age(age);

            // 1. Geriatric dose-adjustment watch list
            if category == AgeCategory::Elderly {
                for med in medications {
                    if self.matcher.matches_any(&med.name, ELDERLY_WATCH_LIST) {
                        flags.push(geriatric_flag(med));
                    }
                }
            }

            // 2. Pediatric dosing verification, every medication
            if matches!(category, AgeCategory::Child | AgeCategory::Infant) {
                for med in medications {
                    flags.push(pediatric_flag(med, age, category));
                }
            }
        }

        // 3. Known interaction pairs (needs at least two medications)
        if medications.len() > 1 {
            for rule in &interaction_rules() {
                if let Some(flag) = self.check_interaction(rule, medications) {
                    flags.push(flag);
                }
            }
        }

        // 4. Antibiotic course length
        for med in medications {
            if let Some(days) = med.duration_days {
                if days > MAX_ANTIBIOTIC_COURSE_DAYS
                    && self.matcher.matches_any(&med.name, ANTIBIOTIC_MARKERS)
                {
                    flags.push(antibiotic_duration_flag(med, days));
                }
            }
        }

        let overall_risk_level = derive_risk_level(&flags);
        let summary = if flags.is_empty() {
            format!(
                "No safety concerns identified for {} medication(s) in rule-based validation.",
                medications.len()
            )
        } else {
            format!(
                "Identified {} potential safety concern(s) that require review.",
                flags.len()
            )
        };

        ValidationResult {
            is_safe: overall_risk_level != RiskLevel::Critical,
            overall_risk_level,
            flags,
            validated_at: Utc::now(),
            validation_method: ValidationMethod::RuleBased,
            summary,
        }
    }

    /// One flag per matched pair, carrying the representative drug's id.
    fn check_interaction(
        &self,
        rule: &InteractionRule,
        medications: &[MedicationData],
    ) -> Option<ValidationFlag> {
        let primary = medications
            .iter()
            .find(|m| self.matcher.matches_any(&m.name, rule.primary))?;
        let has_secondary = medications
            .iter()
            .any(|m| self.matcher.matches_any(&m.name, rule.secondary));
        if !has_secondary {
            return None;
        }

        Some(ValidationFlag {
            severity: rule.severity.clone(),
            category: FlagCategory::Interaction,
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            recommendation: rule.recommendation.to_string(),
            medication_id: primary.id.clone(),
            medication_name: rule.pair_name.to_string(),
            requires_physician_review: true,
            references: None,
        })
    }
}

impl Default for RuleBasedEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

// ── Flag construction ───────────────────────────────────────

fn geriatric_flag(med: &MedicationData) -> ValidationFlag {
    ValidationFlag {
        severity: FlagSeverity::Medium,
        category: FlagCategory::Age,
        title: format!("Geriatric Dosing Consideration for {}", med.name),
        description: format!(
            "{} may require dose adjustment in patients over 65 years old due to reduced renal clearance and increased sensitivity.",
            med.name
        ),
        recommendation:
            "Verify dosing is appropriate for elderly patient. Consider renal function assessment."
                .to_string(),
        medication_id: med.id.clone(),
        medication_name: med.name.clone(),
        requires_physician_review: true,
        references: None,
    }
}

fn pediatric_flag(med: &MedicationData, age: u32, category: AgeCategory) -> ValidationFlag {
    ValidationFlag {
        severity: FlagSeverity::High,
        category: FlagCategory::Age,
        title: format!("Pediatric Dosing Verification Required for {}", med.name),
        description: format!(
            "This medication is prescribed for a {}-year-old {}. Pediatric dosing must be weight-based and verified against pediatric guidelines.",
            age,
            category.as_str()
        ),
        recommendation:
            "Verify dosing is weight-appropriate and follows pediatric guidelines. Consult pediatric dosing references."
                .to_string(),
        medication_id: med.id.clone(),
        medication_name: med.name.clone(),
        requires_physician_review: true,
        references: None,
    }
}

fn antibiotic_duration_flag(med: &MedicationData, days: u32) -> ValidationFlag {
    ValidationFlag {
        severity: FlagSeverity::Medium,
        category: FlagCategory::Duration,
        title: format!("Extended Antibiotic Duration for {}", med.name),
        description: format!(
            "Antibiotic prescribed for {days} days, which exceeds typical treatment duration."
        ),
        recommendation:
            "Verify extended duration is clinically indicated. Consider resistance risk with prolonged therapy."
                .to_string(),
        medication_id: med.id.clone(),
        medication_name: med.name.clone(),
        requires_physician_review: true,
        references: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn flag_with_severity(severity: FlagSeverity) -> ValidationFlag {
        ValidationFlag {
            severity,
            category: FlagCategory::Dosage,
            title: "t".into(),
            description: "d".into(),
            recommendation: "r".into(),
            medication_id: "m".into(),
            medication_name: "m".into(),
            requires_physician_review: false,
            references: None,
        }
    }

    // ── Risk derivation ────────────────────────────────────────

    #[test]
    fn risk_critical_when_any_critical_flag() {
        let flags = vec![
            flag_with_severity(FlagSeverity::Low),
            flag_with_severity(FlagSeverity::Critical),
            flag_with_severity(FlagSeverity::High),
        ];
        assert_eq!(derive_risk_level(&flags), RiskLevel::Critical);
    }

    #[test]
    fn risk_warning_when_high_without_critical() {
        let flags = vec![
            flag_with_severity(FlagSeverity::Medium),
            flag_with_severity(FlagSeverity::High),
        ];
        assert_eq!(derive_risk_level(&flags), RiskLevel::Warning);
    }

    #[test]
    fn risk_caution_when_medium_at_worst() {
        let flags = vec![
            flag_with_severity(FlagSeverity::Low),
            flag_with_severity(FlagSeverity::Medium),
        ];
        assert_eq!(derive_risk_level(&flags), RiskLevel::Caution);
    }

    #[test]
    fn risk_safe_for_low_info_or_empty() {
        assert_eq!(derive_risk_level(&[]), RiskLevel::Safe);
        let flags = vec![
            flag_with_severity(FlagSeverity::Low),
            flag_with_severity(FlagSeverity::Info),
        ];
        assert_eq!(derive_risk_level(&flags), RiskLevel::Safe);
    }

    // ── Geriatric watch list ───────────────────────────────────

    #[test]
    fn geriatric_flag_for_watched_drug_only() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![med("m1", "Metformin 500mg"), med("m2", "Paracetamol")];
        let result = evaluator.evaluate(&meds, &patient_aged(70));

        assert_eq!(result.flags.len(), 1);
        let flag = &result.flags[0];
        assert_eq!(flag.severity, FlagSeverity::Medium);
        assert_eq!(flag.category, FlagCategory::Age);
        assert_eq!(flag.medication_id, "m1");
        assert!(flag.title.contains("Geriatric Dosing Consideration"));
        assert!(flag.requires_physician_review);
        assert_eq!(result.overall_risk_level, RiskLevel::Caution);
        assert!(result.is_safe);
    }

    #[test]
    fn no_geriatric_flag_under_65() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![med("m1", "Metformin 500mg")];
        let result = evaluator.evaluate(&meds, &patient_aged(64));
        assert!(result.flags.is_empty());
    }

    // ── Pediatric verification ─────────────────────────────────

    #[test]
    fn pediatric_flag_for_every_medication() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![
            med("m1", "Amoxicillin"),
            med("m2", "Paracetamol"),
            med("m3", "Cetirizine"),
        ];
        let result = evaluator.evaluate(&meds, &patient_aged(8));

        assert_eq!(result.flags.len(), 3);
        for flag in &result.flags {
            assert_eq!(flag.severity, FlagSeverity::High);
            assert_eq!(flag.category, FlagCategory::Age);
            assert!(flag.requires_physician_review);
            assert!(flag.description.contains("8-year-old child"));
        }
        assert_eq!(result.overall_risk_level, RiskLevel::Warning);
        assert!(result.is_safe);
    }

    #[test]
    fn infant_wording_in_pediatric_flag() {
        let evaluator = RuleBasedEvaluator::new();
        let result = evaluator.evaluate(&[med("m1", "Paracetamol")], &patient_aged(1));
        assert_eq!(result.flags.len(), 1);
        assert!(result.flags[0].description.contains("1-year-old infant"));
    }

    #[test]
    fn no_pediatric_flag_for_adolescent() {
        let evaluator = RuleBasedEvaluator::new();
        let result = evaluator.evaluate(&[med("m1", "Paracetamol")], &patient_aged(14));
        assert!(result.flags.is_empty());
    }

    // ── Interaction pairs ──────────────────────────────────────

    #[test]
    fn warfarin_nsaid_interaction_is_critical() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![
            med("m1", "Warfarin Sodium 5mg"),
            med("m2", "Ibuprofen 400mg"),
        ];
        let result = evaluator.evaluate(&meds, &patient_aged(72));

        let critical: Vec<_> = result
            .flags
            .iter()
            .filter(|f| f.severity == FlagSeverity::Critical)
            .collect();
        assert_eq!(critical.len(), 1);
        let flag = critical[0];
        assert_eq!(flag.category, FlagCategory::Interaction);
        assert_eq!(flag.medication_id, "m1");
        assert_eq!(flag.medication_name, "Warfarin + NSAID");
        assert!(flag.title.contains("Warfarin + NSAID"));

        // Geriatric warfarin flag precedes the interaction flag in rule order.
        assert_eq!(result.flags.len(), 2);
        assert_eq!(result.flags[0].severity, FlagSeverity::Medium);

        assert_eq!(result.overall_risk_level, RiskLevel::Critical);
        assert!(!result.is_safe);
    }

    #[test]
    fn ace_inhibitor_potassium_interaction_is_high() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![
            med("m1", "Lisinopril 10mg"),
            med("m2", "Potassium Chloride"),
        ];
        let result = evaluator.evaluate(&meds, &patient_aged(50));

        assert_eq!(result.flags.len(), 1);
        let flag = &result.flags[0];
        assert_eq!(flag.severity, FlagSeverity::High);
        assert_eq!(flag.medication_name, "ACE Inhibitor + Potassium");
        assert_eq!(flag.medication_id, "m1");
        assert_eq!(result.overall_risk_level, RiskLevel::Warning);
        assert!(result.is_safe);
    }

    #[test]
    fn ramipril_counts_as_ace_inhibitor() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![med("m1", "Ramipril 5mg"), med("m2", "Potassium citrate")];
        let result = evaluator.evaluate(&meds, &patient_aged(50));
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.flags[0].medication_id, "m1");
    }

    #[test]
    fn interaction_needs_at_least_two_medications() {
        let evaluator = RuleBasedEvaluator::new();
        let result = evaluator.evaluate(&[med("m1", "Warfarin")], &patient_aged(40));
        assert!(result.flags.is_empty());
        assert!(result.is_safe);
    }

    // ── Antibiotic duration ────────────────────────────────────

    #[test]
    fn extended_antibiotic_course_flags() {
        let evaluator = RuleBasedEvaluator::new();
        let mut long_course = med("m1", "Amoxicillin 500mg");
        long_course.duration_days = Some(21);
        let result = evaluator.evaluate(&[long_course], &patient_aged(40));

        assert_eq!(result.flags.len(), 1);
        let flag = &result.flags[0];
        assert_eq!(flag.severity, FlagSeverity::Medium);
        assert_eq!(flag.category, FlagCategory::Duration);
        assert!(flag.description.contains("21 days"));
        assert_eq!(result.overall_risk_level, RiskLevel::Caution);
    }

    #[test]
    fn fourteen_day_course_does_not_flag() {
        let evaluator = RuleBasedEvaluator::new();
        let mut course = med("m1", "Azithromycin");
        course.duration_days = Some(14);
        let result = evaluator.evaluate(&[course], &patient_aged(40));
        assert!(result.flags.is_empty());
    }

    #[test]
    fn long_course_of_non_antibiotic_does_not_flag() {
        let evaluator = RuleBasedEvaluator::new();
        let mut course = med("m1", "Atorvastatin");
        course.duration_days = Some(90);
        let result = evaluator.evaluate(&[course], &patient_aged(40));
        assert!(result.flags.is_empty());
    }

    // ── Summaries and totals ───────────────────────────────────

    #[test]
    fn clean_regimen_summary_counts_medications() {
        let evaluator = RuleBasedEvaluator::new();
        let meds = vec![med("m1", "Paracetamol"), med("m2", "Vitamin D")];
        let result = evaluator.evaluate(&meds, &patient_aged(30));

        assert!(result.is_safe);
        assert_eq!(result.overall_risk_level, RiskLevel::Safe);
        assert!(result.flags.is_empty());
        assert_eq!(
            result.summary,
            "No safety concerns identified for 2 medication(s) in rule-based validation."
        );
        assert_eq!(result.validation_method, ValidationMethod::RuleBased);
    }

    #[test]
    fn concern_summary_counts_flags() {
        let evaluator = RuleBasedEvaluator::new();
        let result = evaluator.evaluate(&[med("m1", "Digoxin")], &patient_aged(80));
        assert_eq!(
            result.summary,
            "Identified 1 potential safety concern(s) that require review."
        );
    }

    #[test]
    fn missing_demographics_skips_age_rules() {
        let evaluator = RuleBasedEvaluator::new();
        let mut patient = patient_aged(70);
        patient.age = None;
        patient.date_of_birth = None;
        let result = evaluator.evaluate(&[med("m1", "Metformin")], &patient);
        assert!(result.flags.is_empty());
        assert!(result.is_safe);
    }

    // ── Matcher seam ───────────────────────────────────────────

    struct ExactNameMatcher;

    impl MedicationNameMatcher for ExactNameMatcher {
        fn matches(&self, medication_name: &str, pattern: &str) -> bool {
            medication_name.eq_ignore_ascii_case(pattern)
        }
    }

    #[test]
    fn injected_matcher_changes_rule_outcomes() {
        let strict = RuleBasedEvaluator::with_matcher(Box::new(ExactNameMatcher));
        let meds = vec![
            med("m1", "Warfarin Sodium 5mg"),
            med("m2", "Ibuprofen 400mg"),
        ];
        // Substring matching flags this pair; exact matching does not.
        let result = strict.evaluate(&meds, &patient_aged(40));
        assert!(result.flags.is_empty());

        let exact_names = vec![med("m1", "Warfarin"), med("m2", "Ibuprofen")];
        let result = strict.evaluate(&exact_names, &patient_aged(40));
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.flags[0].severity, FlagSeverity::Critical);
    }
}
