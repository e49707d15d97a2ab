//! Clinical prompt construction for the generative reasoner.

use crate::demographics::AgeCategory;
use crate::models::{MedicationData, PatientProfile};

/// Build the validation prompt for one regimen.
///
/// The caller resolves `age` up front so the prompt and the rule engine
/// work from the same demographics. Profile lines with no data are left
/// out entirely rather than rendered as "none".
pub fn build_clinical_prompt(
    medications: &[MedicationData],
    patient: &PatientProfile,
    age: u32,
) -> String {
    let category = AgeCategory::from_age(age);

    format!(
        r#"You are a clinical pharmacology AI assistant specializing in medication safety validation. Analyze the following medication regimen for potential safety concerns.

## PATIENT PROFILE
{profile}

## MEDICATION REGIMEN TO VALIDATE
{regimen}

## VALIDATION REQUIREMENTS
Analyze this regimen and identify ALL potential safety concerns in the following categories:

1. **DOSAGE VALIDATION**
   - Is the dosage appropriate for the patient's age category ({category})?
   - Does it fall within the therapeutic range for this medication?
   - Are there any age-specific dosing considerations?
   - Is the dose potentially toxic or sub-therapeutic?

2. **AGE-SPECIFIC CONCERNS**
   - Are these medications appropriate for a {age}-year-old {category}?
   - Are there pediatric or geriatric dosing adjustments needed?
   - Are there contraindications based on age?

3. **DRUG INTERACTIONS**
   - Identify potential interactions between the prescribed medications
   - Specify the severity (critical, high, medium, low)
   - Explain the mechanism and clinical significance

4. **CONTRAINDICATIONS**
   - Check for contraindications with known conditions
   - Identify allergy concerns
   - Note any disease-state contraindications

5. **FREQUENCY & DURATION**
   - Is the dosing frequency appropriate?
   - Is the duration appropriate for the condition?
   - Are there maximum duration limits being exceeded?

## RESPONSE FORMAT
Return a JSON object with this exact structure:
{{
  "is_safe": boolean,
  "overall_risk_level": "safe" | "caution" | "warning" | "critical",
  "flags": [
    {{
      "severity": "critical" | "high" | "medium" | "low" | "info",
      "category": "dosage" | "age" | "interaction" | "contraindication" | "duration" | "frequency",
      "title": "Brief title of the concern",
      "description": "Detailed explanation of the safety concern",
      "recommendation": "Specific actionable recommendation",
      "medication_id": "id from the list",
      "medication_name": "name of the medication",
      "requires_physician_review": boolean
    }}
  ],
  "summary": "Overall summary of the safety validation"
}}

IMPORTANT:
- Be thorough but clinically accurate
- Flag only legitimate concerns based on established clinical guidelines
- Use evidence-based reasoning
- When in doubt, err on the side of caution
- Return ONLY valid JSON, no additional text"#,
        profile = profile_block(patient, age, category),
        regimen = regimen_block(medications),
        age = age,
        category = category.as_str(),
    )
}

fn profile_block(patient: &PatientProfile, age: u32, category: AgeCategory) -> String {
    let mut lines = vec![format!("- Age: {age} years ({})", category.as_str())];

    if let Some(dob) = patient.date_of_birth {
        lines.push(format!("- Date of Birth: {dob}"));
    }
    if let Some(weight) = patient.weight_kg {
        lines.push(format!("- Weight: {weight} kg"));
    }
    if let Some(height) = patient.height_cm {
        lines.push(format!("- Height: {height} cm"));
    }
    if !patient.known_conditions.is_empty() {
        lines.push(format!(
            "- Known Conditions: {}",
            patient.known_conditions.join(", ")
        ));
    }
    if !patient.allergies.is_empty() {
        lines.push(format!("- Allergies: {}", patient.allergies.join(", ")));
    }
    if !patient.chronic_conditions.is_empty() {
        lines.push(format!(
            "- Chronic Conditions: {}",
            patient.chronic_conditions.join(", ")
        ));
    }

    lines.join("\n")
}

fn regimen_block(medications: &[MedicationData]) -> String {
    medications
        .iter()
        .enumerate()
        .map(|(idx, med)| {
            let duration = med
                .duration_days
                .map(|days| format!("{days} days"))
                .unwrap_or_else(|| "not specified".to_string());
            format!(
                "{}. {}\n   \
                 - Strength: {}\n   \
                 - Dosage: {}\n   \
                 - Frequency: {}\n   \
                 - Route: {}\n   \
                 - Duration: {}\n   \
                 - Instructions: {}",
                idx + 1,
                med.name,
                med.strength,
                med.dosage,
                med.frequency,
                med.route.as_deref().unwrap_or("oral"),
                duration,
                med.instructions.as_deref().unwrap_or("none"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
