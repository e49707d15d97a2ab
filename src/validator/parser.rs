//! Parsing and shape validation of generative validation responses.

use std::str::FromStr;

use super::ReasonerError;
use crate::models::{RiskLevel, ValidationFlag};

/// Summary used when the model omits one.
const DEFAULT_SUMMARY: &str = "Validation completed successfully";

/// A model response that passed shape validation. The reasoner still
/// re-derives risk level and safety from the flags before publishing.
#[derive(Debug)]
pub struct ParsedValidation {
    pub is_safe: bool,
    pub overall_risk_level: RiskLevel,
    pub flags: Vec<ValidationFlag>,
    pub summary: String,
}

/// Parse the model's JSON reply into a shape-checked validation.
///
/// Strict on the flag list: one malformed flag rejects the whole
/// response, so a partially-hallucinated set of findings can never pass
/// as a completed validation.
pub fn parse_validation_response(response: &str) -> Result<ParsedValidation, ReasonerError> {
    let cleaned = strip_code_fences(response);

    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| ReasonerError::JsonParsing(e.to_string()))?;

    let is_safe = value
        .get("is_safe")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| shape("is_safe must be a boolean"))?;

    let risk_str = value
        .get("overall_risk_level")
        .and_then(|v| v.as_str())
        .ok_or_else(|| shape("overall_risk_level must be a string"))?;
    let overall_risk_level = RiskLevel::from_str(risk_str)
        .map_err(|_| shape(&format!("unknown overall_risk_level: {risk_str}")))?;

    let raw_flags = value
        .get("flags")
        .and_then(|v| v.as_array())
        .ok_or_else(|| shape("flags must be an array"))?;

    let mut flags = Vec::with_capacity(raw_flags.len());
    for (idx, raw) in raw_flags.iter().enumerate() {
        flags.push(parse_flag(idx, raw)?);
    }

    let summary = value
        .get("summary")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    Ok(ParsedValidation {
        is_safe,
        overall_risk_level,
        flags,
        summary,
    })
}

fn parse_flag(idx: usize, raw: &serde_json::Value) -> Result<ValidationFlag, ReasonerError> {
    let flag: ValidationFlag =
        serde_json::from_value(raw.clone()).map_err(|e| shape(&format!("flag {idx}: {e}")))?;

    if flag.title.trim().is_empty()
        || flag.description.trim().is_empty()
        || flag.recommendation.trim().is_empty()
    {
        return Err(shape(&format!(
            "flag {idx}: title, description and recommendation must be non-empty"
        )));
    }

    Ok(flag)
}

/// Strip markdown code fences the model may wrap around its JSON.
fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed.to_string();
    };

    let inner = inner.trim_end();
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim().to_string()
}

fn shape(msg: &str) -> ReasonerError {
    ReasonerError::ShapeViolation(msg.to_string())
}
