use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{
    FlagCategory, FlagSeverity, RiskLevel, StoredValidation, StoredValidationFlag,
    ValidationMethod, ValidationResult, ValidationStats,
};

/// Validations to retain per patient when pruning history.
pub const DEFAULT_HISTORY_RETENTION: usize = 50;

/// Rows returned by history queries unless the caller asks otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Window in which a critical flag still counts against a medication.
pub const DEFAULT_CRITICAL_LOOKBACK_DAYS: i64 = 30;

/// Persist a validation outcome together with all of its flags.
///
/// The validation row and its flag rows commit atomically; a failed flag
/// insert rolls the whole write back.
pub fn insert_validation(
    conn: &Connection,
    patient_id: &str,
    result: &ValidationResult,
) -> Result<Uuid, DatabaseError> {
    let validation_id = Uuid::new_v4();
    let now = format_timestamp(&Utc::now());

    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO medication_safety_validations
             (id, patient_id, is_safe, overall_risk_level, validation_method, summary, validated_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            validation_id.to_string(),
            patient_id,
            result.is_safe,
            result.overall_risk_level.as_str(),
            result.validation_method.as_str(),
            result.summary,
            format_timestamp(&result.validated_at),
            now,
        ],
    )?;

    for flag in &result.flags {
        let references_json = flag
            .references
            .as_ref()
            .map(|refs| serde_json::to_string(refs).unwrap_or_else(|_| "[]".to_string()));

        tx.execute(
            "INSERT INTO validation_flags
                 (id, validation_id, medication_id, medication_name, severity, category,
                  title, description, recommendation, requires_physician_review, references_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                Uuid::new_v4().to_string(),
                validation_id.to_string(),
                (!flag.medication_id.is_empty()).then_some(flag.medication_id.as_str()),
                flag.medication_name,
                flag.severity.as_str(),
                flag.category.as_str(),
                flag.title,
                flag.description,
                flag.recommendation,
                flag.requires_physician_review,
                references_json,
                now,
            ],
        )?;
    }

    tx.commit()?;
    Ok(validation_id)
}

/// Most recent validations for a patient, newest first.
pub fn get_recent_validations(
    conn: &Connection,
    patient_id: &str,
    limit: usize,
) -> Result<Vec<StoredValidation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, is_safe, overall_risk_level, validation_method, summary, validated_at, created_at
         FROM medication_safety_validations
         WHERE patient_id = ?1
         ORDER BY validated_at DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![patient_id, limit as i64], row_to_validation)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// One validation with its flags, most severe flags first.
pub fn get_validation_with_flags(
    conn: &Connection,
    validation_id: &Uuid,
) -> Result<(StoredValidation, Vec<StoredValidationFlag>), DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, is_safe, overall_risk_level, validation_method, summary, validated_at, created_at
         FROM medication_safety_validations
         WHERE id = ?1
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map(params![validation_id.to_string()], row_to_validation)?;
    let validation = match rows.next() {
        Some(row) => row?,
        None => {
            return Err(DatabaseError::NotFound {
                entity_type: "validation".into(),
                id: validation_id.to_string(),
            })
        }
    };

    let flags = get_flags_for_validation(conn, validation_id)?;
    Ok((validation, flags))
}

/// The patient's newest validation with flags, or None if never validated.
pub fn get_latest_validation(
    conn: &Connection,
    patient_id: &str,
) -> Result<Option<(StoredValidation, Vec<StoredValidationFlag>)>, DatabaseError> {
    let recent = get_recent_validations(conn, patient_id, 1)?;
    match recent.into_iter().next() {
        Some(validation) => {
            let flags = get_flags_for_validation(conn, &validation.id)?;
            Ok(Some((validation, flags)))
        }
        None => Ok(None),
    }
}

/// Aggregate counts across a patient's validation history.
///
/// Caution outcomes count toward the total but none of the buckets.
pub fn get_validation_stats(
    conn: &Connection,
    patient_id: &str,
) -> Result<ValidationStats, DatabaseError> {
    let (total, critical, warning, safe, last) = conn.query_row(
        "SELECT COUNT(*),
                SUM(CASE WHEN overall_risk_level = 'critical' THEN 1 ELSE 0 END),
                SUM(CASE WHEN overall_risk_level = 'warning' THEN 1 ELSE 0 END),
                SUM(CASE WHEN overall_risk_level = 'safe' THEN 1 ELSE 0 END),
                MAX(validated_at)
         FROM medication_safety_validations
         WHERE patient_id = ?1",
        params![patient_id],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        },
    )?;

    Ok(ValidationStats {
        total_validations: total,
        critical_count: critical.unwrap_or(0),
        warning_count: warning.unwrap_or(0),
        safe_count: safe.unwrap_or(0),
        last_validated: last.and_then(|s| parse_timestamp(&s).ok()),
    })
}

/// Prune a patient's history to the `keep_count` newest validations.
/// Flags go with their validation via cascade. Returns rows deleted.
pub fn cleanup_old_validations(
    conn: &Connection,
    patient_id: &str,
    keep_count: usize,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM medication_safety_validations
         WHERE patient_id = ?1
           AND id NOT IN (
               SELECT id FROM medication_safety_validations
               WHERE patient_id = ?1
               ORDER BY validated_at DESC
               LIMIT ?2
           )",
        params![patient_id, keep_count as i64],
    )?;
    Ok(deleted)
}

/// Every critical flag ever raised for a patient, newest validation first.
pub fn get_critical_flags(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<StoredValidationFlag>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.validation_id, f.medication_id, f.medication_name, f.severity, f.category,
                f.title, f.description, f.recommendation, f.requires_physician_review, f.references_json, f.created_at
         FROM validation_flags f
         JOIN medication_safety_validations v ON v.id = f.validation_id
         WHERE v.patient_id = ?1 AND f.severity = 'critical'
         ORDER BY v.validated_at DESC",
    )?;
    let rows = stmt.query_map(params![patient_id], row_to_flag)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Whether a medication drew a critical flag inside the lookback window,
/// and how many times it did.
pub fn has_recent_critical_flags(
    conn: &Connection,
    patient_id: &str,
    medication_id: &str,
    days_back: i64,
) -> Result<(bool, usize), DatabaseError> {
    let threshold = format_timestamp(&(Utc::now() - Duration::days(days_back)));
    let count: i64 = conn.query_row(
        "SELECT COUNT(*)
         FROM validation_flags f
         JOIN medication_safety_validations v ON v.id = f.validation_id
         WHERE v.patient_id = ?1
           AND f.medication_id = ?2
           AND f.severity = 'critical'
           AND v.validated_at >= ?3",
        params![patient_id, medication_id, threshold],
        |row| row.get(0),
    )?;
    Ok((count > 0, count as usize))
}

fn get_flags_for_validation(
    conn: &Connection,
    validation_id: &Uuid,
) -> Result<Vec<StoredValidationFlag>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, validation_id, medication_id, medication_name, severity, category,
                title, description, recommendation, requires_physician_review, references_json, created_at
         FROM validation_flags
         WHERE validation_id = ?1
         ORDER BY CASE severity
             WHEN 'critical' THEN 0
             WHEN 'high' THEN 1
             WHEN 'medium' THEN 2
             WHEN 'low' THEN 3
             ELSE 4
         END",
    )?;
    let rows = stmt.query_map(params![validation_id.to_string()], row_to_flag)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn row_to_validation(row: &rusqlite::Row) -> Result<StoredValidation, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let risk_str: String = row.get(3)?;
    let method_str: String = row.get(4)?;
    let validated_str: String = row.get(6)?;
    let created_str: String = row.get(7)?;

    Ok(StoredValidation {
        id: parse_uuid(&id_str, 0)?,
        patient_id: row.get(1)?,
        is_safe: row.get(2)?,
        overall_risk_level: RiskLevel::from_str(&risk_str).map_err(|e| enum_error(3, e))?,
        validation_method: ValidationMethod::from_str(&method_str)
            .map_err(|e| enum_error(4, e))?,
        summary: row.get(5)?,
        validated_at: parse_timestamp_column(&validated_str, 6)?,
        created_at: parse_timestamp_column(&created_str, 7)?,
    })
}

fn row_to_flag(row: &rusqlite::Row) -> Result<StoredValidationFlag, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let validation_str: String = row.get(1)?;
    let severity_str: String = row.get(4)?;
    let category_str: String = row.get(5)?;
    let references_json: Option<String> = row.get(10)?;
    let created_str: String = row.get(11)?;

    Ok(StoredValidationFlag {
        id: parse_uuid(&id_str, 0)?,
        validation_id: parse_uuid(&validation_str, 1)?,
        medication_id: row.get(2)?,
        medication_name: row.get(3)?,
        severity: FlagSeverity::from_str(&severity_str).map_err(|e| enum_error(4, e))?,
        category: FlagCategory::from_str(&category_str).map_err(|e| enum_error(5, e))?,
        title: row.get(6)?,
        description: row.get(7)?,
        recommendation: row.get(8)?,
        requires_physician_review: row.get(9)?,
        references: references_json.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_timestamp_column(&created_str, 11)?,
    })
}

fn parse_uuid(s: &str, idx: usize) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn enum_error(idx: usize, e: DatabaseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_timestamp_column(s: &str, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    parse_timestamp(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
