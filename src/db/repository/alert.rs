use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AlertSeverity, AlertStatus, HealthAlert};

/// Insert a health alert.
pub fn insert_health_alert(conn: &Connection, alert: &HealthAlert) -> Result<(), DatabaseError> {
    let metadata_json = serde_json::to_string(&alert.metadata).unwrap_or_else(|_| "{}".to_string());

    conn.execute(
        "INSERT INTO health_alerts
         (id, patient_id, title, message, severity, status, alert_type,
          related_id, metadata_json, created_at, acknowledged_at, resolved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            alert.id.to_string(),
            alert.patient_id,
            alert.title,
            alert.message,
            alert.severity.as_str(),
            alert.status.as_str(),
            alert.alert_type,
            alert.related_id,
            metadata_json,
            format_timestamp(&alert.created_at),
            alert.acknowledged_at.map(|dt| format_timestamp(&dt)),
            alert.resolved_at.map(|dt| format_timestamp(&dt)),
        ],
    )?;
    Ok(())
}

/// All alerts for a patient, newest first.
pub fn get_alerts_for_patient(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<HealthAlert>, DatabaseError> {
    query_alerts(
        conn,
        "SELECT id, patient_id, title, message, severity, status, alert_type,
                related_id, metadata_json, created_at, acknowledged_at, resolved_at
         FROM health_alerts
         WHERE patient_id = ?1
         ORDER BY created_at DESC",
        patient_id,
    )
}

/// Alerts still awaiting acknowledgement, newest first.
pub fn get_pending_alerts(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<HealthAlert>, DatabaseError> {
    query_alerts(
        conn,
        "SELECT id, patient_id, title, message, severity, status, alert_type,
                related_id, metadata_json, created_at, acknowledged_at, resolved_at
         FROM health_alerts
         WHERE patient_id = ?1 AND status = 'pending'
         ORDER BY created_at DESC",
        patient_id,
    )
}

/// Mark an alert acknowledged.
pub fn acknowledge_alert(conn: &Connection, alert_id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE health_alerts SET status = 'acknowledged', acknowledged_at = ?1
         WHERE id = ?2",
        params![format_timestamp(&Utc::now()), alert_id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "health_alert".into(),
            id: alert_id.to_string(),
        });
    }
    Ok(())
}

/// Mark an alert resolved.
pub fn resolve_alert(conn: &Connection, alert_id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE health_alerts SET status = 'resolved', resolved_at = ?1
         WHERE id = ?2",
        params![format_timestamp(&Utc::now()), alert_id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "health_alert".into(),
            id: alert_id.to_string(),
        });
    }
    Ok(())
}

fn query_alerts(
    conn: &Connection,
    sql: &str,
    patient_id: &str,
) -> Result<Vec<HealthAlert>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, Option<String>>(10)?,
            row.get::<_, Option<String>>(11)?,
        ))
    })?;

    let mut alerts = Vec::new();
    for row in rows {
        let (
            id_str,
            patient_id,
            title,
            message,
            severity_str,
            status_str,
            alert_type,
            related_id,
            metadata_json,
            created_str,
            acknowledged_str,
            resolved_str,
        ) = row?;

        alerts.push(HealthAlert {
            id: Uuid::parse_str(&id_str)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            patient_id,
            title,
            message,
            severity: AlertSeverity::from_str(&severity_str)?,
            status: AlertStatus::from_str(&status_str)?,
            alert_type,
            related_id,
            metadata: metadata_json
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            created_at: parse_timestamp(&created_str)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            acknowledged_at: acknowledged_str.and_then(|s| parse_timestamp(&s).ok()),
            resolved_at: resolved_str.and_then(|s| parse_timestamp(&s).ok()),
        });
    }
    Ok(alerts)
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
