use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::Severity;
use crate::models::*;

pub fn insert_symptom_report(
    conn: &Connection,
    report: &SymptomReport,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptom_reports (id, patient_id, reporter_id, reported_at, selected_severity, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id.to_string(),
            report.patient_id.to_string(),
            report.reporter_id.to_string(),
            format_datetime(&report.reported_at),
            report.selected_severity.as_str(),
            report.description,
        ],
    )?;
    Ok(())
}

/// Most recent reports first, capped at `limit`.
pub fn list_symptom_reports(
    conn: &Connection,
    patient_id: &Uuid,
    limit: u32,
) -> Result<Vec<SymptomReport>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, reporter_id, reported_at, selected_severity, description
         FROM symptom_reports WHERE patient_id = ?1
         ORDER BY reported_at DESC, rowid DESC LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string(), limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        let (id, patient_id, reporter_id, reported_at, severity, description) = row?;
        reports.push(SymptomReport {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            reporter_id: parse_uuid(&reporter_id)?,
            reported_at: parse_datetime(&reported_at)?,
            selected_severity: Severity::from_str(&severity)?,
            description,
        });
    }
    Ok(reports)
}
