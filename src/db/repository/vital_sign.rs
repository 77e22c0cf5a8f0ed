use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_vital_sign(conn: &Connection, vital: &VitalSign) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vital_signs (id, patient_id, recorded_at, heart_rate, systolic, diastolic,
         temperature_c, spo2, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            vital.id.to_string(),
            vital.patient_id.to_string(),
            format_datetime(&vital.recorded_at),
            vital.heart_rate,
            vital.systolic,
            vital.diastolic,
            vital.temperature_c,
            vital.spo2,
            vital.notes,
        ],
    )?;
    Ok(())
}

pub fn list_vital_signs(
    conn: &Connection,
    patient_id: &Uuid,
    limit: u32,
) -> Result<Vec<VitalSign>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, recorded_at, heart_rate, systolic, diastolic, temperature_c, spo2, notes
         FROM vital_signs WHERE patient_id = ?1
         ORDER BY recorded_at DESC, rowid DESC LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string(), limit], |row| {
        Ok(VitalRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            recorded_at: row.get(2)?,
            heart_rate: row.get(3)?,
            systolic: row.get(4)?,
            diastolic: row.get(5)?,
            temperature_c: row.get(6)?,
            spo2: row.get(7)?,
            notes: row.get(8)?,
        })
    })?;

    let mut vitals = Vec::new();
    for row in rows {
        let row = row?;
        vitals.push(VitalSign {
            id: parse_uuid(&row.id)?,
            patient_id: parse_uuid(&row.patient_id)?,
            recorded_at: parse_datetime(&row.recorded_at)?,
            heart_rate: row.heart_rate,
            systolic: row.systolic,
            diastolic: row.diastolic,
            temperature_c: row.temperature_c,
            spo2: row.spo2,
            notes: row.notes,
        });
    }
    Ok(vitals)
}

pub fn get_latest_vital_sign(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<VitalSign>, DatabaseError> {
    Ok(list_vital_signs(conn, patient_id, 1)?.into_iter().next())
}

struct VitalRow {
    id: String,
    patient_id: String,
    recorded_at: String,
    heart_rate: Option<u16>,
    systolic: Option<u16>,
    diastolic: Option<u16>,
    temperature_c: Option<f32>,
    spo2: Option<u8>,
    notes: Option<String>,
}
