use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_date, parse_uuid, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert or replace the care profile of a patient.
pub fn upsert_patient_profile(
    conn: &Connection,
    profile: &PatientProfile,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_profiles (patient_id, assigned_doctor_id, discharge_date, risk_profile,
         emergency_contact_name, emergency_contact_phone, emergency_contact_email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(patient_id) DO UPDATE SET
            assigned_doctor_id = excluded.assigned_doctor_id,
            discharge_date = excluded.discharge_date,
            risk_profile = excluded.risk_profile,
            emergency_contact_name = excluded.emergency_contact_name,
            emergency_contact_phone = excluded.emergency_contact_phone,
            emergency_contact_email = excluded.emergency_contact_email",
        params![
            profile.patient_id.to_string(),
            profile.assigned_doctor_id.map(|id| id.to_string()),
            profile.discharge_date.map(|d| d.format(DATE_FORMAT).to_string()),
            profile.risk_profile,
            profile.emergency_contact.name,
            profile.emergency_contact.phone,
            profile.emergency_contact.email,
        ],
    )?;
    Ok(())
}

pub fn get_patient_profile(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<PatientProfile>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT patient_id, assigned_doctor_id, discharge_date, risk_profile,
             emergency_contact_name, emergency_contact_phone, emergency_contact_email
             FROM patient_profiles WHERE patient_id = ?1",
            params![patient_id.to_string()],
            ProfileRow::read,
        )
        .optional()?;
    row.map(profile_from_row).transpose()
}

/// Patients assigned to a doctor, with their user record.
pub fn list_patients_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<(User, PatientProfile)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.patient_id, p.assigned_doctor_id, p.discharge_date, p.risk_profile,
         p.emergency_contact_name, p.emergency_contact_phone, p.emergency_contact_email
         FROM patient_profiles p
         JOIN users u ON u.id = p.patient_id
         WHERE p.assigned_doctor_id = ?1
         ORDER BY u.name ASC",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], ProfileRow::read)?;

    let mut result = Vec::new();
    for row in rows {
        let profile = profile_from_row(row?)?;
        let user = super::get_user(conn, &profile.patient_id)?.ok_or_else(|| {
            DatabaseError::NotFound {
                entity_type: "User".into(),
                id: profile.patient_id.to_string(),
            }
        })?;
        result.push((user, profile));
    }
    Ok(result)
}

/// Whether `doctor_id` is the assigned doctor of `patient_id`.
pub fn is_assigned_doctor(
    conn: &Connection,
    patient_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<bool, DatabaseError> {
    Ok(get_patient_profile(conn, patient_id)?
        .and_then(|p| p.assigned_doctor_id)
        .is_some_and(|id| id == *doctor_id))
}

struct ProfileRow {
    patient_id: String,
    assigned_doctor_id: Option<String>,
    discharge_date: Option<String>,
    risk_profile: Option<String>,
    contact_name: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
}

impl ProfileRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            patient_id: row.get(0)?,
            assigned_doctor_id: row.get(1)?,
            discharge_date: row.get(2)?,
            risk_profile: row.get(3)?,
            contact_name: row.get(4)?,
            contact_phone: row.get(5)?,
            contact_email: row.get(6)?,
        })
    }
}

fn profile_from_row(row: ProfileRow) -> Result<PatientProfile, DatabaseError> {
    Ok(PatientProfile {
        patient_id: parse_uuid(&row.patient_id)?,
        assigned_doctor_id: row.assigned_doctor_id.as_deref().map(parse_uuid).transpose()?,
        discharge_date: row.discharge_date.as_deref().map(parse_date).transpose()?,
        risk_profile: row.risk_profile,
        emergency_contact: EmergencyContact {
            name: row.contact_name,
            phone: row.contact_phone,
            email: row.contact_email,
        },
    })
}
