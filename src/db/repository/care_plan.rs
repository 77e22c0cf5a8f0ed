use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::CarePlanStatus;
use crate::models::*;

pub fn insert_care_plan(conn: &Connection, plan: &CarePlan) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO care_plans (id, patient_id, doctor_id, content, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            plan.id.to_string(),
            plan.patient_id.to_string(),
            plan.doctor_id.to_string(),
            plan.content,
            plan.status.as_str(),
            format_datetime(&plan.created_at),
        ],
    )?;
    Ok(())
}

pub fn list_care_plans(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<CarePlan>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_id, content, status, created_at
         FROM care_plans WHERE patient_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut plans = Vec::new();
    for row in rows {
        let (id, patient_id, doctor_id, content, status, created_at) = row?;
        plans.push(CarePlan {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            doctor_id: parse_uuid(&doctor_id)?,
            content,
            status: CarePlanStatus::from_str(&status)?,
            created_at: parse_datetime(&created_at)?,
        });
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::make_user;
    use crate::db::repository::now_utc;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Role;

    #[test]
    fn care_plans_round_trip_through_store() {
        let conn = open_memory_database().unwrap();
        let patient = make_user(&conn, Role::Patient, "Ana");
        let doctor = make_user(&conn, Role::Doctor, "Dr B");

        let plan = CarePlan {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            content: "Walk 10 minutes twice daily.".into(),
            status: CarePlanStatus::Draft,
            created_at: now_utc(),
        };
        insert_care_plan(&conn, &plan).unwrap();

        let plans = list_care_plans(&conn, &patient.id).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].status, CarePlanStatus::Draft);
        assert_eq!(plans[0].doctor_id, doctor.id);
        assert!(list_care_plans(&conn, &doctor.id).unwrap().is_empty());
    }
}
