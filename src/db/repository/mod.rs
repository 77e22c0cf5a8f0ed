//! Repository layer — entity-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here.

mod care_plan;
mod chat;
mod profile;
mod symptom;
mod user;
mod vital_sign;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{DatabaseError, DATETIME_FORMAT, DATE_FORMAT};

pub use care_plan::*;
pub use chat::*;
pub use profile::*;
pub use symptom::*;
pub use user::*;
pub use vital_sign::*;

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date {raw:?}: {e}")))
}

pub(crate) fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Current UTC time truncated to the storage precision.
pub fn now_utc() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    parse_datetime(&format_datetime(&now)).unwrap_or(now)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rusqlite::Connection;
    use uuid::Uuid;

    use super::*;
    use crate::models::enums::Role;
    use crate::models::*;

    pub fn make_user(conn: &Connection, role: Role, name: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            role,
            name: name.to_string(),
            email: format!("{}-{}@example.com", name.to_lowercase().replace(' ', "."), Uuid::new_v4()),
            password_hash: "pbkdf2$1$AAAA$AAAA".into(),
            created_at: now_utc(),
        };
        insert_user(conn, &user).unwrap();
        user
    }
}
