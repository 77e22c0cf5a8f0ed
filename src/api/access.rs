//! Who may see whose data.
//!
//! Patients see their own records. Doctors see the patients assigned to
//! them. Admins see every patient record but take no part in chat.

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::types::UserContext;
use crate::db::{self, DatabaseError};
use crate::models::enums::Role;

pub fn can_view_patient(
    conn: &Connection,
    user: &UserContext,
    patient_id: &Uuid,
) -> Result<bool, DatabaseError> {
    match user.role {
        Role::Patient => Ok(user.user_id == *patient_id),
        Role::Doctor => db::is_assigned_doctor(conn, patient_id, &user.user_id),
        Role::Admin => Ok(true),
    }
}

/// Chat is only between a patient and their assigned doctor.
pub fn can_chat_with(
    conn: &Connection,
    user: &UserContext,
    peer_id: &Uuid,
) -> Result<bool, DatabaseError> {
    match user.role {
        Role::Patient => db::is_assigned_doctor(conn, &user.user_id, peer_id),
        Role::Doctor => db::is_assigned_doctor(conn, peer_id, &user.user_id),
        Role::Admin => Ok(false),
    }
}
