//! User account creation, shared by the admin API and startup bootstrap.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{self, AuthError};
use crate::db::{self, DatabaseError, Store};
use crate::models::enums::Role;
use crate::models::*;
use crate::notify::validate_address;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid account data: {0}")]
    InvalidInput(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for AccountError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConstraintViolation(detail) => AccountError::EmailTaken(detail),
            other => AccountError::Database(other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validate, hash, and insert a user. Patients also get an empty profile.
pub fn create_user(store: &Store, new: &NewUser, iterations: u32) -> Result<User, AccountError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(AccountError::InvalidInput("name is required".into()));
    }
    let email = db::normalize_email(&new.email);
    validate_address(&email).map_err(|_| AccountError::InvalidInput("email is invalid".into()))?;

    let password_hash = auth::hash_password_with(&new.password, iterations)?;
    let user = User {
        id: Uuid::new_v4(),
        role: new.role,
        name: name.to_string(),
        email,
        password_hash,
        created_at: db::now_utc(),
    };

    store.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        db::insert_user(&tx, &user)?;
        if user.role == Role::Patient {
            db::upsert_patient_profile(&tx, &PatientProfile::empty(user.id))?;
        }
        tx.commit()?;
        Ok(())
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    Ok(user)
}

/// Create the configured admin account when no admin exists yet.
///
/// Returns the created user, or `None` when an admin is already present.
pub fn ensure_admin(
    store: &Store,
    email: &str,
    password: &str,
    iterations: u32,
) -> Result<Option<User>, AccountError> {
    let admins = store.with_conn(|conn| db::count_users_by_role(conn, Role::Admin))?;
    if admins > 0 {
        tracing::debug!(admins, "Admin account present, skipping bootstrap");
        return Ok(None);
    }
    let user = create_user(
        store,
        &NewUser {
            role: Role::Admin,
            name: "Administrator".into(),
            email: email.into(),
            password: password.into(),
        },
        iterations,
    )?;
    tracing::warn!(email = %user.email, "Bootstrap admin account created");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITER: u32 = 1_000;

    fn patient(email: &str) -> NewUser {
        NewUser {
            role: Role::Patient,
            name: " Ana Diaz ".into(),
            email: email.into(),
            password: "hunter2hunter2".into(),
        }
    }

    #[test]
    fn patient_gets_profile_and_normalized_email() {
        let store = Store::open_in_memory().unwrap();
        let user = create_user(&store, &patient("Ana@Example.com"), ITER).unwrap();
        assert_eq!(user.name, "Ana Diaz");
        assert_eq!(user.email, "ana@example.com");

        let profile = store
            .with_conn(|c| db::get_patient_profile(c, &user.id))
            .unwrap();
        assert!(profile.is_some());
        assert!(auth::verify_password("hunter2hunter2", &user.password_hash).unwrap());
    }

    #[test]
    fn duplicate_email_is_reported() {
        let store = Store::open_in_memory().unwrap();
        create_user(&store, &patient("ana@example.com"), ITER).unwrap();
        let err = create_user(&store, &patient("ANA@example.com"), ITER);
        assert!(matches!(err, Err(AccountError::EmailTaken(_))));
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let store = Store::open_in_memory().unwrap();
        let mut bad = patient("not-an-email");
        assert!(matches!(
            create_user(&store, &bad, ITER),
            Err(AccountError::InvalidInput(_))
        ));
        bad.email = "ana@example.com".into();
        bad.password = "short".into();
        assert!(matches!(
            create_user(&store, &bad, ITER),
            Err(AccountError::Auth(AuthError::PasswordTooShort(_)))
        ));
    }

    #[test]
    fn ensure_admin_runs_once() {
        let store = Store::open_in_memory().unwrap();
        let first = ensure_admin(&store, "root@example.com", "rootpassword", ITER).unwrap();
        assert!(first.is_some());
        let second = ensure_admin(&store, "other@example.com", "rootpassword", ITER).unwrap();
        assert!(second.is_none());
    }
}
