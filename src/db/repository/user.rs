use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::*;

const USER_COLUMNS: &str = "id, role, name, email, password_hash, created_at";

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    let result = conn.execute(
        "INSERT INTO users (id, role, name, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.role.as_str(),
            user.name,
            normalize_email(&user.email),
            user.password_hash,
            format_datetime(&user.created_at),
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(DatabaseError::ConstraintViolation(format!(
                "email already registered: {}",
                user.email
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.to_string()],
            UserRow::read,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![normalize_email(email)],
            UserRow::read,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn list_users_by_role(conn: &Connection, role: Role) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY name ASC"
    ))?;
    let rows = stmt.query_map(params![role.as_str()], UserRow::read)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

pub fn count_users_by_role(conn: &Connection, role: Role) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = ?1",
        params![role.as_str()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

/// Emails are matched case-insensitively; stored lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

struct UserRow {
    id: String,
    role: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            role: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        role: Role::from_str(&row.role)?,
        name: row.name,
        email: row.email,
        password_hash: row.password_hash,
        created_at: parse_datetime(&row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::make_user;
    use crate::db::repository::now_utc;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_fetch_user() {
        let conn = open_memory_database().unwrap();
        let user = make_user(&conn, Role::Doctor, "Dr Osei");

        let fetched = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Dr Osei");
        assert_eq!(fetched.role, Role::Doctor);
        assert_eq!(fetched.created_at, user.created_at);
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let conn = open_memory_database().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            role: Role::Patient,
            name: "Maya".into(),
            email: "Maya@Example.com".into(),
            password_hash: "x".into(),
            created_at: now_utc(),
        };
        insert_user(&conn, &user).unwrap();

        let found = get_user_by_email(&conn, "  maya@example.COM ").unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let user = make_user(&conn, Role::Patient, "Maya");
        let dup = User {
            id: Uuid::new_v4(),
            ..user
        };
        assert!(matches!(
            insert_user(&conn, &dup),
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn missing_user_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_user(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn count_and_list_by_role() {
        let conn = open_memory_database().unwrap();
        make_user(&conn, Role::Doctor, "Dr B");
        make_user(&conn, Role::Doctor, "Dr A");
        make_user(&conn, Role::Patient, "Pat");

        assert_eq!(count_users_by_role(&conn, Role::Doctor).unwrap(), 2);
        assert_eq!(count_users_by_role(&conn, Role::Admin).unwrap(), 0);
        let doctors = list_users_by_role(&conn, Role::Doctor).unwrap();
        assert_eq!(doctors[0].name, "Dr A");
    }
}
