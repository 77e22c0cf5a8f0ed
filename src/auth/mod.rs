//! Password hashing and cookie sessions.

pub mod password;
pub mod session;

pub use password::*;
pub use session::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed password hash")]
    MalformedHash,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}
