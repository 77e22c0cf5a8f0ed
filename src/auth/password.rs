use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::AuthError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SCHEME: &str = "pbkdf2";

/// Hash a password for storage as `pbkdf2$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with(password, PBKDF2_ITERATIONS)
}

/// Like `hash_password` with an explicit work factor. Tests use a low one.
pub fn hash_password_with(password: &str, iterations: u32) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }
    let salt: [u8; SALT_LENGTH] = rand::random();
    let hash = derive(password, &salt, iterations);
    Ok(format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Check a password against a stored hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(AuthError::MalformedHash);
    };

    let iterations: u32 = iterations.parse().map_err(|_| AuthError::MalformedHash)?;
    if iterations == 0 {
        return Err(AuthError::MalformedHash);
    }
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| AuthError::MalformedHash)?;
    let expected = STANDARD_NO_PAD
        .decode(hash)
        .map_err(|_| AuthError::MalformedHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(AuthError::MalformedHash);
    }

    let actual = derive(password, &salt, iterations);
    Ok(actual.ct_eq(&expected[..]).into())
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password_with("correct horse", 1_000).unwrap();
        assert!(stored.starts_with("pbkdf2$1000$"));
        assert!(verify_password("correct horse", &stored).unwrap());
        assert!(!verify_password("wrong horse!", &stored).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password_with("same password", 1_000).unwrap();
        let b = hash_password_with("same password", 1_000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_password_rejected() {
        assert_eq!(
            hash_password_with("short", 1_000),
            Err(AuthError::PasswordTooShort(MIN_PASSWORD_LENGTH))
        );
    }

    #[test]
    fn malformed_hashes_are_errors() {
        for bad in [
            "",
            "plain",
            "bcrypt$10$abc$def",
            "pbkdf2$notanumber$AAAA$AAAA",
            "pbkdf2$0$AAAA$AAAA",
            "pbkdf2$1000$!!!$AAAA",
            "pbkdf2$1000$AAAA$AAAA",
            "pbkdf2$1000$AAAA$AAAA$extra",
        ] {
            assert_eq!(verify_password("whatever1", bad), Err(AuthError::MalformedHash), "{bad}");
        }
    }
}
