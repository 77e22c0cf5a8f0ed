use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

pub const SESSION_COOKIE: &str = "carelink_session";

/// Generate a random session token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a token. Only hashes are kept server-side.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

struct SessionEntry {
    user_id: Uuid,
    expires_at: Instant,
}

/// In-memory login sessions with a fixed TTL. Lost on restart.
pub struct SessionStore {
    sessions: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Start a session and return the raw token for the cookie.
    pub fn issue(&mut self, user_id: Uuid) -> String {
        self.cleanup();
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                user_id,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// User behind a live token.
    pub fn validate(&mut self, token: &str) -> Option<Uuid> {
        let key = hash_token(token);
        let entry = self.sessions.get(&key)?;
        if Instant::now() >= entry.expires_at {
            self.sessions.remove(&key);
            return None;
        }
        Some(entry.user_id)
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, s| now < s.expires_at);
    }
}

/// `Set-Cookie` value for a new session.
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

/// Extract the session token from a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_url_safe_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn issue_validate_revoke() {
        let mut store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let token = store.issue(user);

        assert_eq!(store.validate(&token), Some(user));
        assert_eq!(store.validate("not-a-token"), None);
        assert!(store.revoke(&token));
        assert_eq!(store.validate(&token), None);
        assert!(!store.revoke(&token));
    }

    #[test]
    fn expired_session_is_rejected() {
        let mut store = SessionStore::new(Duration::ZERO);
        let token = store.issue(Uuid::new_v4());
        assert_eq!(store.validate(&token), None);
        assert!(store.is_empty());
    }

    #[test]
    fn cookie_parsing() {
        let header = "theme=dark; carelink_session=abc123; other=x";
        assert_eq!(token_from_cookie_header(header), Some("abc123"));
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("carelink_session="), None);
        assert!(session_cookie("t", 60).contains("HttpOnly"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
