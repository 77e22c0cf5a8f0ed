//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db::Store;
use crate::llm::LlmClient;
use crate::models::enums::Role;
use crate::notify::{EmailSender, SmsSender};
use crate::triage::TriageContext;

// ═══════════════════════════════════════════════════════════
// App state — shared by handlers and middleware
// ═══════════════════════════════════════════════════════════

/// Shared state for all API routes and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub llm: Arc<dyn LlmClient>,
    pub mailer: Arc<dyn EmailSender>,
    pub sms: Arc<dyn SmsSender>,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl AppState {
    pub fn new(
        store: Store,
        llm: Arc<dyn LlmClient>,
        mailer: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
        config: AppConfig,
    ) -> Self {
        let ttl = Duration::from_secs(config.session_ttl_secs);
        Self {
            store,
            llm,
            mailer,
            sms,
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(SessionStore::new(ttl))),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }

    /// Borrow the pieces the triage pipeline needs.
    pub fn triage_context(&self) -> TriageContext<'_> {
        TriageContext {
            store: &self.store,
            llm: self.llm.as_ref(),
            model: &self.config.ollama_model,
            mailer: self.mailer.as_ref(),
            sms: self.sms.as_ref(),
        }
    }
}

/// Run synchronous work (SQLite, blocking HTTP, password hashing) on the
/// blocking pool.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

// ═══════════════════════════════════════════════════════════
// User context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated user, injected into request extensions by the auth
/// middleware after the session cookie validates.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    pub role: Role,
    pub name: String,
}

impl UserContext {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Tracked keys above this count trigger a sweep of idle clients.
const MAX_TRACKED_CLIENTS: usize = 4096;
const HOUR: Duration = Duration::from_secs(3600);

/// Per-client rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(100, 1000)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
        }
    }

    /// Check if a client is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        if self.windows.len() >= MAX_TRACKED_CLIENTS && !self.windows.contains_key(key) {
            self.cleanup(now);
        }
        let entries = self.windows.entry(key.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < HOUR);

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }

    /// Drop clients with no requests inside the hour window.
    fn cleanup(&mut self, now: Instant) {
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < HOUR);
            !entries.is_empty()
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
