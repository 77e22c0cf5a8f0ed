use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CareLink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "medgemma";
/// Ollama cold starts can take a while on CPU.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 3600;
pub const DEFAULT_MAIL_FROM: &str = "alerts@carelink.local";
pub const MAIL_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

/// Default log filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,carelink_lib=debug,tower_http=warn"
}

/// Get the application data directory (~/CareLink/).
///
/// Falls back to the working directory when no home directory can be resolved
/// (containers running as a bare uid).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database location inside the data directory.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("carelink.db")
}

/// Runtime configuration, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub ollama_url: String,
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
    /// HTTP mail relay endpoint. `None` means emails are only logged.
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
    pub session_ttl_secs: u64,
    /// Work factor for newly hashed passwords. Existing hashes carry their own.
    pub pbkdf2_iterations: u32,
    /// Bootstrap admin credentials, used only when no admin exists yet.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080))),
            db_path: default_db_path(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            mail_relay_url: None,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
            admin_email: None,
            admin_password: None,
        }
    }
}

impl AppConfig {
    /// Build configuration from `CARELINK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (testable without
    /// touching the process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CARELINK_BIND") {
            cfg.bind_addr = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CARELINK_BIND",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("CARELINK_DB_PATH") {
            cfg.db_path = PathBuf::from(v);
        }
        if let Some(v) = get("CARELINK_OLLAMA_URL") {
            cfg.ollama_url = v;
        }
        if let Some(v) = get("CARELINK_OLLAMA_MODEL") {
            cfg.ollama_model = v;
        }
        if let Some(v) = get("CARELINK_LLM_TIMEOUT_SECS") {
            cfg.llm_timeout_secs = parse_positive("CARELINK_LLM_TIMEOUT_SECS", &v)?;
        }
        cfg.mail_relay_url = get("CARELINK_MAIL_RELAY_URL");
        if let Some(v) = get("CARELINK_MAIL_FROM") {
            cfg.mail_from = v;
        }
        if let Some(v) = get("CARELINK_SESSION_TTL_SECS") {
            cfg.session_ttl_secs = parse_positive("CARELINK_SESSION_TTL_SECS", &v)?;
        }
        if let Some(v) = get("CARELINK_PBKDF2_ITERATIONS") {
            cfg.pbkdf2_iterations = parse_positive("CARELINK_PBKDF2_ITERATIONS", &v)?
                .try_into()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "CARELINK_PBKDF2_ITERATIONS",
                    value: v.clone(),
                })?;
        }
        cfg.admin_email = get("CARELINK_ADMIN_EMAIL");
        cfg.admin_password = get("CARELINK_ADMIN_PASSWORD");

        Ok(cfg)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
