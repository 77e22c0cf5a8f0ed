//! HTTP API for the portal.
//!
//! Routes are nested under `/api/`. Authenticated routes pass through
//! Rate Limit → Auth → Audit → Handler; login and health skip Auth.
//!
//! Handlers move blocking work (SQLite, LLM, mail) onto the blocking pool
//! with `run_blocking`.

pub mod access;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer};
pub use types::{AppState, UserContext};
