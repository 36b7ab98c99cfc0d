//! HTTP surface: session handling, error classification, and the `/user` handlers.
//!
//! ```text
//! request ─▶ TraceLayer ─▶ load_session ─▶ require_session (gated routes)
//!         ─▶ handler: decode ─▶ identity ─▶ use case ─▶ Envelope
//! ```

pub mod classify;
pub mod envelope;
pub mod routes;
pub mod session;
pub mod user_handler;

use crate::application::user_service::UserUseCase;
use crate::config::AccessPolicy;
use std::sync::Arc;

pub use routes::create_router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserUseCase>,
    pub policy: AccessPolicy,
}

impl AppState {
    pub fn new(users: Arc<dyn UserUseCase>, policy: AccessPolicy) -> Self {
        Self { users, policy }
    }
}
