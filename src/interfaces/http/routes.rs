use super::AppState;
use super::envelope::Envelope;
use super::session::{load_session, require_session};
use super::user_handler::{add_user, delete_user, get_user, update_user};
use crate::domain::ports::SessionStore;
use axum::routing::{MethodRouter, delete, get, post, put};
use axum::{Json, Router, middleware};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health_check() -> Json<Envelope<HealthStatus>> {
    Json(Envelope::with_data(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

fn gated(route: MethodRouter<AppState>, requires_session: bool) -> MethodRouter<AppState> {
    if requires_session {
        route.route_layer(middleware::from_fn(require_session))
    } else {
        route
    }
}

/// Builds the HTTP router.
///
/// | Method | Path    | Session gate                 |
/// |--------|---------|------------------------------|
/// | POST   | /user   | `AccessPolicy::create_gated` |
/// | PUT    | /user   | `AccessPolicy::update_gated` |
/// | GET    | /user   | always                       |
/// | DELETE | /user   | always                       |
/// | GET    | /health | never                        |
pub fn create_router(state: AppState, sessions: Arc<dyn SessionStore>) -> Router {
    let policy = state.policy;
    let user_routes = gated(post(add_user), policy.create_gated())
        .merge(gated(put(update_user), policy.update_gated()))
        .merge(gated(get(get_user), true))
        .merge(gated(delete(delete_user), true));

    Router::new()
        .route("/user", user_routes)
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(sessions, load_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
