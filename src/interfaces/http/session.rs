use super::classify::Operation;
use super::envelope::{ApiFailure, SESSION_INVALID_MESSAGE, UNAUTHORIZED_MESSAGE};
use crate::domain::ports::SessionStore;
use crate::domain::session::{Principal, SessionLookup, SessionState, resolve_identity};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request header carrying the session id issued by the authentication service.
pub const SESSION_HEADER: &str = "x-session-id";

/// Loads the caller's session, if any, into the request extensions.
///
/// A store failure is logged and the request proceeds without a session.
pub async fn load_session(
    State(store): State<Arc<dyn SessionStore>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session_id = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    if let Some(session_id) = session_id {
        match store.load(&session_id).await {
            Ok(Some(state)) => {
                request.extensions_mut().insert(state);
            }
            Ok(None) => tracing::debug!("Unknown session id"),
            Err(err) => tracing::error!(error = %err, "Failed to load session"),
        }
    }

    next.run(request).await
}

/// Route gate: rejects requests that arrive without a loaded session.
pub async fn require_session(request: Request, next: Next) -> Response {
    if request.extensions().get::<SessionState>().is_none() {
        return ApiFailure::unauthorized(UNAUTHORIZED_MESSAGE).into_response();
    }
    next.run(request).await
}

/// The caller's identity as read from session state. Extraction never fails;
/// handlers decide whether an identity is required.
#[derive(Debug, Clone)]
pub struct SessionIdentity(pub SessionLookup);

impl SessionIdentity {
    pub fn require(self, operation: Operation) -> Result<Principal, ApiFailure> {
        match self.0 {
            SessionLookup::Found(principal) => Ok(principal),
            lookup => {
                tracing::debug!(
                    resource = operation.resource,
                    operation = %operation,
                    lookup = ?lookup,
                    "Rejecting request without a valid session identity"
                );
                Err(ApiFailure::unauthorized(SESSION_INVALID_MESSAGE))
            }
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        self.0.into_principal()
    }
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_identity(parts.extensions.get::<SessionState>())))
    }
}
