//! Handlers for the `/user` resource.
//!
//! Each request runs strictly in order: decode the body (400 on failure),
//! resolve the session identity where required (401), call the use case,
//! then shape the envelope from its outcome.

use super::AppState;
use super::classify::{Operation, OperationKind};
use super::envelope::{ApiFailure, Envelope};
use super::session::SessionIdentity;
use crate::domain::user::User;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

const RESOURCE: &str = "user";
const CREATE: Operation = Operation::new(RESOURCE, OperationKind::Create);
const UPDATE: Operation = Operation::new(RESOURCE, OperationKind::Update);
const READ: Operation = Operation::new(RESOURCE, OperationKind::Read);
const DELETE: Operation = Operation::new(RESOURCE, OperationKind::Delete);

/// Body accepted by `POST /user` and `PUT /user`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserPayload {
    /// Name of the first required field that is blank.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("fullName", &self.full_name),
            ("email", &self.email),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    pub fn into_user(self) -> User {
        let mut user = User::new(self.username, self.full_name, self.email);
        user.phone = self.phone;
        user
    }
}

fn decode(
    payload: Result<Json<UserPayload>, JsonRejection>,
    operation: Operation,
) -> Result<User, ApiFailure> {
    match payload {
        Ok(Json(payload)) => match payload.missing_field() {
            None => Ok(payload.into_user()),
            Some(field) => {
                tracing::debug!(operation = %operation, field, "Required field missing");
                Err(ApiFailure::bad_request())
            }
        },
        Err(rejection) => {
            tracing::debug!(operation = %operation, error = %rejection, "Malformed request body");
            Err(ApiFailure::bad_request())
        }
    }
}

/// POST /user
pub async fn add_user(
    State(state): State<AppState>,
    identity: SessionIdentity,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiFailure> {
    let user = decode(payload, CREATE)?;
    let principal = if state.policy.create_gated() {
        Some(identity.require(CREATE)?)
    } else {
        identity.into_principal()
    };

    state
        .users
        .add_user(user, principal.as_ref())
        .await
        .map_err(|err| ApiFailure::from_error(CREATE, err))?;

    Ok(Json(Envelope::with_message("Successfully added user")))
}

/// PUT /user
pub async fn update_user(
    State(state): State<AppState>,
    identity: SessionIdentity,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiFailure> {
    let user = decode(payload, UPDATE)?;
    let principal = if state.policy.update_gated() {
        Some(identity.require(UPDATE)?)
    } else {
        identity.into_principal()
    };

    state
        .users
        .update_user(user, principal.as_ref())
        .await
        .map_err(|err| ApiFailure::from_error(UPDATE, err))?;

    Ok(Json(Envelope::with_message("User updated successfully")))
}

/// GET /user
pub async fn get_user(
    State(state): State<AppState>,
    identity: SessionIdentity,
) -> Result<Json<Envelope<User>>, ApiFailure> {
    let principal = identity.require(READ)?;

    match state.users.get_user_by_username(principal.as_str()).await {
        Ok(Some(user)) => Ok(Json(Envelope::with_data(user))),
        Ok(None) => Err(ApiFailure::not_found()),
        Err(err) => Err(ApiFailure::from_error(READ, err)),
    }
}

/// DELETE /user
///
/// Every failure answers with the generic delete message.
pub async fn delete_user(
    State(state): State<AppState>,
    identity: SessionIdentity,
) -> Result<Json<Envelope<()>>, ApiFailure> {
    let principal = identity.require(DELETE)?;

    state
        .users
        .delete_user(principal.as_str())
        .await
        .map_err(|err| ApiFailure::masked(DELETE, err))?;

    Ok(Json(Envelope::with_message("User deleted successfully")))
}
