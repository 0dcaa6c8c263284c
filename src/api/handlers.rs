//! Request handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::GateError;
use crate::gate::Gate;

/// Body returned for a failed authentication.
pub(crate) const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A [`GateError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub GateError);

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            GateError::ValidationInput(_) => StatusCode::BAD_REQUEST,
            GateError::NotFound(_) => StatusCode::NOT_FOUND,
            GateError::Storage(_) | GateError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_caller_fault() {
            tracing::debug!("Request rejected: {}", self.0);
        } else {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = Json(json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub(crate) async fn add_user(
    State(gate): State<Arc<Gate>>,
    Path((user, ttl)): Path<(String, String)>,
) -> Result<&'static str, ApiError> {
    let ttl_hours: u64 = ttl.parse().map_err(|_| {
        GateError::ValidationInput(format!("ttl must be a whole number of hours, got '{}'", ttl))
    })?;
    gate.issue_credential(&user, ttl_hours).await?;
    Ok("OK")
}

pub(crate) async fn delete_user(
    State(gate): State<Arc<Gate>>,
    Path(user): Path<String>,
) -> Result<&'static str, ApiError> {
    gate.revoke_credential(&user).await?;
    Ok("OK")
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthQuery {
    #[serde(default)]
    password: String,
}

pub(crate) async fn authenticate(
    State(gate): State<Arc<Gate>>,
    Path(user): Path<String>,
    Query(query): Query<AuthQuery>,
) -> Result<Response, ApiError> {
    let outcome = gate.authenticate(&user, &query.password).await?;
    if outcome.authorized {
        Ok((StatusCode::OK, "OK").into_response())
    } else {
        Ok((StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS).into_response())
    }
}

pub(crate) async fn remove_invalid_records(State(gate): State<Arc<Gate>>) -> impl IntoResponse {
    gate.trigger_sweep();
    (StatusCode::ACCEPTED, "Sweep started")
}

pub(crate) async fn get_code(
    State(gate): State<Arc<Gate>>,
    Path(user): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = gate.fetch_artifact(&user).await?;
    Ok(([(header::CONTENT_TYPE, gate.artifact_content_type())], bytes).into_response())
}

pub(crate) async fn healthz(State(gate): State<Arc<Gate>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "present": gate.occupancy().count(),
    }))
}
