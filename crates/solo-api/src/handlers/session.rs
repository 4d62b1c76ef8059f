//! Session token issue and removal.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Claims submitted to `POST /jwt`.
#[derive(Debug, Deserialize, Validate)]
pub struct JwtRequest {
    #[validate(email)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
}

/// Sign the submitted claims and set them as the session cookie.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<JwtRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let token = state.tokens.issue(&request.email, request.extra)?;
    info!(email = %request.email, "Issued session token");

    Ok((
        jar.add(state.tokens.session_cookie(token)),
        Json(SessionResponse { success: true }),
    ))
}

/// Clear the session cookie.
pub async fn log_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    (
        jar.add(state.tokens.removal_cookie()),
        Json(SessionResponse { success: true }),
    )
}
