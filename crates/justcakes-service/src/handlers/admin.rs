//! Admin session endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{
    clear_session_cookie, issue_token, password_matches, session_cookie, token_from_headers,
    verify_token,
};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /v1/admin/auth`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The admin password.
    pub password: String,
}

/// Login and logout response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Whether the operation succeeded.
    pub success: bool,
}

/// Session check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the request carries a valid admin token.
    pub authenticated: bool,
}

/// `POST /v1/admin/auth`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(password), Some(secret)) = (
        state.config.admin_password.as_deref(),
        state.config.admin_jwt_secret.as_deref(),
    ) else {
        tracing::warn!("Admin login attempted but admin credentials are not configured");
        return Err(ApiError::Unauthorized);
    };

    if !password_matches(&req.password, password) {
        tracing::warn!("Admin login failed");
        return Err(ApiError::Unauthorized);
    }

    let token = issue_token(secret, Utc::now().timestamp())
        .map_err(|e| ApiError::Internal(format!("failed to issue admin token: {e}")))?;

    tracing::info!("Admin logged in");

    Ok((
        [(SET_COOKIE, session_cookie(&token, state.config.cookie_secure))],
        Json(SessionResponse { success: true }),
    ))
}

/// `GET /v1/admin/auth`
pub async fn status(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let authenticated = state
        .config
        .admin_jwt_secret
        .as_deref()
        .zip(token_from_headers(&headers))
        .is_some_and(|(secret, token)| verify_token(&token, secret).is_ok());

    let code = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (code, Json(AuthStatus { authenticated }))
}

/// `DELETE /v1/admin/auth`
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        Json(SessionResponse { success: true }),
    )
}
