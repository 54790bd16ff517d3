//! Admin authentication.
//!
//! A single shared admin password is exchanged for an HS256 token at
//! `POST /v1/admin/auth`. The token travels as the `admin_token` cookie or as an
//! `Authorization: Bearer` header.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::constant_time_eq;
use crate::error::ApiError;
use crate::state::AppState;

/// Name of the admin session cookie.
pub const ADMIN_COOKIE: &str = "admin_token";

/// Token and cookie lifetime.
pub const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

const ADMIN_ROLE: &str = "admin";

/// Claims carried by an admin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Always `admin`.
    pub role: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issue an admin token valid for [`SESSION_TTL_SECONDS`] from `now`.
pub fn issue_token(secret: &str, now: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = AdminClaims {
        role: ADMIN_ROLE.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECONDS,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify an admin token's signature, expiry and role.
pub fn verify_token(token: &str, secret: &str) -> Result<AdminClaims, ApiError> {
    let data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Admin token rejected");
        ApiError::Unauthorized
    })?;

    if data.claims.role != ADMIN_ROLE {
        return Err(ApiError::Unauthorized);
    }
    Ok(data.claims)
}

/// Compare a submitted password with the configured one without leaking where they differ.
///
/// Both sides are hashed first so the comparison length is fixed.
#[must_use]
pub fn password_matches(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    constant_time_eq(given.as_slice(), expected.as_slice())
}

/// `Set-Cookie` value carrying a fresh admin token.
#[must_use]
pub fn session_cookie(token: &str, secure: bool) -> String {
    cookie(token, SESSION_TTL_SECONDS, secure)
}

/// `Set-Cookie` value that removes the admin token.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    cookie("", 0, secure)
}

fn cookie(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{ADMIN_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull the admin token from the `Authorization` header or the session cookie.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ADMIN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// The verified token claims.
    pub claims: AdminClaims,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Without a signing secret no token can be valid.
        let secret = state
            .config
            .admin_jwt_secret
            .as_deref()
            .ok_or(ApiError::Unauthorized)?;

        let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let claims = verify_token(&token, secret)?;

        Ok(AdminAuth { claims })
    }
}
