use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::config;
use crate::database::models::{LoginRequest, RegisterUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, DbPool, ValidatedJson};
use crate::services::{AuthService, Session};

/// POST /api/v1/auth/register
pub async fn register(
    Extension(DbPool(pool)): Extension<DbPool>,
    ValidatedJson(body): ValidatedJson<RegisterUser>,
) -> Result<Response, ApiError> {
    let session = AuthService::new(pool).register(body).await?;
    token_response(session)
}

/// POST /api/v1/auth/login - A missing or unreadable body counts as missing credentials
pub async fn login(
    Extension(DbPool(pool)): Extension<DbPool>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let session = AuthService::new(pool).login(body).await?;
    token_response(session)
}

/// GET /api/v1/auth/me
pub async fn me(AuthUser(user): AuthUser) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// `{ success, token }` plus the same token as an HttpOnly cookie
fn token_response(session: Session) -> Result<Response, ApiError> {
    let cookie = HeaderValue::from_str(&session_cookie(&session.token)).map_err(|e| {
        tracing::error!("Unencodable session cookie: {}", e);
        ApiError::internal_server_error("Server Error")
    })?;
    tracing::debug!("Issued token for user {}", session.user.id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "token": session.token })),
    )
        .into_response())
}

fn session_cookie(token: &str) -> String {
    let security = &config::config().security;
    let days = security.cookie_expiry_days as i64;
    let expires = Utc::now() + Duration::days(days);

    let mut cookie = format!(
        "token={}; Path=/; Expires={}; Max-Age={}; HttpOnly",
        token,
        expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        days * 24 * 60 * 60
    );
    if security.secure_cookies || crate::is_production!() {
        cookie.push_str("; Secure");
    }
    cookie
}
