use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use sqlx::PgPool;

use crate::auth::{self, AuthError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::AuthService;

/// Shared connection pool, installed on the router as an extension
#[derive(Clone)]
pub struct DbPool(pub PgPool);

/// The user behind a valid token. Extracting it is what makes a route
/// protected.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = extract_jwt(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = auth::decode_jwt(&token)?;

        let DbPool(pool) = parts
            .extensions
            .get::<DbPool>()
            .cloned()
            .ok_or_else(|| ApiError::internal_server_error("Server Error"))?;
        let user = AuthService::new(pool).current_user(claims.sub).await?;

        let auth_user = AuthUser(user);
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

/// Bearer token from the Authorization header, else the `token` cookie
pub fn extract_jwt(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == "token" && !value.is_empty() && *value != "none")
        .map(|(_, value)| value.to_string())
}
