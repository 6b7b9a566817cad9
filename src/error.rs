// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;

/// HTTP API error with its status code and a client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    MalformedIdentifier(String),
    ValidationError(String),
    InvalidJson(String),
    DuplicateKey,

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),

    // 504 Gateway Timeout
    GatewayTimeout(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::MalformedIdentifier(_)
            | ApiError::ValidationError(_)
            | ApiError::InvalidJson(_)
            | ApiError::DuplicateKey => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::MalformedIdentifier(msg)
            | ApiError::ValidationError(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::GatewayTimeout(msg) => msg,
            ApiError::DuplicateKey => "Duplicate field value entered",
        }
    }

    /// `{ "success": false, "error": "..." }`
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn malformed_identifier(value: impl std::fmt::Display) -> Self {
        ApiError::MalformedIdentifier(format!("Resource not found with id of {}", value))
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::DuplicateKey(constraint) => {
                tracing::debug!("Unique constraint {} violated", constraint);
                ApiError::DuplicateKey
            }
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Timeout(ms) => ApiError::GatewayTimeout(format!("Request exceeded the {}ms deadline", ms)),
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("Server Error")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Server Error")
            }
            err @ (DatabaseError::ConfigMissing(_) | DatabaseError::Migration(_)) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::bad_request(err.to_string()),
            AuthError::InvalidCredentials | AuthError::MissingToken => ApiError::unauthorized(err.to_string()),
            AuthError::InvalidToken(e) => {
                tracing::debug!("Rejected token: {}", e);
                ApiError::unauthorized(AuthError::MissingToken.to_string())
            }
            AuthError::Database(db) => db.into(),
            other => {
                tracing::error!("Authentication failure: {}", other);
                ApiError::internal_server_error("Server Error")
            }
        }
    }
}

/// Every field message, ordered by field, joined into one sentence list
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();
        ApiError::validation_error(messages.join(", "))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if self.status_code().is_server_error() {
            tracing::warn!("Responding {}: {}", self.status_code(), self.message());
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn database_errors_map_to_statuses() {
        let cases = [
            (DatabaseError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DatabaseError::DuplicateKey("bootcamps_name_key".into()), StatusCode::BAD_REQUEST),
            (DatabaseError::ConnectionError("refused".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DatabaseError::Timeout(10), StatusCode::GATEWAY_TIMEOUT),
            (DatabaseError::QueryError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn duplicates_use_a_fixed_message() {
        let err = ApiError::from(DatabaseError::DuplicateKey("users_email_key".into()));
        assert_eq!(err.to_json(), json!({ "success": false, "error": "Duplicate field value entered" }));
    }

    #[test]
    fn filter_errors_are_bad_requests() {
        let err = ApiError::from(FilterError::UnsupportedOperator("$where".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Unsupported operator: $where");
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(ApiError::from(AuthError::MissingCredentials).status_code(), StatusCode::BAD_REQUEST);
        let invalid = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(invalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.message(), "Invalid credentials");
    }

    #[test]
    fn token_signing_failures_are_server_errors() {
        let signing = AuthError::TokenSigning(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into());
        let err = ApiError::from(signing);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Server Error");

        let rejected = AuthError::InvalidToken(jsonwebtoken::errors::ErrorKind::InvalidSignature.into());
        assert_eq!(ApiError::from(rejected).status_code(), StatusCode::UNAUTHORIZED);
    }

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 1, message = "Please add a title"))]
        title: String,
        #[validate(range(min = 1, message = "Weeks must be positive"))]
        weeks: i64,
    }

    #[test]
    fn validation_messages_are_joined_in_field_order() {
        let errors = Body { title: String::new(), weeks: 0 }.validate().unwrap_err();
        let err = ApiError::from(errors);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Please add a title, Weeks must be positive");
    }
}
