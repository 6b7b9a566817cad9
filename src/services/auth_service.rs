use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, AuthError, Claims};
use crate::database::manager::{with_deadline, DatabaseError};
use crate::database::models::{LoginRequest, RegisterUser, User};

/// A user together with a freshly signed token
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, input: RegisterUser) -> Result<Session, AuthError> {
        let password = input.password.clone().unwrap_or_default();
        let hash = auth::hash_password(password).await?;

        let user = with_deadline(async {
            Ok::<_, DatabaseError>(
                sqlx::query_as::<_, User>(
                    "INSERT INTO users (name, email, role, password) VALUES ($1, $2, $3, $4) RETURNING *",
                )
                .bind(&input.name)
                .bind(&input.email)
                .bind(input.role.as_str())
                .bind(&hash)
                .fetch_one(&self.pool)
                .await?,
            )
        })
        .await?;

        tracing::info!("Registered user {} as {}", user.id, user.role.as_str());
        Self::session(user)
    }

    pub async fn login(&self, input: LoginRequest) -> Result<Session, AuthError> {
        let (Some(email), Some(password)) = (non_blank(input.email), non_blank(input.password)) else {
            return Err(AuthError::MissingCredentials);
        };

        let user = with_deadline(async {
            Ok::<_, DatabaseError>(
                sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                    .bind(&email)
                    .fetch_optional(&self.pool)
                    .await?,
            )
        })
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password(password, user.password.clone()).await? {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }
        Self::session(user)
    }

    /// The user a verified token refers to
    pub async fn current_user(&self, id: Uuid) -> Result<User, AuthError> {
        let user = with_deadline(async {
            Ok::<_, DatabaseError>(
                sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?,
            )
        })
        .await?;
        user.ok_or(AuthError::MissingToken)
    }

    fn session(user: User) -> Result<Session, AuthError> {
        let token = auth::generate_jwt(&Claims::new(user.id))?;
        Ok(Session { user, token })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
