use axum::{
    extract::Extension,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::database::DatabaseManager;
use crate::handlers;
use crate::middleware::DbPool;

/// The complete HTTP surface: `/`, `/health` and the `/api/v1` resources
pub fn app(pool: PgPool) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(Extension(DbPool(pool)))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router {
    Router::new()
        .merge(bootcamp_routes())
        .merge(course_routes())
        .merge(auth_routes())
}

fn bootcamp_routes() -> Router {
    use handlers::{bootcamps, courses};

    Router::new()
        .route("/bootcamps", get(bootcamps::list).post(bootcamps::create))
        .route(
            "/bootcamps/:id",
            get(bootcamps::get).put(bootcamps::update).delete(bootcamps::delete),
        )
        // Same parameter name as the sibling route; the router rejects mixed names
        .route("/bootcamps/:id/courses", get(courses::list_for_bootcamp).post(courses::create))
}

fn course_routes() -> Router {
    use handlers::courses;

    Router::new()
        .route("/courses", get(courses::list))
        .route("/courses/:id", get(courses::get).put(courses::update).delete(courses::delete))
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Bootcamp API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Bootcamp directory REST API",
            "endpoints": {
                "bootcamps": "/api/v1/bootcamps[/:id] (writes protected)",
                "courses": "/api/v1/courses[/:id], /api/v1/bootcamps/:bootcampId/courses (writes protected)",
                "auth": "/api/v1/auth/register, /api/v1/auth/login, /api/v1/auth/me",
                "health": "/health"
            }
        }
    }))
}

async fn health(Extension(DbPool(pool)): Extension<DbPool>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
