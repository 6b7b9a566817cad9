use axum::extract::{Extension, Path, RawQuery};
use serde_json::{json, Value};

use crate::database::models::{Bootcamp, CreateBootcamp, UpdateBootcamp, BOOTCAMPS};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, DbPool, ValidatedJson};
use crate::services::BootcampService;

use super::utils::{list_query, parse_id};

/// GET /api/v1/bootcamps - Filtered, sorted, paged bootcamps with their courses
pub async fn list(
    RawQuery(query): RawQuery,
    Extension(DbPool(pool)): Extension<DbPool>,
) -> ApiResult<Vec<Value>> {
    let query = list_query(&BOOTCAMPS, query.as_deref())?;
    let result = BootcampService::new(pool).list(&query).await?;
    Ok(ApiResponse::list(result))
}

/// GET /api/v1/bootcamps/:id
pub async fn get(Path(id): Path<String>, Extension(DbPool(pool)): Extension<DbPool>) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(BootcampService::new(pool).get(id).await?))
}

/// POST /api/v1/bootcamps
pub async fn create(
    Extension(DbPool(pool)): Extension<DbPool>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<CreateBootcamp>,
) -> ApiResult<Bootcamp> {
    let bootcamp = BootcampService::new(pool).create(body, user.id).await?;
    Ok(ApiResponse::created(bootcamp))
}

/// PUT /api/v1/bootcamps/:id - Partial update
pub async fn update(
    Path(id): Path<String>,
    Extension(DbPool(pool)): Extension<DbPool>,
    AuthUser(_user): AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateBootcamp>,
) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(BootcampService::new(pool).update(id, body).await?))
}

/// DELETE /api/v1/bootcamps/:id - Also removes the bootcamp's courses
pub async fn delete(
    Path(id): Path<String>,
    Extension(DbPool(pool)): Extension<DbPool>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    BootcampService::new(pool).delete(id).await?;
    Ok(ApiResponse::success(json!({})))
}
