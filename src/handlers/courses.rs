use axum::extract::{Extension, Path, RawQuery};
use serde_json::{json, Value};

use crate::database::models::{Course, CreateCourse, UpdateCourse, COURSES};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, DbPool, ValidatedJson};
use crate::services::CourseService;

use super::utils::{list_query, parse_id};

/// GET /api/v1/courses - Every course, bootcamp name and description inlined
pub async fn list(
    RawQuery(query): RawQuery,
    Extension(DbPool(pool)): Extension<DbPool>,
) -> ApiResult<Vec<Value>> {
    let query = list_query(&COURSES, query.as_deref())?;
    let result = CourseService::new(pool).list(&query).await?;
    Ok(ApiResponse::list(result))
}

/// GET /api/v1/bootcamps/:bootcampId/courses - All of them, unpaged
pub async fn list_for_bootcamp(
    Path(bootcamp_id): Path<String>,
    Extension(DbPool(pool)): Extension<DbPool>,
) -> ApiResult<Vec<Value>> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let courses = CourseService::new(pool).list_for_bootcamp(bootcamp_id).await?;
    Ok(ApiResponse::all(courses))
}

/// GET /api/v1/courses/:id
pub async fn get(Path(id): Path<String>, Extension(DbPool(pool)): Extension<DbPool>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(CourseService::new(pool).get(id).await?))
}

/// POST /api/v1/bootcamps/:bootcampId/courses - 404 when the bootcamp is absent
pub async fn create(
    Path(bootcamp_id): Path<String>,
    Extension(DbPool(pool)): Extension<DbPool>,
    AuthUser(user): AuthUser,
    ValidatedJson(body): ValidatedJson<CreateCourse>,
) -> ApiResult<Course> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let course = CourseService::new(pool).create(bootcamp_id, body, user.id).await?;
    Ok(ApiResponse::created(course))
}

/// PUT /api/v1/courses/:id
pub async fn update(
    Path(id): Path<String>,
    Extension(DbPool(pool)): Extension<DbPool>,
    AuthUser(_user): AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateCourse>,
) -> ApiResult<Course> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(CourseService::new(pool).update(id, body).await?))
}

/// DELETE /api/v1/courses/:id
pub async fn delete(
    Path(id): Path<String>,
    Extension(DbPool(pool)): Extension<DbPool>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    CourseService::new(pool).delete(id).await?;
    Ok(ApiResponse::success(json!({})))
}
