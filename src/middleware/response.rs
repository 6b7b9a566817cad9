use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::filter::{ListResult, PaginationMeta};

/// Wrapper for API responses that adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    /// Listings report how many records they hold
    pub count: Option<usize>,
    /// Paged listings also link to the neighbouring pages
    pub pagination: Option<PaginationMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self { data, status_code: None, count: None, pagination: None }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code: Some(status_code), count: None, pagination: None }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl ApiResponse<Vec<Value>> {
    pub fn list(result: ListResult) -> Self {
        let count = result.records.len();
        Self { data: result.records, status_code: None, count: Some(count), pagination: Some(result.pagination) }
    }

    /// A complete, unpaged collection
    pub fn all(records: Vec<Value>) -> Self {
        let count = records.len();
        Self { data: records, status_code: None, count: Some(count), pagination: None }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({ "success": true });
        if let Some(count) = self.count {
            envelope["count"] = json!(count);
        }
        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }
        envelope["data"] = data_value;

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PageRef, PageWindow};

    async fn body(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn lists_carry_count_and_pagination() {
        let result = ListResult {
            records: vec![json!({ "id": "a" })],
            total: 3,
            pagination: PaginationMeta::new(PageWindow { page: 1, limit: 1 }, 3),
        };
        let (status, value) = body(ApiResponse::list(result).into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({
                "success": true,
                "count": 1,
                "pagination": { "next": PageRef { page: 2, limit: 1 } },
                "data": [{ "id": "a" }]
            })
        );
    }

    #[tokio::test]
    async fn unpaged_collections_carry_only_a_count() {
        let records = vec![json!({ "id": "a" }), json!({ "id": "b" })];
        let (status, value) = body(ApiResponse::all(records).into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({ "success": true, "count": 2, "data": [{ "id": "a" }, { "id": "b" }] })
        );
    }

    #[tokio::test]
    async fn created_responses_use_201() {
        let (status, value) = body(ApiResponse::created(json!({ "id": "a" })).into_response()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(value, json!({ "success": true, "data": { "id": "a" } }));
    }
}
