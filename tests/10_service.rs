mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

// Requests that are answered without a working database

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let app = common::offline_app();
    let res = common::send(&app, common::get("/")).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], json!(true));
    assert!(res.body["data"]["endpoints"]["bootcamps"].is_string(), "body: {}", res.body);
    Ok(())
}

#[tokio::test]
async fn health_reports_an_unreachable_database() -> Result<()> {
    let app = common::offline_app();
    let res = common::send(&app, common::get("/health")).await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["success"], json!(false));
    assert_eq!(res.body["data"]["status"], json!("degraded"));
    Ok(())
}

#[tokio::test]
async fn listing_without_a_database_is_unavailable() -> Result<()> {
    let app = common::offline_app();
    let res = common::send(&app, common::get("/api/v1/bootcamps")).await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE, "body: {}", res.body);
    assert_eq!(res.body["success"], json!(false));
    assert!(res.body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    let app = common::offline_app();
    let res = common::send(&app, common::request(Method::GET, "/api/v1/campers", None, None)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_identifiers_are_bad_requests() -> Result<()> {
    let app = common::offline_app();

    for uri in ["/api/v1/bootcamps/5d713995b721c3bb38c1f5d0", "/api/v1/courses/not-an-id"] {
        let res = common::send(&app, common::get(uri)).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(res.body["success"], json!(false));
        let error = res.body["error"].as_str().unwrap_or_default();
        assert!(error.starts_with("Resource not found with id of "), "error: {}", error);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_filter_fields_and_operators_are_rejected() -> Result<()> {
    let app = common::offline_app();

    for query in ["averageCost[$where]=1", "nope=1", "sort=careers", "housing[gt]=true", "averageCost[lte]=cheap"] {
        let res = common::send(&app, common::get(&format!("/api/v1/bootcamps?{}", query))).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "query {}: {}", query, res.body);
        assert_eq!(res.body["success"], json!(false));
    }
    Ok(())
}
