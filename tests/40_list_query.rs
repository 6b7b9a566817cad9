mod common;

use anyhow::{Context, Result};
use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

// Each test owns a fresh publisher and filters on `user=<id>`, so rows from
// other runs never leak into the counts below.

struct Fixture {
    app: Router,
    token: String,
    user: String,
    names: Vec<String>,
}

async fn fixture() -> Result<Option<Fixture>> {
    let Some(app) = common::live_app().await? else { return Ok(None) };
    let token = common::register_publisher(&app).await?;
    let me = common::send(&app, common::request(Method::GET, "/api/v1/auth/me", None, Some(&token))).await?;
    let user = me.body["data"]["id"].as_str().context("user id")?.to_string();

    let mut names = Vec::new();
    for (i, housing) in [true, false, true].into_iter().enumerate() {
        let name = common::unique_name(&format!("Listing {}", i + 1));
        let mut body = common::bootcamp_body(&name);
        body["housing"] = json!(housing);
        if i == 1 {
            body["careers"] = json!(["Business"]);
        }
        let res = common::send(&app, common::request(Method::POST, "/api/v1/bootcamps", Some(&body), Some(&token))).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create failed: {}", res.body);
        names.push(name);
    }
    names.sort();
    Ok(Some(Fixture { app, token, user, names }))
}

impl Fixture {
    async fn list(&self, query: &str) -> Result<Value> {
        let uri = format!("/api/v1/bootcamps?user={}&{}", self.user, query);
        let res = common::send(&self.app, common::get(&uri)).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "{} -> {} {}", uri, res.status, res.body);
        Ok(res.body)
    }

    async fn cleanup(&self) -> Result<()> {
        let body = self.list("limit=100").await?;
        for record in body["data"].as_array().cloned().unwrap_or_default() {
            let uri = format!("/api/v1/bootcamps/{}", record["id"].as_str().unwrap_or_default());
            common::send(&self.app, common::request(Method::DELETE, &uri, None, Some(&self.token))).await?;
        }
        Ok(())
    }
}

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|r| r["name"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn one_record_per_page_walks_the_collection() -> Result<()> {
    let Some(f) = fixture().await? else { return Ok(()) };

    let page1 = f.list("sort=name&limit=1&page=1").await?;
    assert_eq!(page1["count"], json!(1));
    assert_eq!(names(&page1), vec![f.names[0].clone()]);
    assert_eq!(page1["pagination"], json!({ "next": { "page": 2, "limit": 1 } }));

    let page2 = f.list("sort=name&limit=1&page=2").await?;
    assert_eq!(names(&page2), vec![f.names[1].clone()]);
    assert_eq!(
        page2["pagination"],
        json!({ "next": { "page": 3, "limit": 1 }, "prev": { "page": 1, "limit": 1 } })
    );

    let page3 = f.list("sort=name&limit=1&page=3").await?;
    assert_eq!(names(&page3), vec![f.names[2].clone()]);
    assert_eq!(page3["pagination"], json!({ "prev": { "page": 2, "limit": 1 } }));

    let beyond = f.list("sort=name&limit=1&page=4").await?;
    assert_eq!(beyond["count"], json!(0));
    assert_eq!(beyond["data"], json!([]));

    f.cleanup().await
}

#[tokio::test]
async fn default_limit_is_a_single_record() -> Result<()> {
    let Some(f) = fixture().await? else { return Ok(()) };

    let body = f.list("").await?;
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["pagination"]["next"], json!({ "page": 2, "limit": 1 }));

    f.cleanup().await
}

#[tokio::test]
async fn filters_sorting_and_projection() -> Result<()> {
    let Some(f) = fixture().await? else { return Ok(()) };

    let housed = f.list("housing=true&limit=10").await?;
    assert_eq!(housed["count"], json!(2));
    assert!(housed["data"].as_array().into_iter().flatten().all(|r| r["housing"] == json!(true)));

    let business = f.list("careers[in]=Business&limit=10").await?;
    assert_eq!(business["count"], json!(3));
    let only_business = f.list("careers=Business&housing=false&limit=10").await?;
    assert_eq!(names(&only_business), vec![f.names[1].clone()]);

    let desc = f.list("sort=-name&limit=10").await?;
    let mut expected = f.names.clone();
    expected.reverse();
    assert_eq!(names(&desc), expected);

    let projected = f.list("select=name,housing&sort=name&limit=10").await?;
    for record in projected["data"].as_array().into_iter().flatten() {
        assert!(record.get("id").is_some());
        assert!(record.get("name").is_some());
        assert!(record.get("housing").is_some());
        assert!(record.get("description").is_none(), "unexpected field in {}", record);
        assert!(record.get("address").is_none());
    }

    f.cleanup().await
}

#[tokio::test]
async fn listed_bootcamps_carry_their_courses() -> Result<()> {
    let Some(f) = fixture().await? else { return Ok(()) };

    let first = f.list("sort=name&limit=1").await?;
    let id = first["data"][0]["id"].as_str().context("bootcamp id")?.to_string();
    let uri = format!("/api/v1/bootcamps/{}/courses", id);
    let course = common::course_body("Front End Web Development", 8000);
    let res = common::send(&f.app, common::request(Method::POST, &uri, Some(&course), Some(&f.token))).await?;
    assert_eq!(res.status, StatusCode::CREATED, "add course: {}", res.body);

    let listed = f.list("sort=name&limit=3").await?;
    let data = listed["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(data[0]["courses"].as_array().map(Vec::len), Some(1));
    assert_eq!(data[0]["courses"][0]["title"], json!("Front End Web Development"));
    assert_eq!(data[1]["courses"], json!([]));

    let costly = f.list("averageCost[gte]=8000&limit=10").await?;
    assert_eq!(names(&costly), vec![f.names[0].clone()]);

    f.cleanup().await
}
