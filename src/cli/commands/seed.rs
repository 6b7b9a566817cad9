use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::auth;
use crate::cli::{utils::output_success, OutputFormat};
use crate::database::models::{CreateBootcamp, CreateCourse, Role};
use crate::database::{DatabaseError, DatabaseManager};
use crate::services::{recompute_average_cost, slugify};

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: Uuid,
    name: String,
    email: String,
    #[serde(default)]
    role: Role,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SeedBootcamp {
    id: Uuid,
    user: Option<Uuid>,
    #[serde(flatten)]
    body: CreateBootcamp,
}

#[derive(Debug, Deserialize)]
struct SeedCourse {
    id: Option<Uuid>,
    bootcamp: Uuid,
    user: Option<Uuid>,
    #[serde(flatten)]
    body: CreateCourse,
}

/// Everything read from a seed directory, validated before any write
#[derive(Debug)]
struct SeedData {
    users: Vec<SeedUser>,
    bootcamps: Vec<SeedBootcamp>,
    courses: Vec<SeedCourse>,
}

impl SeedData {
    fn load(dir: &Path) -> anyhow::Result<Self> {
        let data = Self {
            users: read_optional(&dir.join("users.json"))?,
            bootcamps: read_optional(&dir.join("bootcamps.json"))?,
            courses: read_optional(&dir.join("courses.json"))?,
        };
        for b in &data.bootcamps {
            b.body.validate().with_context(|| format!("bootcamp {}", b.id))?;
        }
        for c in &data.courses {
            c.body.validate().with_context(|| format!("course for bootcamp {}", c.bootcamp))?;
        }
        Ok(data)
    }
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!("No {} in seed directory", path.display());
        return Ok(vec![]);
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub async fn handle(dir: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = SeedData::load(&dir)?;

    let mut hashes = Vec::with_capacity(data.users.len());
    for user in &data.users {
        hashes.push(auth::hash_password(user.password.clone()).await?);
    }

    let pool = DatabaseManager::connect().await?;
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    for (user, hash) in data.users.iter().zip(&hashes) {
        sqlx::query("INSERT INTO users (id, name, email, role, password) VALUES ($1, $2, $3, $4, $5)")
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(hash)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)
            .with_context(|| format!("inserting user {}", user.email))?;
    }

    for b in &data.bootcamps {
        let body = &b.body;
        sqlx::query(
            "INSERT INTO bootcamps \
             (id, name, slug, description, website, phone, email, address, careers, \
              housing, job_assistance, job_guarantee, accept_gi, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(b.id)
        .bind(&body.name)
        .bind(body.name.as_deref().map(slugify))
        .bind(&body.description)
        .bind(&body.website)
        .bind(&body.phone)
        .bind(&body.email)
        .bind(&body.address)
        .bind(&body.careers)
        .bind(body.housing)
        .bind(body.job_assistance)
        .bind(body.job_guarantee)
        .bind(body.accept_gi)
        .bind(b.user)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)
        .with_context(|| format!("inserting bootcamp {}", b.id))?;
    }

    let mut touched = BTreeSet::new();
    for c in &data.courses {
        let body = &c.body;
        sqlx::query(
            "INSERT INTO courses \
             (id, title, description, weeks, tuition, minimum_skill, scholarship_available, bootcamp_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(c.id.unwrap_or_else(Uuid::new_v4))
        .bind(&body.title)
        .bind(&body.description)
        .bind(body.weeks)
        .bind(body.tuition)
        .bind(&body.minimum_skill)
        .bind(body.scholarship_available)
        .bind(c.bootcamp)
        .bind(c.user)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)
        .with_context(|| format!("inserting course for bootcamp {}", c.bootcamp))?;
        touched.insert(c.bootcamp);
    }

    for bootcamp_id in &touched {
        recompute_average_cost(&mut tx, *bootcamp_id).await?;
    }

    tx.commit().await.map_err(DatabaseError::from)?;
    DatabaseManager::close(&pool).await;

    tracing::info!("Seeded from {}", dir.display());
    output_success(
        output_format,
        "Data imported",
        Some(json!({
            "users": data.users.len(),
            "bootcamps": data.bootcamps.len(),
            "courses": data.courses.len()
        })),
    )
}

pub async fn purge(confirmed: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    if !confirmed {
        anyhow::bail!("Refusing to purge without --yes");
    }

    let pool = DatabaseManager::connect().await?;
    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;
    let mut removed = Vec::new();
    for table in ["courses", "bootcamps", "users"] {
        let result = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        removed.push((table, result.rows_affected()));
    }
    tx.commit().await.map_err(DatabaseError::from)?;
    DatabaseManager::close(&pool).await;

    let counts: serde_json::Map<String, serde_json::Value> =
        removed.into_iter().map(|(table, n)| (table.to_string(), json!(n))).collect();
    output_success(output_format, "Data destroyed", Some(json!({ "deleted": counts })))
}
