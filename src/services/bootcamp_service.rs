use std::collections::HashMap;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{with_deadline, DatabaseError};
use crate::database::models::{Bootcamp, CreateBootcamp, UpdateBootcamp, BOOTCAMPS, COURSES};
use crate::database::Repository;
use crate::filter::{ListQuery, ListResult};

pub struct BootcampService {
    pool: PgPool,
    bootcamps: Repository,
    courses: Repository,
}

impl BootcampService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bootcamps: Repository::new(&BOOTCAMPS, pool.clone()),
            courses: Repository::new(&COURSES, pool.clone()),
            pool,
        }
    }

    /// One page of bootcamps, each carrying its `courses`
    pub async fn list(&self, query: &ListQuery) -> Result<ListResult, DatabaseError> {
        let mut result = self.bootcamps.list(query).await?;
        self.populate_courses(&mut result.records).await?;
        Ok(result)
    }

    async fn populate_courses(&self, records: &mut [Value]) -> Result<(), DatabaseError> {
        let ids: Vec<Uuid> = records.iter().filter_map(record_id).collect();
        let courses = self.courses.select_any_of("bootcamp", &ids, &[]).await?;

        let mut by_bootcamp: HashMap<String, Vec<Value>> = HashMap::new();
        for course in courses {
            if let Some(bootcamp) = course.get("bootcamp").and_then(Value::as_str) {
                by_bootcamp.entry(bootcamp.to_string()).or_default().push(course);
            }
        }

        for record in records.iter_mut() {
            let key = record.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            if let Some(obj) = record.as_object_mut() {
                obj.insert("courses".to_string(), Value::Array(by_bootcamp.remove(&key).unwrap_or_default()));
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Bootcamp, DatabaseError> {
        self.bootcamps.select_404(id).await
    }

    pub async fn create(&self, input: CreateBootcamp, user_id: Uuid) -> Result<Bootcamp, DatabaseError> {
        let slug = input.name.as_deref().map(slugify);
        let bootcamp = with_deadline(async {
            Ok::<_, DatabaseError>(
                sqlx::query_as::<_, Bootcamp>(
                    "INSERT INTO bootcamps \
                     (name, slug, description, website, phone, email, address, careers, \
                      housing, job_assistance, job_guarantee, accept_gi, user_id) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                     RETURNING *",
                )
                .bind(&input.name)
                .bind(&slug)
                .bind(&input.description)
                .bind(&input.website)
                .bind(&input.phone)
                .bind(&input.email)
                .bind(&input.address)
                .bind(&input.careers)
                .bind(input.housing)
                .bind(input.job_assistance)
                .bind(input.job_guarantee)
                .bind(input.accept_gi)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
            )
        })
        .await?;

        tracing::info!("Created bootcamp {} ({})", bootcamp.id, bootcamp.slug);
        Ok(bootcamp)
    }

    /// Partial update. A rename regenerates the slug.
    pub async fn update(&self, id: Uuid, input: UpdateBootcamp) -> Result<Bootcamp, DatabaseError> {
        let slug = input.name.as_deref().map(slugify);
        let bootcamp = with_deadline(async {
            Ok::<_, DatabaseError>(
                sqlx::query_as::<_, Bootcamp>(
                    "UPDATE bootcamps SET \
                     name = COALESCE($2, name), \
                     slug = COALESCE($3, slug), \
                     description = COALESCE($4, description), \
                     website = COALESCE($5, website), \
                     phone = COALESCE($6, phone), \
                     email = COALESCE($7, email), \
                     address = COALESCE($8, address), \
                     careers = COALESCE($9, careers), \
                     housing = COALESCE($10, housing), \
                     job_assistance = COALESCE($11, job_assistance), \
                     job_guarantee = COALESCE($12, job_guarantee), \
                     accept_gi = COALESCE($13, accept_gi) \
                     WHERE id = $1 RETURNING *",
                )
                .bind(id)
                .bind(&input.name)
                .bind(&slug)
                .bind(&input.description)
                .bind(&input.website)
                .bind(&input.phone)
                .bind(&input.email)
                .bind(&input.address)
                .bind(&input.careers)
                .bind(input.housing)
                .bind(input.job_assistance)
                .bind(input.job_guarantee)
                .bind(input.accept_gi)
                .fetch_optional(&self.pool)
                .await?,
            )
        })
        .await?;

        bootcamp.ok_or_else(|| not_found(id))
    }

    /// Removes the bootcamp and its courses together
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        with_deadline(async {
            let mut tx = self.pool.begin().await?;
            let courses = sqlx::query("DELETE FROM courses WHERE bootcamp_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            let deleted = sqlx::query("DELETE FROM bootcamps WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if deleted == 0 {
                return Err(not_found(id));
            }
            tx.commit().await?;
            tracing::info!("Deleted bootcamp {} and {} course(s)", id, courses);
            Ok::<_, DatabaseError>(())
        })
        .await
    }
}

fn not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("No bootcamp found with id of {}", id))
}

fn record_id(record: &Value) -> Option<Uuid> {
    record.get("id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}

/// "Devworks Bootcamp" -> "devworks-bootcamp"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
