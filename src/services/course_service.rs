use std::collections::HashMap;

use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::manager::{with_deadline, DatabaseError};
use crate::database::models::{Course, CreateCourse, UpdateCourse, BOOTCAMPS, COURSES};
use crate::database::Repository;
use crate::filter::{ListQuery, ListResult};

/// Bootcamp fields embedded in each course
const BOOTCAMP_SUMMARY: &[&str] = &["id", "name", "description"];

pub struct CourseService {
    pool: PgPool,
    courses: Repository,
    bootcamps: Repository,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            courses: Repository::new(&COURSES, pool.clone()),
            bootcamps: Repository::new(&BOOTCAMPS, pool.clone()),
            pool,
        }
    }

    /// All courses, with the owning bootcamp's name and description inlined
    pub async fn list(&self, query: &ListQuery) -> Result<ListResult, DatabaseError> {
        let mut result = self.courses.list(query).await?;
        self.populate_bootcamps(&mut result.records).await?;
        Ok(result)
    }

    /// Every course of one bootcamp, oldest first. No filter or window applies.
    pub async fn list_for_bootcamp(&self, bootcamp_id: Uuid) -> Result<Vec<Value>, DatabaseError> {
        self.courses.select_any_of("bootcamp", &[bootcamp_id], &[]).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Value, DatabaseError> {
        let course: Course = self.courses.select_404(id).await?;
        let mut records = vec![serde_json::to_value(course).map_err(|e| DatabaseError::QueryError(e.to_string()))?];
        self.populate_bootcamps(&mut records).await?;
        Ok(records.remove(0))
    }

    /// Replace each record's `bootcamp` id with `{id, name, description}`
    async fn populate_bootcamps(&self, records: &mut [Value]) -> Result<(), DatabaseError> {
        let mut ids: Vec<Uuid> = records.iter().filter_map(bootcamp_ref).collect();
        ids.sort_unstable();
        ids.dedup();

        let bootcamps: HashMap<String, Value> = self
            .bootcamps
            .select_any_of("id", &ids, BOOTCAMP_SUMMARY)
            .await?
            .into_iter()
            .filter_map(|b| Some((b.get("id")?.as_str()?.to_string(), b)))
            .collect();

        for record in records.iter_mut() {
            let Some(obj) = record.as_object_mut() else { continue };
            let key = obj.get("bootcamp").and_then(Value::as_str).map(str::to_string);
            if let Some(summary) = key.and_then(|k| bootcamps.get(&k)) {
                obj.insert("bootcamp".to_string(), summary.clone());
            }
        }
        Ok(())
    }

    /// Adds a course to an existing bootcamp and refreshes its average cost
    pub async fn create(&self, bootcamp_id: Uuid, input: CreateCourse, user_id: Uuid) -> Result<Course, DatabaseError> {
        let course = with_deadline(async {
            let mut tx = self.pool.begin().await?;

            let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM bootcamps WHERE id = $1 FOR UPDATE")
                .bind(bootcamp_id)
                .fetch_optional(&mut *tx)
                .await?;
            if locked.is_none() {
                return Err(DatabaseError::NotFound(format!("No bootcamp with the id of {}", bootcamp_id)));
            }

            let course = sqlx::query_as::<_, Course>(
                "INSERT INTO courses \
                 (title, description, weeks, tuition, minimum_skill, scholarship_available, bootcamp_id, user_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
            )
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.weeks)
            .bind(input.tuition)
            .bind(&input.minimum_skill)
            .bind(input.scholarship_available)
            .bind(bootcamp_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            recompute_average_cost(&mut tx, bootcamp_id).await?;
            tx.commit().await?;
            Ok::<_, DatabaseError>(course)
        })
        .await?;

        tracing::info!("Created course {} for bootcamp {}", course.id, bootcamp_id);
        Ok(course)
    }

    pub async fn update(&self, id: Uuid, input: UpdateCourse) -> Result<Course, DatabaseError> {
        with_deadline(async {
            let mut tx = self.pool.begin().await?;
            let course = sqlx::query_as::<_, Course>(
                "UPDATE courses SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 weeks = COALESCE($4, weeks), \
                 tuition = COALESCE($5, tuition), \
                 minimum_skill = COALESCE($6, minimum_skill), \
                 scholarship_available = COALESCE($7, scholarship_available) \
                 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.weeks)
            .bind(input.tuition)
            .bind(&input.minimum_skill)
            .bind(input.scholarship_available)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(id))?;

            recompute_average_cost(&mut tx, course.bootcamp_id).await?;
            tx.commit().await?;
            Ok::<_, DatabaseError>(course)
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        with_deadline(async {
            let mut tx = self.pool.begin().await?;
            let bootcamp_id: Uuid = sqlx::query_scalar("DELETE FROM courses WHERE id = $1 RETURNING bootcamp_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| not_found(id))?;

            recompute_average_cost(&mut tx, bootcamp_id).await?;
            tx.commit().await?;
            tracing::info!("Deleted course {} from bootcamp {}", id, bootcamp_id);
            Ok::<_, DatabaseError>(())
        })
        .await
    }
}

/// `ceil(avg(tuition) / 10) * 10` over the bootcamp's remaining courses;
/// NULL once it has none.
pub async fn recompute_average_cost(conn: &mut PgConnection, bootcamp_id: Uuid) -> Result<Option<i64>, DatabaseError> {
    let cost: Option<i64> = sqlx::query_scalar(
        "UPDATE bootcamps SET average_cost = \
         (SELECT (CEIL(AVG(tuition) / 10.0) * 10)::BIGINT FROM courses WHERE bootcamp_id = $1) \
         WHERE id = $1 RETURNING average_cost",
    )
    .bind(bootcamp_id)
    .fetch_one(conn)
    .await?;
    tracing::debug!("Average cost of bootcamp {} is now {:?}", bootcamp_id, cost);
    Ok(cost)
}

fn not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("No course with the id of {}", id))
}

fn bootcamp_ref(record: &Value) -> Option<Uuid> {
    record.get("bootcamp").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
}
