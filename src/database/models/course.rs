use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::filter::{Collection, FieldDef, FieldKind};

pub const SKILL_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];

pub static COURSES: Collection = Collection {
    name: "courses",
    table: "courses",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Uuid),
        FieldDef::new("title", "title", FieldKind::Text),
        FieldDef::new("description", "description", FieldKind::Text),
        FieldDef::new("weeks", "weeks", FieldKind::Integer),
        FieldDef::new("tuition", "tuition", FieldKind::Integer),
        FieldDef::new("minimumSkill", "minimum_skill", FieldKind::Text),
        FieldDef::new("scholarshipAvailable", "scholarship_available", FieldKind::Boolean),
        FieldDef::new("bootcamp", "bootcamp_id", FieldKind::Uuid),
        FieldDef::new("user", "user_id", FieldKind::Uuid),
        FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    ],
    default_sort: "-createdAt",
};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i64,
    pub tuition: i64,
    pub minimum_skill: String,
    pub scholarship_available: bool,
    #[serde(rename = "bootcamp")]
    pub bootcamp_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /bootcamps/:bootcampId/courses`; the bootcamp comes from the path
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[validate(required(message = "Please add a course title"), length(min = 1, message = "Please add a course title"))]
    pub title: Option<String>,
    #[validate(required(message = "Please add a description"), length(min = 1, message = "Please add a description"))]
    pub description: Option<String>,
    #[validate(required(message = "Please add number of weeks"), range(min = 1, message = "Weeks must be positive"))]
    pub weeks: Option<i64>,
    #[validate(required(message = "Please add a tuition cost"), range(min = 0, message = "Tuition can not be negative"))]
    pub tuition: Option<i64>,
    #[validate(required(message = "Please add a minimum skill"), custom(function = "validate_skill"))]
    pub minimum_skill: Option<String>,
    #[serde(default)]
    pub scholarship_available: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    #[validate(length(min = 1, message = "Please add a course title"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Weeks must be positive"))]
    pub weeks: Option<i64>,
    #[validate(range(min = 0, message = "Tuition can not be negative"))]
    pub tuition: Option<i64>,
    #[validate(custom(function = "validate_skill"))]
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

fn validate_skill(skill: &str) -> Result<(), ValidationError> {
    if SKILL_LEVELS.contains(&skill) {
        Ok(())
    } else {
        Err(ValidationError::new("minimumSkill")
            .with_message("Minimum skill must be beginner, intermediate or advanced".into()))
    }
}
