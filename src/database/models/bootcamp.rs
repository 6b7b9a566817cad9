use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::filter::{Collection, FieldDef, FieldKind};

/// Careers a bootcamp may advertise
pub const CAREERS: &[&str] = &["Web Development", "Mobile Development", "UI/UX", "Data Science", "Business", "Other"];

pub static BOOTCAMPS: Collection = Collection {
    name: "bootcamps",
    table: "bootcamps",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Uuid),
        FieldDef::new("name", "name", FieldKind::Text),
        FieldDef::new("description", "description", FieldKind::Text),
        FieldDef::new("slug", "slug", FieldKind::Text),
        FieldDef::new("website", "website", FieldKind::Text),
        FieldDef::new("phone", "phone", FieldKind::Text),
        FieldDef::new("email", "email", FieldKind::Text),
        FieldDef::new("address", "address", FieldKind::Text),
        FieldDef::unsortable("careers", "careers", FieldKind::TextArray),
        FieldDef::new("averageRating", "average_rating", FieldKind::Float),
        FieldDef::new("averageCost", "average_cost", FieldKind::Integer),
        FieldDef::output_only("photo", "photo", FieldKind::Text),
        FieldDef::new("housing", "housing", FieldKind::Boolean),
        FieldDef::new("jobAssistance", "job_assistance", FieldKind::Boolean),
        FieldDef::new("jobGuarantee", "job_guarantee", FieldKind::Boolean),
        FieldDef::new("acceptGi", "accept_gi", FieldKind::Boolean),
        FieldDef::new("user", "user_id", FieldKind::Uuid),
        FieldDef::new("createdAt", "created_at", FieldKind::Timestamp),
    ],
    default_sort: "-createdAt",
};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<i64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    #[serde(rename = "user")]
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcamp {
    #[validate(
        required(message = "Please add a name"),
        length(min = 1, max = 50, message = "Name can not be more than 50 characters")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Please add a description"),
        length(min = 1, max = 500, message = "Description can not be more than 500 characters")
    )]
    pub description: Option<String>,
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(required(message = "Please add an address"), length(min = 1, message = "Please add an address"))]
    pub address: Option<String>,
    #[validate(required(message = "Please add at least one career"), custom(function = "validate_careers"))]
    pub careers: Option<Vec<String>>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcamp {
    #[validate(length(min = 1, max = 50, message = "Name can not be more than 50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Description can not be more than 500 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: Option<String>,
    #[validate(custom(function = "validate_careers"))]
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

fn validate_careers(careers: &[String]) -> Result<(), ValidationError> {
    if careers.is_empty() {
        return Err(ValidationError::new("careers").with_message("Please add at least one career".into()));
    }
    if let Some(unknown) = careers.iter().find(|c| !CAREERS.contains(&c.as_str())) {
        return Err(ValidationError::new("careers").with_message(format!("'{}' is not a supported career", unknown).into()));
    }
    Ok(())
}
