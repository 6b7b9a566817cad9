use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::{with_deadline, DatabaseError};
use crate::database::query_builder::QueryBuilder;
use crate::database::source::{self, RecordSource};
use crate::filter::list_query::json_object_sql;
use crate::filter::{Collection, FieldDef, ListQuery, ListResult};

/// Reads over one collection's table
#[derive(Clone)]
pub struct Repository {
    collection: &'static Collection,
    pool: PgPool,
}

impl Repository {
    pub fn new(collection: &'static Collection, pool: PgPool) -> Self {
        Self { collection, pool }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ListResult, DatabaseError> {
        source::execute(self, query).await
    }

    pub async fn select_404<T>(&self, id: Uuid) -> Result<T, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", self.collection.table);
        let row = with_deadline(async {
            Ok::<_, DatabaseError>(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
        })
        .await?;
        row.ok_or_else(|| DatabaseError::NotFound(format!("No {} found with id of {}", self.singular(), id)))
    }

    /// Every record whose `field` is one of `ids`, as JSON objects carrying
    /// `select` (all fields when empty). Used to populate related records.
    pub async fn select_any_of(&self, field: &str, ids: &[Uuid], select: &[&str]) -> Result<Vec<Value>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let column = self.lookup(field)?.column;
        let fields: Vec<&'static FieldDef> = if select.is_empty() {
            self.collection.fields.iter().collect()
        } else {
            select.iter().map(|name| self.lookup(name)).collect::<Result<_, _>>()?
        };

        let sql = format!(
            "SELECT {} AS row FROM \"{}\" WHERE \"{}\" = ANY($1) ORDER BY \"created_at\" ASC, \"id\" ASC",
            json_object_sql(&fields),
            self.collection.table,
            column
        );
        with_deadline(async {
            let rows: Vec<(Value,)> = sqlx::query_as(&sql).bind(ids).fetch_all(&self.pool).await?;
            Ok::<_, DatabaseError>(rows.into_iter().map(|(row,)| row).collect())
        })
        .await
    }

    fn lookup(&self, name: &str) -> Result<&'static FieldDef, DatabaseError> {
        self.collection.field(name).map_err(|e| DatabaseError::QueryError(e.to_string()))
    }

    /// "bootcamps" -> "bootcamp"
    fn singular(&self) -> &'static str {
        self.collection.name.strip_suffix('s').unwrap_or(self.collection.name)
    }
}

#[async_trait]
impl RecordSource for Repository {
    async fn count(&self, query: &ListQuery) -> Result<u64, DatabaseError> {
        QueryBuilder::count(&self.pool, &query.to_count_sql()).await
    }

    async fn fetch(&self, query: &ListQuery) -> Result<Vec<Value>, DatabaseError> {
        QueryBuilder::fetch_rows(&self.pool, &query.to_sql()).await
    }
}
