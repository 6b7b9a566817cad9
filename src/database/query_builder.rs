use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Postgres, Row};

use crate::config;
use crate::database::manager::DatabaseError;
use crate::filter::{FilterValue, SqlResult};

/// Runs generated SQL against the pool, binding typed filter operands
pub struct QueryBuilder;

impl QueryBuilder {
    /// Execute a query whose single column `row` is a JSON object per record
    pub async fn fetch_rows(pool: &PgPool, sql: &SqlResult) -> Result<Vec<Value>, DatabaseError> {
        log_sql(sql);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    /// Execute a `SELECT COUNT(*) AS count ...` query
    pub async fn count(pool: &PgPool, sql: &SqlResult) -> Result<u64, DatabaseError> {
        log_sql(sql);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        u64::try_from(count).map_err(|_| DatabaseError::QueryError(format!("negative count: {}", count)))
    }
}

fn log_sql(sql: &SqlResult) {
    if config::config().database.enable_query_logging {
        tracing::debug!("SQL: {} {:?}", sql.query, sql.params);
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q FilterValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        FilterValue::Text(s) => q.bind(s.as_str()),
        FilterValue::Integer(i) => q.bind(*i),
        FilterValue::Float(f) => q.bind(*f),
        FilterValue::Boolean(b) => q.bind(*b),
        FilterValue::Timestamp(ts) => q.bind(*ts),
        FilterValue::Uuid(id) => q.bind(*id),
    }
}
