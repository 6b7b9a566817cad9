use async_trait::async_trait;
use serde_json::Value;

use crate::database::manager::{with_deadline, DatabaseError};
use crate::filter::{ListQuery, ListResult, PaginationMeta};

/// Something a [`ListQuery`] can run against.
///
/// `count` sees the filter only; `fetch` applies projection, sort and the
/// page window as well.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn count(&self, query: &ListQuery) -> Result<u64, DatabaseError>;

    async fn fetch(&self, query: &ListQuery) -> Result<Vec<Value>, DatabaseError>;
}

/// Run the count and the page fetch concurrently under the query deadline
/// and assemble the pagination links.
pub async fn execute<S>(source: &S, query: &ListQuery) -> Result<ListResult, DatabaseError>
where
    S: RecordSource + ?Sized,
{
    let (total, records) = with_deadline(futures::future::try_join(source.count(query), source.fetch(query))).await?;

    let window = query.window();
    tracing::debug!(
        "Listed {} of {} {} (page={}, limit={})",
        records.len(),
        total,
        query.collection().name,
        window.page,
        window.limit
    );

    Ok(ListResult { records, total, pagination: PaginationMeta::new(window, total) })
}
