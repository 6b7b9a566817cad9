//! In-memory stand-in for the database, for exercising list semantics.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::{DatabaseError, RecordSource};
use crate::filter::{FieldDef, FieldKind, FilterCondition, FilterOp, FilterValue, ListQuery, SortDirection};

/// Evaluates a [`ListQuery`] over JSON records keyed by public field name
pub struct MemorySource {
    records: Vec<Value>,
}

impl MemorySource {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    fn matching(&self, query: &ListQuery) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|r| query.conditions().iter().all(|c| matches_condition(r, c)))
            .collect()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn count(&self, query: &ListQuery) -> Result<u64, DatabaseError> {
        Ok(self.matching(query).len() as u64)
    }

    async fn fetch(&self, query: &ListQuery) -> Result<Vec<Value>, DatabaseError> {
        let mut rows = self.matching(query);
        let sort = query.effective_sort();
        rows.sort_by(|a, b| {
            sort.iter()
                .map(|key| {
                    let ord = compare_json(a.get(key.field.name), b.get(key.field.name));
                    match key.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let window = query.window();
        let projection = query.projection();
        Ok(rows
            .into_iter()
            .skip(usize::try_from(window.start_index()).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
            .map(|r| project(r, &projection))
            .collect())
    }
}

fn project(record: &Value, fields: &[&'static FieldDef]) -> Value {
    let mut out = Map::new();
    for f in fields {
        out.insert(f.name.to_string(), record.get(f.name).cloned().unwrap_or(Value::Null));
    }
    Value::Object(out)
}

fn matches_condition(record: &Value, condition: &FilterCondition) -> bool {
    let Some(actual) = record.get(condition.field.name) else {
        return false;
    };

    if condition.field.kind == FieldKind::TextArray {
        let items: Vec<&str> = actual.as_array().into_iter().flatten().filter_map(Value::as_str).collect();
        return condition
            .values
            .iter()
            .any(|v| matches!(v, FilterValue::Text(t) if items.contains(&t.as_str())));
    }

    let ord = |v: &FilterValue| compare_operand(actual, v);
    match condition.op {
        FilterOp::Eq => ord(&condition.values[0]) == Some(Ordering::Equal),
        FilterOp::In => condition.values.iter().any(|v| ord(v) == Some(Ordering::Equal)),
        FilterOp::Gt => ord(&condition.values[0]) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(ord(&condition.values[0]), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lt => ord(&condition.values[0]) == Some(Ordering::Less),
        FilterOp::Lte => matches!(ord(&condition.values[0]), Some(Ordering::Less | Ordering::Equal)),
    }
}

/// `actual` compared with `operand`; None when the types do not line up (SQL NULL semantics)
fn compare_operand(actual: &Value, operand: &FilterValue) -> Option<Ordering> {
    match operand {
        FilterValue::Text(s) => actual.as_str().map(|a| a.cmp(s.as_str())),
        FilterValue::Integer(i) => actual.as_i64().map(|a| a.cmp(i)),
        FilterValue::Float(f) => actual.as_f64().and_then(|a| a.partial_cmp(f)),
        FilterValue::Boolean(b) => actual.as_bool().map(|a| a.cmp(b)),
        FilterValue::Timestamp(ts) => actual
            .as_str()
            .and_then(|a| DateTime::parse_from_rfc3339(a).ok())
            .map(|a| a.with_timezone(&Utc).cmp(ts)),
        FilterValue::Uuid(id) => actual.as_str().and_then(|a| Uuid::parse_str(a).ok()).map(|a| a.cmp(id)),
    }
}

/// Nulls sort last, as in Postgres ascending order
fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListConfig;
    use crate::database::models::BOOTCAMPS;
    use crate::database::source::execute;
    use crate::filter::{PageRef, RawParams};
    use serde_json::json;

    fn config() -> ListConfig {
        ListConfig { default_page: 1, default_limit: 1, max_limit: Some(1000), debug_logging: false }
    }

    fn bootcamp(n: u32, cost: i64, housing: bool, careers: &[&str]) -> Value {
        json!({
            "id": Uuid::from_u128(n as u128).to_string(),
            "name": format!("Bootcamp {:02}", n),
            "description": "A bootcamp",
            "averageCost": cost,
            "housing": housing,
            "careers": careers,
            "createdAt": format!("2024-01-{:02}T00:00:00Z", n),
        })
    }

    fn fixture() -> MemorySource {
        MemorySource::new(
            (1..=12)
                .map(|n| {
                    let careers: &[&str] = if n % 3 == 0 { &["Business"] } else { &["Web Development", "UI/UX"] };
                    bootcamp(n, (n as i64) * 1000, n % 2 == 0, careers)
                })
                .collect(),
        )
    }

    async fn list(source: &MemorySource, pairs: &[(&str, &str)]) -> crate::filter::ListResult {
        let query = ListQuery::from_params(&BOOTCAMPS, &RawParams::from_pairs(pairs.iter().copied()), &config()).unwrap();
        execute(source, &query).await.unwrap()
    }

    fn names(records: &[Value]) -> Vec<String> {
        records.iter().map(|r| r["name"].as_str().unwrap_or_default().to_string()).collect()
    }

    #[tokio::test]
    async fn three_records_one_per_page() {
        let source = MemorySource::new(vec![
            bootcamp(1, 1000, true, &["Other"]),
            bootcamp(2, 2000, true, &["Other"]),
            bootcamp(3, 3000, true, &["Other"]),
        ]);

        let page1 = list(&source, &[("sort", "name"), ("limit", "1"), ("page", "1")]).await;
        assert_eq!(names(&page1.records), vec!["Bootcamp 01"]);
        assert_eq!(page1.pagination.next, Some(PageRef { page: 2, limit: 1 }));
        assert_eq!(page1.pagination.prev, None);

        let page2 = list(&source, &[("sort", "name"), ("limit", "1"), ("page", "2")]).await;
        assert_eq!(names(&page2.records), vec!["Bootcamp 02"]);
        assert_eq!(page2.pagination.next, Some(PageRef { page: 3, limit: 1 }));
        assert_eq!(page2.pagination.prev, Some(PageRef { page: 1, limit: 1 }));

        let page3 = list(&source, &[("sort", "name"), ("limit", "1"), ("page", "3")]).await;
        assert_eq!(names(&page3.records), vec!["Bootcamp 03"]);
        assert_eq!(page3.pagination.next, None);
        assert_eq!(page3.pagination.prev, Some(PageRef { page: 2, limit: 1 }));
    }

    #[tokio::test]
    async fn windows_are_exact_slices_of_the_sorted_population() {
        let source = fixture();
        let everything = list(&source, &[("sort", "averageCost"), ("limit", "100")]).await;
        assert_eq!(everything.total, 12);

        for limit in 1..=5u64 {
            for page in 1..=5u64 {
                let (p, l) = (page.to_string(), limit.to_string());
                let result = list(&source, &[("sort", "averageCost"), ("page", p.as_str()), ("limit", l.as_str())]).await;

                let start = ((page - 1) * limit) as usize;
                let end = ((page * limit) as usize).min(everything.records.len());
                let expected = if start < end { &everything.records[start..end] } else { &[][..] };

                assert!(result.records.len() as u64 <= limit);
                assert_eq!(result.records, expected, "page={} limit={}", page, limit);
                assert_eq!(result.total, 12);
                assert_eq!(result.pagination.next.is_some(), page * limit < 12);
                assert_eq!(result.pagination.prev.is_some(), page > 1);
            }
        }
    }

    #[tokio::test]
    async fn equality_returns_exactly_the_matching_records() {
        let source = fixture();
        let housed = list(&source, &[("housing", "true"), ("limit", "100")]).await;
        assert_eq!(housed.total, 6);
        assert!(housed.records.iter().all(|r| r["housing"] == json!(true)));

        let business = list(&source, &[("careers", "Business"), ("limit", "100")]).await;
        assert_eq!(business.total, 4);
    }

    #[tokio::test]
    async fn comparison_filters_partition_the_population() {
        let source = fixture();
        for threshold in ["0", "1000", "5500", "6000", "12000", "99999"] {
            let gte = list(&source, &[("averageCost[gte]", threshold), ("limit", "100")]).await;
            let lt = list(&source, &[("averageCost[lt]", threshold), ("limit", "100")]).await;
            assert_eq!(gte.total + lt.total, 12, "threshold {}", threshold);

            let mut ids: Vec<&Value> = gte.records.iter().chain(lt.records.iter()).map(|r| &r["id"]).collect();
            ids.sort_by_key(|v| v.as_str().map(str::to_string));
            ids.dedup();
            assert_eq!(ids.len(), 12);
        }
    }

    #[tokio::test]
    async fn descending_sort_reverses_ascending() {
        let source = fixture();
        let asc = list(&source, &[("sort", "averageCost"), ("limit", "100")]).await;
        let desc = list(&source, &[("sort", "-averageCost"), ("limit", "100")]).await;
        let mut reversed = names(&asc.records);
        reversed.reverse();
        assert_eq!(names(&desc.records), reversed);
    }

    #[tokio::test]
    async fn default_order_is_newest_first() {
        let source = fixture();
        let result = list(&source, &[("limit", "3")]).await;
        assert_eq!(names(&result.records), vec!["Bootcamp 12", "Bootcamp 11", "Bootcamp 10"]);
    }

    #[tokio::test]
    async fn select_restricts_returned_fields() {
        let source = fixture();
        let result = list(&source, &[("select", "name,averageCost"), ("limit", "2")]).await;
        for record in &result.records {
            let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
            assert_eq!(keys.len(), 3);
            assert!(record.get("id").is_some());
            assert!(record.get("housing").is_none());
        }
    }

    #[tokio::test]
    async fn total_ignores_the_window_but_respects_the_filter() {
        let source = fixture();
        let result = list(&source, &[("averageCost[gt]", "3000"), ("careers[in]", "Business"), ("page", "2")]).await;
        // 6000, 9000 and 12000
        assert_eq!(result.total, 3);
        assert_eq!(result.records.len(), 1);
    }
}
