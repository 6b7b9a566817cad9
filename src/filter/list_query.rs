use crate::config::ListConfig;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::page::PageWindow;
use super::params::RawParams;
use super::types::{Collection, FieldDef, FilterCondition, FilterValue, SortDirection, SortKey, SqlResult};

/// A validated, bounded listing over one collection: which fields to return,
/// which records match, in what order, and which page of them.
///
/// Built fresh for every request from the caller's query parameters; holds no
/// state beyond what those parameters describe.
#[derive(Debug, Clone)]
pub struct ListQuery {
    collection: &'static Collection,
    select: Vec<&'static FieldDef>,
    conditions: Vec<FilterCondition>,
    sort: Vec<SortKey>,
    window: PageWindow,
}

impl ListQuery {
    pub fn from_params(
        collection: &'static Collection,
        params: &RawParams,
        config: &ListConfig,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            collection,
            select: Self::build_select(collection, params)?,
            conditions: Self::build_filter(collection, params)?,
            sort: Self::build_sort(collection, params)?,
            window: Self::build_page(params, config),
        })
    }

    pub fn build_filter(collection: &'static Collection, params: &RawParams) -> Result<Vec<FilterCondition>, FilterError> {
        FilterWhere::parse(collection, params)
    }

    pub fn build_sort(collection: &'static Collection, params: &RawParams) -> Result<Vec<SortKey>, FilterError> {
        let raw_sort = params.single("sort").unwrap_or(collection.default_sort);
        let keys = FilterOrder::validate_and_parse(collection, raw_sort)?;
        if keys.is_empty() {
            return FilterOrder::validate_and_parse(collection, collection.default_sort);
        }
        Ok(keys)
    }

    pub fn build_page(params: &RawParams, config: &ListConfig) -> PageWindow {
        PageWindow::from_params(params, config)
    }

    /// `select=name,description` -> those fields. Empty means every field.
    pub fn build_select(collection: &'static Collection, params: &RawParams) -> Result<Vec<&'static FieldDef>, FilterError> {
        let Some(raw_select) = params.single("select") else {
            return Ok(vec![]);
        };
        let mut fields: Vec<&'static FieldDef> = Vec::new();
        for name in raw_select.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let field = collection.field(name)?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Ok(fields)
    }

    pub fn collection(&self) -> &'static Collection {
        self.collection
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Fields each returned record carries. The id is always included.
    pub fn projection(&self) -> Vec<&'static FieldDef> {
        if self.select.is_empty() {
            return self.collection.fields.iter().collect();
        }
        let mut fields: Vec<&'static FieldDef> = self.collection.id_field().into_iter().collect();
        for &field in &self.select {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }

    /// Requested order with the id appended as a final tie-break, so page
    /// windows never overlap when sort values repeat.
    pub fn effective_sort(&self) -> Vec<SortKey> {
        let mut keys = self.sort.clone();
        if let Some(id) = self.collection.id_field() {
            if !keys.iter().any(|k| k.field == id) {
                keys.push(SortKey { field: id, direction: SortDirection::Asc });
            }
        }
        keys
    }

    /// One JSON object per row, shaped by the projection, windowed by
    /// LIMIT/OFFSET.
    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, mut params) = FilterWhere::generate(&self.conditions, 0);
        let order_clause = FilterOrder::generate(&self.effective_sort());

        params.push(FilterValue::Integer(to_i64(self.window.limit)));
        let limit_param = params.len();
        params.push(FilterValue::Integer(to_i64(self.window.start_index())));
        let offset_param = params.len();

        let query = [
            format!("SELECT {} AS row", json_object_sql(&self.projection())),
            format!("FROM \"{}\"", self.collection.table),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            format!("LIMIT ${} OFFSET ${}", limit_param, offset_param),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    /// Size of the filtered population, ignoring the page window
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.collection.table)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.collection.table, where_clause)
        };
        SqlResult { query, params }
    }
}

/// `json_build_object('name', "name", 'averageCost', "average_cost", ...)`
pub fn json_object_sql(fields: &[&'static FieldDef]) -> String {
    let pairs: Vec<String> = fields
        .iter()
        .map(|f| format!("'{}', \"{}\"", f.name, f.column))
        .collect();
    format!("json_build_object({})", pairs.join(", "))
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
