use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::error::FilterError;

/// Comparison operators accepted in `field[op]=value` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    pub fn from_suffix(suffix: &str) -> Result<Self, FilterError> {
        Ok(match suffix {
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            "in" => FilterOp::In,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte)
    }
}

/// Storage type of a field, used to parse query-string operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Uuid,
    TextArray,
}

/// One allow-listed field of a collection: the public (JSON) name and the
/// column it maps to.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub filterable: bool,
    pub sortable: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind, filterable: true, sortable: true }
    }

    pub const fn unsortable(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind, filterable: true, sortable: false }
    }

    /// Returned and selectable, but never usable in a filter or sort
    pub const fn output_only(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind, filterable: false, sortable: false }
    }
}

/// A queryable collection: its table and the closed set of fields a caller
/// may select, filter or sort on.
#[derive(Debug)]
pub struct Collection {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    pub default_sort: &'static str,
}

impl Collection {
    pub fn field(&'static self, name: &str) -> Result<&'static FieldDef, FilterError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FilterError::UnknownField { collection: self.name, field: name.to_string() })
    }

    pub fn id_field(&'static self) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == "id")
    }
}

/// A typed operand, bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl FilterValue {
    pub fn parse(field: &FieldDef, raw: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidValue { field: field.name.to_string(), value: raw.to_string() };
        let trimmed = raw.trim();

        Ok(match field.kind {
            FieldKind::Text | FieldKind::TextArray => FilterValue::Text(raw.to_string()),
            FieldKind::Integer => FilterValue::Integer(trimmed.parse().map_err(|_| invalid())?),
            FieldKind::Float => FilterValue::Float(trimmed.parse().map_err(|_| invalid())?),
            FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => FilterValue::Boolean(true),
                "false" | "0" => FilterValue::Boolean(false),
                _ => return Err(invalid()),
            },
            FieldKind::Timestamp => {
                if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
                    FilterValue::Timestamp(ts.with_timezone(&Utc))
                } else {
                    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid())?;
                    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
                    FilterValue::Timestamp(midnight.and_utc())
                }
            }
            FieldKind::Uuid => FilterValue::Uuid(Uuid::parse_str(trimmed).map_err(|_| invalid())?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: &'static FieldDef,
    pub op: FilterOp,
    /// Exactly one value unless `op` is `In`
    pub values: Vec<FilterValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: &'static FieldDef,
    pub direction: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}
