use super::error::FilterError;
use super::types::{Collection, SortDirection, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `name,-createdAt` style sort strings. A leading `-` sorts that field
    /// descending; earlier fields take precedence.
    pub fn validate_and_parse(collection: &'static Collection, raw: &str) -> Result<Vec<SortKey>, FilterError> {
        let mut out: Vec<SortKey> = Vec::new();
        for part in raw.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, direction) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (trimmed.strip_prefix('+').unwrap_or(trimmed), SortDirection::Asc),
            };
            let field = collection.field(name)?;
            if !field.sortable {
                return Err(FilterError::NotSortable(field.name.to_string()));
            }
            if out.iter().any(|k| k.field == field) {
                continue;
            }
            out.push(SortKey { field, direction });
        }
        Ok(out)
    }

    pub fn generate(keys: &[SortKey]) -> String {
        if keys.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = keys
            .iter()
            .map(|k| format!("\"{}\" {}", k.field.column, k.direction.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
