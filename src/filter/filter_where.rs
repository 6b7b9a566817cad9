use super::error::FilterError;
use super::params::{ParamValue, RawParams};
use super::types::{Collection, FieldDef, FieldKind, FilterCondition, FilterOp, FilterValue};

pub struct FilterWhere {
    param_values: Vec<FilterValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self { param_values: vec![], param_index: starting_param_index }
    }

    /// Turn every non-reserved parameter into a condition, rejecting any
    /// field or operator the collection does not allow.
    pub fn parse(collection: &'static Collection, params: &RawParams) -> Result<Vec<FilterCondition>, FilterError> {
        let mut conditions = Vec::new();
        for (key, value) in params.filters() {
            let (field_name, op) = Self::split_key(key)?;
            let field = collection.field(field_name)?;
            if !field.filterable {
                return Err(FilterError::NotFilterable(field.name.to_string()));
            }
            conditions.push(Self::parse_condition(field, op, value)?);
        }
        Ok(conditions)
    }

    /// `averageCost[lte]` -> ("averageCost", Lte); `housing` -> ("housing", Eq)
    fn split_key(key: &str) -> Result<(&str, FilterOp), FilterError> {
        match key.find('[') {
            None => {
                if key.contains(']') {
                    return Err(FilterError::MalformedKey(key.to_string()));
                }
                Ok((key, FilterOp::Eq))
            }
            Some(open) => {
                let suffix = key[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| FilterError::MalformedKey(key.to_string()))?;
                if open == 0 || suffix.contains('[') || suffix.contains(']') {
                    return Err(FilterError::MalformedKey(key.to_string()));
                }
                Ok((&key[..open], FilterOp::from_suffix(suffix)?))
            }
        }
    }

    fn parse_condition(field: &'static FieldDef, op: FilterOp, value: &ParamValue) -> Result<FilterCondition, FilterError> {
        if op.is_range() && matches!(field.kind, FieldKind::Boolean | FieldKind::TextArray) {
            return Err(FilterError::InvalidOperatorData(format!(
                "'{}' does not support range comparison",
                field.name
            )));
        }

        match (op, value) {
            (FilterOp::In, _) => {
                let values = value
                    .values()
                    .into_iter()
                    .flat_map(|v| v.split(','))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| FilterValue::parse(field, v))
                    .collect::<Result<Vec<_>, _>>()?;
                if values.is_empty() {
                    return Err(FilterError::InvalidOperatorData(format!("'{}[in]' requires at least one value", field.name)));
                }
                Ok(FilterCondition { field, op, values })
            }
            // Repeated plain keys mean "any of these"
            (FilterOp::Eq, ParamValue::Many(vs)) => {
                let values = vs.iter().map(|v| FilterValue::parse(field, v)).collect::<Result<Vec<_>, _>>()?;
                Ok(FilterCondition { field, op: FilterOp::In, values })
            }
            (_, ParamValue::Many(_)) => Err(FilterError::InvalidOperatorData(format!(
                "'{}' expects a single value for this operator",
                field.name
            ))),
            (_, ParamValue::One(v)) => Ok(FilterCondition { field, op, values: vec![FilterValue::parse(field, v)?] }),
        }
    }

    /// Render conditions as a parameterised predicate. Returns an empty
    /// string when there is nothing to filter on.
    pub fn generate(conditions: &[FilterCondition], starting_param_index: usize) -> (String, Vec<FilterValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = conditions
            .iter()
            .map(|c| filter_where.build_sql_condition(c))
            .collect::<Vec<_>>()
            .join(" AND ");
        (sql, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &FilterCondition) -> String {
        let quoted_column = format!("\"{}\"", condition.field.column);
        let is_array = condition.field.kind == FieldKind::TextArray;

        match condition.op {
            FilterOp::Eq if is_array => {
                let p = self.param(condition.values[0].clone());
                format!("{} = ANY({})", p, quoted_column)
            }
            FilterOp::In if is_array => {
                let params: Vec<String> = condition.values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} && ARRAY[{}]::text[]", quoted_column, params.join(", "))
            }
            FilterOp::In => {
                let params: Vec<String> = condition.values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", quoted_column, params.join(", "))
            }
            op => {
                let p = self.param(condition.values[0].clone());
                format!("{} {} {}", quoted_column, op.to_sql(), p)
            }
        }
    }

    fn param(&mut self, value: FilterValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
