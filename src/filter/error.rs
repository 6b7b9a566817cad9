use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown field '{field}' for {collection}")]
    UnknownField { collection: &'static str, field: String },

    #[error("Field '{0}' cannot be used to filter")]
    NotFilterable(String),

    #[error("Field '{0}' cannot be used to sort")]
    NotSortable(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("Malformed parameter key: {0}")]
    MalformedKey(String),
}
