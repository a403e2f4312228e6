/// Errors raised while executing a query against a collection.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    /// A filter value could not be cast to the stored field's type.
    #[error("invalid {field}: {value}")]
    Cast { field: String, value: String },
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl CollectionError {
    pub(crate) fn cast(field: &str, value: impl ToString) -> Self {
        CollectionError::Cast {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
