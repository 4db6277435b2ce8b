use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A required event column was absent from the supplied table or row.
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("funnel must contain at least one stage")]
    EmptyFunnel,

    /// Raised by the `reject` acquisition policy.
    #[error("user {user_id} was acquired in more than one period: {}", periods.join(", "))]
    ConflictingAcquisition {
        user_id: String,
        periods: Vec<String>,
    },
}

impl CoreError {
    /// Column name for field-level errors, surfaced to API clients.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::MissingField(column) => Some(column.as_str()),
            _ => None,
        }
    }
}
