#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

impl DashboardError {
    pub fn precondition(message: impl Into<String>) -> Self {
        DashboardError::PreconditionViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
