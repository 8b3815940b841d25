use thiserror::Error;

use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

use super::repos::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// True when the underlying store is unreachable, as opposed to a
    /// request-shaped failure.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::Repo(RepoError::Persistence(_) | RepoError::Timeout)
                | AppError::Infra(InfraError::Database { .. })
        )
    }
}
