//! Service-level errors shared by the task services.

use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use thiserror::Error;

/// Errors returned by task, reorder and comment services.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Input validation failed; nothing was written.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The task does not exist or is not owned by the caller.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Storage failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            TaskRepositoryError::InvalidOrder(domain) => Self::Domain(domain),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
