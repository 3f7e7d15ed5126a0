//! Repository ports for task and comment persistence.
//!
//! Every task lookup is scoped by [`OwnerId`] so that adapters filter by
//! owner in the query itself, never after loading rows.

use crate::task::domain::{
    ColumnOrder, Comment, OwnerId, Position, PositionAssignment, Task, TaskDomainError, TaskId,
    TaskStatus, UnresolvedIdPolicy,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists the editable fields of an existing task and returns the
    /// stored result.
    ///
    /// The stored position is only overwritten when `move_to` is given, so a
    /// reorder that committed after `task` was read is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task with the same
    /// identifier and owner exists.
    async fn update(&self, task: &Task, move_to: Option<Position>) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier among the tasks owned by `owner`.
    ///
    /// Returns `None` when the task does not exist or belongs to someone else.
    async fn find_owned(&self, owner: OwnerId, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task owned by `owner`, ordered by status column, then
    /// position, then creation time.
    async fn list_owned(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the highest position in the owner's `status` column, or
    /// `None` when the column is empty.
    async fn max_position(
        &self,
        owner: OwnerId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<Position>>;

    /// Deletes a task owned by `owner` together with its comments.
    ///
    /// Returns `false` when there was nothing to delete.
    async fn delete_owned(&self, owner: OwnerId, id: TaskId) -> TaskRepositoryResult<bool>;

    /// Deletes every task and comment owned by `owner`, returning the number
    /// of tasks removed.
    async fn delete_all_owned(&self, owner: OwnerId) -> TaskRepositoryResult<u64>;

    /// Resolves the ids of `order` against the owner's tasks and writes the
    /// resulting positions in a single atomic step.
    ///
    /// Either every assignment is written or none is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::InvalidOrder`] when `policy` rejects the
    /// resolution, or another variant when storage fails.
    async fn apply_column_order(
        &self,
        owner: OwnerId,
        order: &ColumnOrder,
        policy: UnresolvedIdPolicy,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<PositionAssignment>>;
}

/// Comment persistence contract.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Appends a comment to its task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the parent task no
    /// longer exists.
    async fn append(&self, comment: &Comment) -> TaskRepositoryResult<()>;

    /// Returns the comments of `task_id` in creation order.
    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Comment>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A column order could not be applied.
    #[error(transparent)]
    InvalidOrder(TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
