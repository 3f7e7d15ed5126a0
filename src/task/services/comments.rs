//! Append-only comment log per task.

use super::{TaskServiceError, TaskServiceResult};
use crate::identity::AuthenticatedCaller;
use crate::task::{
    domain::{Comment, TaskId},
    ports::{CommentRepository, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Comment service.
///
/// Access goes through the parent task, so comments on tasks the caller
/// does not own are reported as a missing task.
#[derive(Clone)]
pub struct CommentService<R, C>
where
    R: TaskRepository + CommentRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> CommentService<R, C>
where
    R: TaskRepository + CommentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Lists the comments of one of the caller's tasks in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn list(
        &self,
        caller: AuthenticatedCaller,
        task_id: TaskId,
    ) -> TaskServiceResult<Vec<Comment>> {
        self.ensure_owned(caller, task_id).await?;
        Ok(self.repository.list_for_task(task_id).await?)
    }

    /// Appends a comment to one of the caller's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the caller owns no such
    /// task and [`TaskServiceError::Domain`] when the content is blank.
    pub async fn add(
        &self,
        caller: AuthenticatedCaller,
        task_id: TaskId,
        content: &str,
    ) -> TaskServiceResult<Comment> {
        self.ensure_owned(caller, task_id).await?;
        let comment = Comment::new(task_id, caller.owner(), content, &*self.clock)?;
        self.repository.append(&comment).await?;
        info!(owner = %caller, task_id = %task_id, comment_id = %comment.id(), "added comment");
        Ok(comment)
    }

    async fn ensure_owned(
        &self,
        caller: AuthenticatedCaller,
        task_id: TaskId,
    ) -> TaskServiceResult<()> {
        self.repository
            .find_owned(caller.owner(), task_id)
            .await?
            .map(|_| ())
            .ok_or(TaskServiceError::NotFound(task_id))
    }
}
