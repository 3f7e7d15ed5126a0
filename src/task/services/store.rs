//! Owner-scoped task CRUD and column position assignment.

use super::{TaskServiceError, TaskServiceResult};
use crate::config::ServiceConfig;
use crate::identity::AuthenticatedCaller;
use crate::task::{
    domain::{
        Position, StatusChangePolicy, Task, TaskDraft, TaskFilter, TaskId, TaskPatch, TaskStatus,
    },
    ports::TaskRepository,
};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Task store service.
///
/// Every operation is scoped to the caller; other owners' tasks behave as if
/// they did not exist.
#[derive(Clone)]
pub struct TaskStoreService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    config: ServiceConfig,
}

impl<R, C> TaskStoreService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task store service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, config: ServiceConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Lists the caller's tasks in board order, narrowed by `filter`.
    ///
    /// Returns an empty vector when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn list(
        &self,
        caller: AuthenticatedCaller,
        filter: &TaskFilter,
    ) -> TaskServiceResult<Vec<Task>> {
        let mut tasks = self.repository.list_owned(caller.owner()).await?;
        if !filter.is_empty() {
            let now = self.clock.utc();
            tasks.retain(|task| filter.matches(task, now));
        }
        debug!(owner = %caller, count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// Returns one of the caller's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the caller owns no task
    /// with this id.
    pub async fn get(&self, caller: AuthenticatedCaller, id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_owned(caller.owner(), id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Creates a task at the end of its status column.
    ///
    /// The owner is always the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when validation fails or
    /// [`TaskServiceError::Repository`] when storage fails.
    pub async fn create(
        &self,
        caller: AuthenticatedCaller,
        draft: TaskDraft,
    ) -> TaskServiceResult<Task> {
        let position = self.next_position(caller, draft.status()).await?;
        let task = Task::create(caller.owner(), draft, position, &*self.clock)?;
        self.repository.store(&task).await?;
        info!(
            owner = %caller,
            task_id = %task.id(),
            status = %task.status(),
            position = %task.position(),
            "created task"
        );
        Ok(task)
    }

    /// Applies a partial update to one of the caller's tasks.
    ///
    /// When the status changes, the position follows the configured
    /// [`StatusChangePolicy`]. Otherwise the stored position is left alone,
    /// including one written by a reorder after the task was read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the caller owns no such
    /// task, [`TaskServiceError::Domain`] when validation fails, or
    /// [`TaskServiceError::Repository`] when storage fails.
    pub async fn update(
        &self,
        caller: AuthenticatedCaller,
        id: TaskId,
        patch: TaskPatch,
    ) -> TaskServiceResult<Task> {
        let mut task = self.get(caller, id).await?;

        let target = patch.status_change(task.status());
        let column_position = match (target, self.config.status_change) {
            (Some(status), StatusChangePolicy::AppendToColumn) => {
                Some(self.next_position(caller, status).await?)
            }
            _ => None,
        };

        task.apply_patch(patch, column_position, &*self.clock)?;
        let stored = self.repository.update(&task, column_position).await?;
        info!(
            owner = %caller,
            task_id = %id,
            status = %stored.status(),
            position = %stored.position(),
            "updated task"
        );
        Ok(stored)
    }

    /// Deletes one of the caller's tasks and its comments.
    ///
    /// Sibling positions are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn delete(&self, caller: AuthenticatedCaller, id: TaskId) -> TaskServiceResult<()> {
        if !self.repository.delete_owned(caller.owner(), id).await? {
            return Err(TaskServiceError::NotFound(id));
        }
        info!(owner = %caller, task_id = %id, "deleted task");
        Ok(())
    }

    /// Deletes all of the caller's tasks and comments.
    ///
    /// Returns the number of tasks removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when storage fails.
    pub async fn purge(&self, caller: AuthenticatedCaller) -> TaskServiceResult<u64> {
        let removed = self.repository.delete_all_owned(caller.owner()).await?;
        info!(owner = %caller, removed, "purged owner data");
        Ok(removed)
    }

    /// Returns every tag used by the caller, sorted and de-duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn tags(&self, caller: AuthenticatedCaller) -> TaskServiceResult<Vec<String>> {
        let tasks = self.repository.list_owned(caller.owner()).await?;
        let tags: BTreeSet<String> = tasks
            .iter()
            .flat_map(|task| task.tags().iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }

    async fn next_position(
        &self,
        caller: AuthenticatedCaller,
        status: TaskStatus,
    ) -> TaskServiceResult<Position> {
        let max = self
            .repository
            .max_position(caller.owner(), status)
            .await?;
        Ok(Position::after(max))
    }
}
