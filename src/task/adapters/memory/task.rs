//! In-memory repository for tasks and their comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        ColumnOrder, Comment, OwnerId, Position, PositionAssignment, Task, TaskId, TaskStatus,
        UnresolvedIdPolicy,
    },
    ports::{CommentRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task and comment repository.
///
/// All state sits behind one lock, so multi-row operations such as column
/// reorders and cascading deletes are atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    comments: HashMap<TaskId, Vec<Comment>>,
}

impl InMemoryTaskState {
    fn owned(&self, owner: OwnerId, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id).filter(|task| task.owner() == owner)
    }

    fn remove_task(&mut self, id: TaskId) {
        self.tasks.remove(&id);
        self.comments.remove(&id);
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(poisoned)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task, move_to: Option<Position>) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let existing = state
            .tasks
            .get_mut(&task.id())
            .filter(|existing| existing.owner() == task.owner())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        let position = move_to.unwrap_or_else(|| existing.position());
        *existing = task.clone();
        existing.reposition(position, task.updated_at());
        Ok(existing.clone())
    }

    async fn find_owned(&self, owner: OwnerId, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.owned(owner, id).cloned())
    }

    async fn list_owned(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.owner() == owner)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.status(), task.position(), task.created_at()));
        Ok(tasks)
    }

    async fn max_position(
        &self,
        owner: OwnerId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<Position>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.owner() == owner && task.status() == status)
            .map(Task::position)
            .max())
    }

    async fn delete_owned(&self, owner: OwnerId, id: TaskId) -> TaskRepositoryResult<bool> {
        let mut state = self.write()?;
        if state.owned(owner, id).is_none() {
            return Ok(false);
        }
        state.remove_task(id);
        Ok(true)
    }

    async fn delete_all_owned(&self, owner: OwnerId) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let ids: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.owner() == owner)
            .map(Task::id)
            .collect();
        for id in &ids {
            state.remove_task(*id);
        }
        state
            .comments
            .values_mut()
            .for_each(|comments| comments.retain(|comment| comment.owner() != owner));
        Ok(u64::try_from(ids.len()).unwrap_or(u64::MAX))
    }

    async fn apply_column_order(
        &self,
        owner: OwnerId,
        order: &ColumnOrder,
        policy: UnresolvedIdPolicy,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<PositionAssignment>> {
        let mut state = self.write()?;
        let resolved: HashSet<TaskId> = order
            .ids()
            .iter()
            .copied()
            .filter(|id| state.owned(owner, *id).is_some())
            .collect();

        let assignments = order
            .assign_positions(&resolved, policy)
            .map_err(TaskRepositoryError::InvalidOrder)?;

        for assignment in &assignments {
            if let Some(task) = state.tasks.get_mut(&assignment.task_id) {
                task.reposition(assignment.position, at);
            }
        }
        Ok(assignments)
    }
}

#[async_trait]
impl CommentRepository for InMemoryTaskRepository {
    async fn append(&self, comment: &Comment) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&comment.task_id()) {
            return Err(TaskRepositoryError::NotFound(comment.task_id()));
        }
        state
            .comments
            .entry(comment.task_id())
            .or_default()
            .push(comment.clone());
        Ok(())
    }

    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Comment>> {
        let state = self.read()?;
        let mut comments = state.comments.get(&task_id).cloned().unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps.
        comments.sort_by_key(Comment::created_at);
        Ok(comments)
    }
}
