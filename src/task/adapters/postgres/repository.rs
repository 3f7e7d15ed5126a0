//! `PostgreSQL` repository implementation for task and comment storage.

use super::{
    models::{CommentRow, NewCommentRow, NewTaskRow, TaskChangeset, TaskRow},
    schema::{task_comments, tasks},
};
use crate::task::{
    domain::{
        ColumnOrder, Comment, CommentId, OwnerId, PersistedTaskData, Position,
        PositionAssignment, Task, TaskId, TaskPriority, TaskStatus, UnresolvedIdPolicy,
    },
    ports::{CommentRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashSet;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Board-order listing. Status columns sort in board order rather than
/// alphabetically.
const LIST_OWNED_SQL: &str = concat!(
    "SELECT id, owner_id, title, description, status, priority, due_date, tags, ",
    "\"position\", created_at, updated_at FROM tasks ",
    "WHERE owner_id = $1 ",
    "ORDER BY CASE status WHEN 'todo' THEN 0 WHEN 'progress' THEN 1 ",
    "WHEN 'done' THEN 2 ELSE 3 END, \"position\", created_at",
);

/// `PostgreSQL`-backed task and comment repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task, move_to: Option<Position>) -> TaskRepositoryResult<Task> {
        let task_id = task.id();
        let owner = task.owner();
        let changeset = to_changeset(task)?;
        let new_position = move_to.map(position_to_column).transpose()?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let target = || {
                    tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .filter(tasks::owner_id.eq(owner.into_inner()))
                };
                let mut row = diesel::update(target())
                    .set(&changeset)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(task_id))?;
                if let Some(position) = new_position {
                    row = diesel::update(target())
                        .set(tasks::position.eq(position))
                        .returning(TaskRow::as_returning())
                        .get_result::<TaskRow>(tx)?;
                }
                row_to_task(row)
            })
        })
        .await
    }

    async fn find_owned(&self, owner: OwnerId, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_owned(&self, owner: OwnerId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(LIST_OWNED_SQL)
                .bind::<diesel::sql_types::Uuid, _>(owner.into_inner())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn max_position(
        &self,
        owner: OwnerId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<Position>> {
        self.run_blocking(move |connection| {
            let max = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::status.eq(status.as_str()))
                .select(diesel::dsl::max(tasks::position))
                .first::<Option<i32>>(connection)?;
            max.map(position_from_column).transpose()
        })
        .await
    }

    async fn delete_owned(&self, owner: OwnerId, id: TaskId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let deleted = diesel::delete(
                    tasks::table
                        .filter(tasks::id.eq(id.into_inner()))
                        .filter(tasks::owner_id.eq(owner.into_inner())),
                )
                .execute(tx)?;
                if deleted > 0 {
                    diesel::delete(
                        task_comments::table.filter(task_comments::task_id.eq(id.into_inner())),
                    )
                    .execute(tx)?;
                }
                Ok(deleted > 0)
            })
        })
        .await
    }

    async fn delete_all_owned(&self, owner: OwnerId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::delete(
                    task_comments::table.filter(task_comments::owner_id.eq(owner.into_inner())),
                )
                .execute(tx)?;
                let deleted = diesel::delete(
                    tasks::table.filter(tasks::owner_id.eq(owner.into_inner())),
                )
                .execute(tx)?;
                u64::try_from(deleted).map_err(TaskRepositoryError::persistence)
            })
        })
        .await
    }

    async fn apply_column_order(
        &self,
        owner: OwnerId,
        order: &ColumnOrder,
        policy: UnresolvedIdPolicy,
        at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<PositionAssignment>> {
        let column_order = order.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let requested: Vec<uuid::Uuid> = column_order
                    .ids()
                    .iter()
                    .map(|id| id.into_inner())
                    .collect();

                // Row locks serialize reorders touching the same tasks; locking
                // in id order keeps overlapping reorders from deadlocking.
                let resolved: HashSet<TaskId> = tasks::table
                    .filter(tasks::owner_id.eq(owner.into_inner()))
                    .filter(tasks::id.eq_any(requested))
                    .select(tasks::id)
                    .order(tasks::id)
                    .for_update()
                    .load::<uuid::Uuid>(tx)?
                    .into_iter()
                    .map(TaskId::from_uuid)
                    .collect();

                let assignments = column_order
                    .assign_positions(&resolved, policy)
                    .map_err(TaskRepositoryError::InvalidOrder)?;

                for assignment in &assignments {
                    diesel::update(
                        tasks::table
                            .filter(tasks::id.eq(assignment.task_id.into_inner()))
                            .filter(tasks::owner_id.eq(owner.into_inner())),
                    )
                    .set((
                        tasks::position.eq(position_to_column(assignment.position)?),
                        tasks::updated_at.eq(at),
                    ))
                    .execute(tx)?;
                }
                Ok(assignments)
            })
        })
        .await
    }
}

#[async_trait]
impl CommentRepository for PostgresTaskRepository {
    async fn append(&self, comment: &Comment) -> TaskRepositoryResult<()> {
        let task_id = comment.task_id();
        let new_row = NewCommentRow {
            id: comment.id().into_inner(),
            task_id: task_id.into_inner(),
            owner_id: comment.owner().into_inner(),
            content: comment.content().to_owned(),
            created_at: comment.created_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(task_comments::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task_id.into_inner()))
                .order((task_comments::created_at.asc(), task_comments::seq.asc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)?;
            Ok(rows.into_iter().map(row_to_comment).collect())
        })
        .await
    }
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        tags: serde_json::to_value(task.tags()).map_err(TaskRepositoryError::persistence)?,
        position: position_to_column(task.position())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    Ok(TaskChangeset {
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        tags: serde_json::to_value(task.tags()).map_err(TaskRepositoryError::persistence)?,
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title,
        description,
        status: persisted_status,
        priority: persisted_priority,
        due_date,
        tags: persisted_tags,
        position: persisted_position,
        created_at,
        updated_at,
    } = row;

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let tags = serde_json::from_value::<Vec<String>>(persisted_tags)
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: OwnerId::from_uuid(owner_id),
        title,
        description,
        status,
        priority,
        due_date,
        tags,
        position: position_from_column(persisted_position)?,
        created_at,
        updated_at,
    }))
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment::from_persisted(
        CommentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        OwnerId::from_uuid(row.owner_id),
        row.content,
        row.created_at,
    )
}

fn position_to_column(position: Position) -> TaskRepositoryResult<i32> {
    i32::try_from(position.value()).map_err(TaskRepositoryError::persistence)
}

fn position_from_column(value: i32) -> TaskRepositoryResult<Position> {
    u32::try_from(value)
        .map(Position::new)
        .map_err(TaskRepositoryError::persistence)
}
