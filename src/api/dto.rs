//! Wire types for the HTTP surface.
//!
//! The external contract uses camelCase field names (`dueDate`,
//! `createdAt`, `updatedAt`); storage uses snake_case. This module is the
//! single place where the two meet, for reads and writes alike.

use crate::task::domain::{
    Comment, CommentId, DueWindow, OwnerId, PositionAssignment, Task, TaskDomainError, TaskDraft,
    TaskFilter, TaskId, TaskPatch, TaskPriority, TaskStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status column.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Due date, `null` when unset.
    pub due_date: Option<DateTime<Utc>>,
    /// Tags in client order.
    pub tags: Vec<String>,
    /// Position inside the status column.
    pub position: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Owning user.
    pub user: OwnerId,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            priority: task.priority(),
            due_date: task.due_date(),
            tags: task.tags().to_vec(),
            position: task.position().value(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            user: task.owner(),
        }
    }
}

/// Task with its comment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetailResponse {
    /// Task fields.
    #[serde(flatten)]
    pub task: TaskResponse,
    /// Comments in creation order.
    pub comments: Vec<CommentResponse>,
}

/// Comment as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentResponse {
    /// Comment identifier.
    pub id: CommentId,
    /// Comment text.
    pub content: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Author.
    pub user: OwnerId,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id(),
            content: comment.content().to_owned(),
            timestamp: comment.created_at(),
            user: comment.owner(),
        }
    }
}

/// Body of `POST /tasks`.
///
/// Unknown fields, including any attempt to set the owner, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Required title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Initial status column; `todo` when absent.
    pub status: Option<TaskStatus>,
    /// Priority; `medium` when absent.
    pub priority: Option<TaskPriority>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Tags.
    pub tags: Vec<String>,
}

impl From<CreateTaskBody> for TaskDraft {
    fn from(body: CreateTaskBody) -> Self {
        let mut draft = Self::new(body.title)
            .with_description(body.description)
            .with_status(body.status.unwrap_or_default())
            .with_priority(body.priority.unwrap_or_default())
            .with_tags(body.tags);
        if let Some(due_date) = body.due_date {
            draft = draft.with_due_date(due_date);
        }
        draft
    }
}

/// Body of `PATCH /tasks/{id}`.
///
/// Absent fields are left unchanged; `"dueDate": null` clears the due date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTaskBody {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status column.
    pub status: Option<TaskStatus>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New due date, or `null` to clear it.
    #[serde(deserialize_with = "present_or_null")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskBody> for TaskPatch {
    fn from(body: UpdateTaskBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            due_date: body.due_date,
            tags: body.tags,
        }
    }
}

/// Body of `POST /tasks/reorder`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReorderBody {
    /// Status column being reordered.
    pub status: Option<String>,
    /// Task ids in their new order.
    pub order: Option<Vec<TaskId>>,
}

/// Response of a successful reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderResponse {
    /// Always `true`.
    pub success: bool,
    /// Positions written, in request order.
    pub positions: Vec<PositionResponse>,
}

/// One written position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResponse {
    /// Task identifier.
    pub id: TaskId,
    /// New position.
    pub position: u32,
}

impl From<&PositionAssignment> for PositionResponse {
    fn from(assignment: &PositionAssignment) -> Self {
        Self {
            id: assignment.task_id,
            position: assignment.position.value(),
        }
    }
}

/// Body of `POST /tasks/{id}/comments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentBody {
    /// Comment text.
    pub content: String,
}

/// Query string of `GET /tasks`. List values are comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListTasksQuery {
    /// Free-text search.
    pub search: Option<String>,
    /// Tag fragments.
    pub tags: Option<String>,
    /// Status columns.
    pub status: Option<String>,
    /// Priorities.
    pub priority: Option<String>,
    /// Due-date window: `today`, `week`, `month` or `overdue`.
    pub due: Option<String>,
}

impl TryFrom<ListTasksQuery> for TaskFilter {
    type Error = TaskDomainError;

    fn try_from(query: ListTasksQuery) -> Result<Self, Self::Error> {
        let statuses = split_list(query.status.as_deref())
            .map(|value| TaskStatus::try_from(value).map_err(TaskDomainError::from))
            .collect::<Result<Vec<_>, _>>()?;
        let priorities = split_list(query.priority.as_deref())
            .map(|value| TaskPriority::try_from(value).map_err(TaskDomainError::from))
            .collect::<Result<Vec<_>, _>>()?;
        let due = query
            .due
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(DueWindow::try_from)
            .transpose()?;

        Ok(Self {
            search: query.search.filter(|text| !text.trim().is_empty()),
            tags: split_list(query.tags.as_deref()).map(str::to_owned).collect(),
            statuses,
            priorities,
            due,
        })
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
