//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or validating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("task title is {actual} characters long, maximum is {max}")]
    TitleTooLong {
        /// Maximum accepted length in characters.
        max: usize,
        /// Length of the rejected title.
        actual: usize,
    },

    /// A tag is empty after trimming.
    #[error("tags must not be empty")]
    EmptyTag,

    /// Comment content is empty after trimming.
    #[error("comment content must not be empty")]
    EmptyComment,

    /// The status value is not recognized.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),

    /// The priority value is not recognized.
    #[error(transparent)]
    InvalidPriority(#[from] ParseTaskPriorityError),

    /// The due-date window value is not recognized.
    #[error("unknown due-date window: {0}")]
    InvalidDueWindow(String),

    /// A reorder request did not name a status column.
    #[error("status is required")]
    MissingStatus,

    /// A reorder request carried no task identifiers.
    #[error("order must contain at least one task id")]
    EmptyOrder,

    /// A reorder request named the same task more than once.
    #[error("task {0} appears more than once in order")]
    DuplicateOrderEntry(TaskId),

    /// A strict reorder named tasks the caller does not own or that do not
    /// exist.
    #[error("unresolved task ids in order: {}", format_ids(.0))]
    UnresolvedTasks(Vec<TaskId>),
}

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
