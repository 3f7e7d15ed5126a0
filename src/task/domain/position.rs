//! Column ordering keys and reorder planning.
//!
//! A [`Position`] is only meaningful inside one (owner, status) partition.
//! Positions are advisory: storage does not enforce uniqueness or
//! contiguity, and gaps left by deletions are expected. A [`ColumnOrder`]
//! rebuilds a partition's ordering wholesale.

use super::{TaskDomainError, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Ordering key of a task inside its status column.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(u32);

impl Position {
    /// Position given to the first task of an empty column.
    pub const FIRST: Self = Self(1);

    /// Wraps a raw position value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw position value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the position directly after `self`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the position for a task appended to a column whose current
    /// maximum is `max`. An empty column counts as maximum zero.
    #[must_use]
    pub fn after(max: Option<Self>) -> Self {
        max.unwrap_or_default().next()
    }

    /// Returns the 1-based position for the zero-based `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let value = u32::try_from(index).unwrap_or(u32::MAX);
        Self(value.saturating_add(1))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a reorder treats ids that are unknown or owned by someone else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedIdPolicy {
    /// Drop unresolved ids. They do not consume a position slot, so the
    /// resolved tasks are numbered contiguously from 1.
    #[default]
    Skip,
    /// Fail the whole reorder when any id is unresolved.
    Reject,
}

/// What happens to a task's position when its status changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChangePolicy {
    /// Keep the old position; the client is expected to reorder the target
    /// column explicitly.
    KeepPosition,
    /// Move the task to the end of the target column.
    #[default]
    AppendToColumn,
}

/// New position for one task produced by a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
    /// Task being moved.
    pub task_id: TaskId,
    /// Position written for the task.
    pub position: Position,
}

/// Validated client ordering for one status column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    status: TaskStatus,
    order: Vec<TaskId>,
}

impl ColumnOrder {
    /// Creates a column order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyOrder`] when `order` is empty and
    /// [`TaskDomainError::DuplicateOrderEntry`] when an id repeats.
    pub fn new(status: TaskStatus, order: Vec<TaskId>) -> Result<Self, TaskDomainError> {
        if order.is_empty() {
            return Err(TaskDomainError::EmptyOrder);
        }
        let mut seen = HashSet::with_capacity(order.len());
        if let Some(duplicate) = order.iter().find(|id| !seen.insert(**id)) {
            return Err(TaskDomainError::DuplicateOrderEntry(*duplicate));
        }
        Ok(Self { status, order })
    }

    /// Returns the status column being reordered.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the requested task order.
    #[must_use]
    pub fn ids(&self) -> &[TaskId] {
        &self.order
    }

    /// Computes the positions to write given the ids that resolved to tasks
    /// owned by the caller.
    ///
    /// Assignments follow the requested order. Unresolved ids never consume
    /// a slot.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnresolvedTasks`] under
    /// [`UnresolvedIdPolicy::Reject`] when any id did not resolve.
    pub fn assign_positions(
        &self,
        resolved: &HashSet<TaskId>,
        policy: UnresolvedIdPolicy,
    ) -> Result<Vec<PositionAssignment>, TaskDomainError> {
        let (found, missing): (Vec<TaskId>, Vec<TaskId>) =
            self.order.iter().copied().partition(|id| resolved.contains(id));

        if policy == UnresolvedIdPolicy::Reject && !missing.is_empty() {
            return Err(TaskDomainError::UnresolvedTasks(missing));
        }

        Ok(found
            .into_iter()
            .enumerate()
            .map(|(index, task_id)| PositionAssignment {
                task_id,
                position: Position::from_index(index),
            })
            .collect())
    }
}
