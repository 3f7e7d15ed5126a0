//! Board filtering: free-text search, tags, columns, priorities and due
//! dates.

use super::{Task, TaskDomainError, TaskPriority, TaskStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Relative due-date window, evaluated at day granularity in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueWindow {
    /// Due today.
    Today,
    /// Due between today and seven days from now, inclusive.
    Week,
    /// Due between today and thirty days from now, inclusive.
    Month,
    /// Due before today.
    Overdue,
}

impl DueWindow {
    /// Returns whether `due` falls inside the window relative to `now`.
    #[must_use]
    pub fn contains(self, due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let day = due.date_naive();
        match self {
            Self::Today => day == today,
            Self::Week => within_days(day, today, 7),
            Self::Month => within_days(day, today, 30),
            Self::Overdue => day < today,
        }
    }
}

fn within_days(day: NaiveDate, today: NaiveDate, days: u64) -> bool {
    let horizon = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    day >= today && day <= horizon
}

impl TryFrom<&str> for DueWindow {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "overdue" => Ok(Self::Overdue),
            _ => Err(TaskDomainError::InvalidDueWindow(value.to_owned())),
        }
    }
}

/// Criteria narrowing a task listing. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive text matched against title, description and tags.
    pub search: Option<String>,
    /// Tag fragments; a task matches when any of its tags contains any of
    /// them.
    pub tags: Vec<String>,
    /// Accepted status columns.
    pub statuses: Vec<TaskStatus>,
    /// Accepted priorities.
    pub priorities: Vec<TaskPriority>,
    /// Due-date window. Tasks without a due date are not excluded.
    pub due: Option<DueWindow>,
}

impl TaskFilter {
    /// Returns whether the filter has no criteria.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(str::is_empty)
            && self.tags.is_empty()
            && self.statuses.is_empty()
            && self.priorities.is_empty()
            && self.due.is_none()
    }

    /// Returns whether `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        self.matches_search(task)
            && self.matches_tags(task)
            && (self.statuses.is_empty() || self.statuses.contains(&task.status()))
            && (self.priorities.is_empty() || self.priorities.contains(&task.priority()))
            && self.matches_due(task, now)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let Some(search) = self.search.as_deref().filter(|text| !text.is_empty()) else {
            return true;
        };
        let needle = search.to_lowercase();
        task.title().to_lowercase().contains(&needle)
            || task.description().to_lowercase().contains(&needle)
            || task
                .tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }

    fn matches_tags(&self, task: &Task) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        self.tags.iter().any(|wanted| {
            let needle = wanted.to_lowercase();
            task.tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
        })
    }

    fn matches_due(&self, task: &Task, now: DateTime<Utc>) -> bool {
        match (self.due, task.due_date()) {
            (Some(window), Some(due)) => window.contains(due, now),
            _ => true,
        }
    }
}
