//! Behavioral switches for the task services.

use crate::task::domain::{StatusChangePolicy, UnresolvedIdPolicy};
use serde::{Deserialize, Serialize};

/// Policies shared by the task services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Position handling when a task moves to another status column.
    pub status_change: StatusChangePolicy,
    /// Handling of reorder ids that do not resolve to the caller's tasks.
    pub unresolved_ids: UnresolvedIdPolicy,
}

impl ServiceConfig {
    /// Sets the status-change policy.
    #[must_use]
    pub const fn with_status_change(mut self, policy: StatusChangePolicy) -> Self {
        self.status_change = policy;
        self
    }

    /// Sets the unresolved-id policy.
    #[must_use]
    pub const fn with_unresolved_ids(mut self, policy: UnresolvedIdPolicy) -> Self {
        self.unresolved_ids = policy;
        self
    }
}
