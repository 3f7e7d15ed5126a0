//! Column reordering.

use super::TaskServiceResult;
use crate::identity::AuthenticatedCaller;
use crate::task::{
    domain::{
        ColumnOrder, PositionAssignment, TaskDomainError, TaskId, TaskStatus, UnresolvedIdPolicy,
    },
    ports::TaskRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Request to rewrite the order of one status column.
///
/// Fields arrive unvalidated from the client; [`ReorderService::reorder`]
/// rejects a missing or unknown status and an empty order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderRequest {
    status: Option<String>,
    order: Vec<TaskId>,
}

impl ReorderRequest {
    /// Creates a request for the given task order.
    #[must_use]
    pub fn new(order: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            status: None,
            order: order.into_iter().collect(),
        }
    }

    /// Sets the status column being reordered.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    fn into_column_order(self) -> Result<ColumnOrder, TaskDomainError> {
        let raw_status = self
            .status
            .filter(|status| !status.trim().is_empty())
            .ok_or(TaskDomainError::MissingStatus)?;
        let status = TaskStatus::try_from(raw_status.as_str())?;
        ColumnOrder::new(status, self.order)
    }
}

/// Reorder service.
///
/// Rewrites positions for exactly the tasks named in a request, scoped to
/// the caller, in one atomic repository call.
#[derive(Clone)]
pub struct ReorderService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: UnresolvedIdPolicy,
}

impl<R, C> ReorderService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new reorder service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, policy: UnresolvedIdPolicy) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    /// Assigns positions `1..=n` to the caller's tasks in request order.
    ///
    /// Returns the assignments that were written.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::Domain`] when the request is
    /// invalid or rejected by the unresolved-id policy, and
    /// [`super::TaskServiceError::Repository`] when storage fails. In every
    /// error case no position has changed.
    pub async fn reorder(
        &self,
        caller: AuthenticatedCaller,
        request: ReorderRequest,
    ) -> TaskServiceResult<Vec<PositionAssignment>> {
        let column_order = request.into_column_order()?;
        let assignments = self
            .repository
            .apply_column_order(caller.owner(), &column_order, self.policy, self.clock.utc())
            .await?;

        let skipped = column_order.ids().len().saturating_sub(assignments.len());
        if skipped > 0 {
            warn!(
                owner = %caller,
                status = %column_order.status(),
                skipped,
                "reorder skipped ids that are not owned by the caller"
            );
        }
        info!(
            owner = %caller,
            status = %column_order.status(),
            moved = assignments.len(),
            "reordered column"
        );
        Ok(assignments)
    }
}
