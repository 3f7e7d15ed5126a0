//! Shared helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::config::ServiceConfig;
use taskboard::identity::AuthenticatedCaller;
use taskboard::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{OwnerId, TaskDraft, TaskFilter, TaskId, TaskStatus},
    services::{CommentService, ReorderService, TaskStoreService},
};

/// Services wired around one shared in-memory repository.
pub struct Board {
    /// Task store service.
    pub store: Arc<TaskStoreService<InMemoryTaskRepository, DefaultClock>>,
    /// Reorder service.
    pub reorder: Arc<ReorderService<InMemoryTaskRepository, DefaultClock>>,
    /// Comment service.
    pub comments: Arc<CommentService<InMemoryTaskRepository, DefaultClock>>,
    /// Default caller for the test.
    pub caller: AuthenticatedCaller,
}

impl Board {
    /// Wires a board using `config`.
    #[must_use]
    pub fn with_config(config: ServiceConfig) -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            store: Arc::new(TaskStoreService::new(
                Arc::clone(&repository),
                Arc::clone(&clock),
                config,
            )),
            reorder: Arc::new(ReorderService::new(
                Arc::clone(&repository),
                Arc::clone(&clock),
                config.unresolved_ids,
            )),
            comments: Arc::new(CommentService::new(repository, clock)),
            caller: AuthenticatedCaller::new(OwnerId::new()),
        }
    }

    /// Creates tasks titled `titles` in `status`, returning their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if any creation fails.
    pub async fn seed(
        &self,
        status: TaskStatus,
        titles: &[&str],
    ) -> Result<Vec<TaskId>, eyre::Report> {
        let mut ids = Vec::with_capacity(titles.len());
        for title in titles {
            let task = self
                .store
                .create(self.caller, TaskDraft::new(*title).with_status(status))
                .await?;
            ids.push(task.id());
        }
        Ok(ids)
    }

    /// Returns the caller's `status` column as `(id, position)` pairs in
    /// list order.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    pub async fn column(&self, status: TaskStatus) -> Result<Vec<(TaskId, u32)>, eyre::Report> {
        let tasks = self.store.list(self.caller, &TaskFilter::default()).await?;
        Ok(tasks
            .iter()
            .filter(|task| task.status() == status)
            .map(|task| (task.id(), task.position().value()))
            .collect())
    }
}

/// Provides a board with default configuration.
#[fixture]
pub fn board() -> Board {
    Board::with_config(ServiceConfig::default())
}
