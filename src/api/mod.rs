//! HTTP surface built on axum.
//!
//! Every route except `/health` requires a bearer token resolved through the
//! configured [`IdentityProvider`]. Errors render as `{"error": "..."}` and
//! list endpoints always answer with a JSON array.

mod auth;
pub mod dto;
mod error;
pub mod handlers;

pub use auth::Caller;
pub use error::ApiError;

use crate::config::ServiceConfig;
use crate::identity::IdentityProvider;
use crate::task::{
    ports::{CommentRepository, TaskRepository},
    services::{CommentService, ReorderService, TaskStoreService},
};
use axum::Router;
use axum::routing::{delete, get, post};
use mockable::DefaultClock;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Storage backing the HTTP surface: tasks and comments from one adapter.
pub trait TaskStorage: TaskRepository + CommentRepository + 'static {}

impl<T> TaskStorage for T where T: TaskRepository + CommentRepository + 'static {}

/// Shared handler state.
pub struct AppState<R: TaskStorage> {
    tasks: Arc<TaskStoreService<R, DefaultClock>>,
    reorder: Arc<ReorderService<R, DefaultClock>>,
    comments: Arc<CommentService<R, DefaultClock>>,
    identity: Arc<dyn IdentityProvider>,
}

impl<R: TaskStorage> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            reorder: Arc::clone(&self.reorder),
            comments: Arc::clone(&self.comments),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<R: TaskStorage> AppState<R> {
    /// Wires the services around one repository.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        identity: Arc<dyn IdentityProvider>,
        config: ServiceConfig,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        Self {
            tasks: Arc::new(TaskStoreService::new(
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
            identity,
        }
    }

    /// Returns the task store service.
    #[must_use]
    pub fn tasks(&self) -> &TaskStoreService<R, DefaultClock> {
        &self.tasks
    }

    /// Returns the reorder service.
    #[must_use]
    pub fn reorder(&self) -> &ReorderService<R, DefaultClock> {
        &self.reorder
    }

    /// Returns the comment service.
    #[must_use]
    pub fn comments(&self) -> &CommentService<R, DefaultClock> {
        &self.comments
    }

    /// Returns the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }
}

/// Builds the application router.
#[must_use]
pub fn router<R: TaskStorage>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/tasks",
            get(handlers::list_tasks::<R>).post(handlers::create_task::<R>),
        )
        .route("/tasks/reorder", post(handlers::reorder_tasks::<R>))
        .route(
            "/tasks/{id}",
            get(handlers::get_task::<R>)
                .patch(handlers::update_task::<R>)
                .delete(handlers::delete_task::<R>),
        )
        .route(
            "/tasks/{id}/comments",
            get(handlers::list_comments::<R>).post(handlers::add_comment::<R>),
        )
        .route("/tags", get(handlers::list_tags::<R>))
        .route("/account/data", delete(handlers::purge_account::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
