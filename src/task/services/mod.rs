//! Application services for task tracking.

mod comments;
mod error;
mod reorder;
mod store;

pub use comments::CommentService;
pub use error::{TaskServiceError, TaskServiceResult};
pub use reorder::{ReorderRequest, ReorderService};
pub use store::TaskStoreService;
