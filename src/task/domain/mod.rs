//! Domain model for task tracking.
//!
//! Tasks live in per-owner status columns and carry a [`Position`] that
//! expresses the board order inside their column. Comments form an
//! append-only log per task. Infrastructure concerns stay outside this
//! boundary; time comes from an injected [`mockable::Clock`].

mod comment;
mod error;
mod filter;
mod ids;
mod position;
mod status;
mod task;

pub use comment::Comment;
pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use filter::{DueWindow, TaskFilter};
pub use ids::{CommentId, OwnerId, TaskId};
pub use position::{
    ColumnOrder, Position, PositionAssignment, StatusChangePolicy, UnresolvedIdPolicy,
};
pub use status::{TaskPriority, TaskStatus};
pub use task::{MAX_TITLE_LENGTH, PersistedTaskData, Task, TaskDraft, TaskPatch};
