//! In-memory adapters for task tracking.
//!
//! Used by the test suites and by the server when no database is configured.

mod task;

pub use task::InMemoryTaskRepository;
