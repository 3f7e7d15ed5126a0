//! Taskboard: task tracking backend with kanban column ordering.
//!
//! Authenticated users create tasks, organize them by status and priority,
//! comment on them, and reorder them inside status columns.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, etc.)
//!
//! # Modules
//!
//! - [`task`]: Task store, column reordering and comments
//! - [`identity`]: Authenticated caller handles and token resolution
//! - [`api`]: HTTP surface
//! - [`config`]: Service policies

pub mod api;
pub mod config;
pub mod identity;
pub mod task;
